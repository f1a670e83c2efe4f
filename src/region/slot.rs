//! Four-byte atomic slots.
//!
//! Every scalar in the shared region is a [`Slot`]: a `#[repr(transparent)]`
//! wrapper around an [`AtomicU32`]. Floating-point values and calibration
//! words are bit-reinterpreted into the `u32` before the store and back after
//! the load, so one native atomic covers every field type. IEEE-754 bit
//! patterns survive the trip exactly, NaN payloads included.
//!
//! Stores use `Release` ordering and loads use `Acquire`, which pairs with the
//! same discipline in third-party consumers. Nothing here takes a lock.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, Ordering};

/// A value that fits in exactly four bytes and can be stored in a [`Slot`].
pub trait Word: Copy {
    /// Reinterpret the value as its raw 32-bit pattern.
    fn to_word(self) -> u32;

    /// Rebuild the value from a raw 32-bit pattern.
    fn from_word(word: u32) -> Self;
}

impl Word for u32 {
    #[inline]
    fn to_word(self) -> u32 {
        self
    }

    #[inline]
    fn from_word(word: u32) -> Self {
        word
    }
}

impl Word for i32 {
    #[inline]
    fn to_word(self) -> u32 {
        self as u32
    }

    #[inline]
    fn from_word(word: u32) -> Self {
        word as i32
    }
}

impl Word for f32 {
    #[inline]
    fn to_word(self) -> u32 {
        self.to_bits()
    }

    #[inline]
    fn from_word(word: u32) -> Self {
        f32::from_bits(word)
    }
}

/// Raw bytes in memory order, used for the calibration table words.
impl Word for [u8; 4] {
    #[inline]
    fn to_word(self) -> u32 {
        u32::from_ne_bytes(self)
    }

    #[inline]
    fn from_word(word: u32) -> Self {
        word.to_ne_bytes()
    }
}

/// A 4-byte, 4-byte-aligned atomic field in the shared region.
#[repr(transparent)]
pub struct Slot<T: Word> {
    bits: AtomicU32,
    _value: PhantomData<T>,
}

const _: () = assert!(std::mem::size_of::<Slot<f32>>() == 4);
const _: () = assert!(std::mem::align_of::<Slot<f32>>() == 4);

impl<T: Word> Slot<T> {
    /// Create a slot holding `value`.
    pub fn new(value: T) -> Self {
        Self { bits: AtomicU32::new(value.to_word()), _value: PhantomData }
    }

    /// Publish `value` with release ordering.
    #[inline]
    pub fn store(&self, value: T) {
        self.bits.store(value.to_word(), Ordering::Release);
    }

    /// Read the current value with acquire ordering.
    #[inline]
    pub fn load(&self) -> T {
        T::from_word(self.bits.load(Ordering::Acquire))
    }
}

impl Slot<i32> {
    /// Add `delta` to the counter, wrapping on overflow, and return the
    /// previous value.
    #[inline]
    pub fn fetch_add(&self, delta: i32) -> i32 {
        // Two's complement addition is identical on the unsigned view.
        self.bits.fetch_add(delta as u32, Ordering::AcqRel) as i32
    }
}

impl<T: Word + Default> Default for Slot<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Word + fmt::Debug> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.load().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;

    proptest! {
        #[test]
        fn f32_bit_patterns_round_trip(bits in any::<u32>()) {
            let slot = Slot::new(0.0f32);
            let value = f32::from_bits(bits);
            slot.store(value);
            prop_assert_eq!(slot.load().to_bits(), bits);
        }

        #[test]
        fn i32_values_round_trip(value in any::<i32>()) {
            let slot = Slot::new(0i32);
            slot.store(value);
            prop_assert_eq!(slot.load(), value);
        }

        #[test]
        fn table_words_round_trip(bytes in any::<[u8; 4]>()) {
            let slot = Slot::new([0u8; 4]);
            slot.store(bytes);
            prop_assert_eq!(slot.load(), bytes);
        }
    }

    #[test]
    fn fetch_add_wraps_at_i32_max() {
        let slot = Slot::new(i32::MAX);
        assert_eq!(slot.fetch_add(1), i32::MAX);
        assert_eq!(slot.load(), i32::MIN);
    }

    #[test]
    fn table_word_keeps_memory_order() {
        let slot = Slot::new([0x01, 0x02, 0x03, 0x04]);
        let raw: &AtomicU32 = &slot.bits;
        let bytes = raw.load(Ordering::Relaxed).to_ne_bytes();
        assert_eq!(bytes, [0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn concurrent_reader_never_sees_torn_values() {
        // Writer alternates between two patterns whose halves differ; any torn
        // read would produce a third pattern.
        const A: u32 = 0x0000_FFFF;
        const B: u32 = 0xFFFF_0000;

        let slot = Arc::new(Slot::new(f32::from_bits(A)));
        let writer = {
            let slot = Arc::clone(&slot);
            std::thread::spawn(move || {
                for i in 0..100_000 {
                    slot.store(f32::from_bits(if i % 2 == 0 { B } else { A }));
                }
            })
        };

        for _ in 0..100_000 {
            let bits = slot.load().to_bits();
            assert!(bits == A || bits == B, "torn read: {bits:#x}");
        }

        writer.join().unwrap();
    }
}
