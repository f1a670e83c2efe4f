//! Named file mapping that FreeTrack clients open by name.

use std::ptr::NonNull;
use tracing::{debug, trace};
use windows::Win32::Foundation::{CloseHandle, ERROR_ALREADY_EXISTS, GetLastError, HANDLE, INVALID_HANDLE_VALUE};
use windows::Win32::System::Memory::{
    CreateFileMappingW, FILE_MAP_READ, FILE_MAP_WRITE, MEMORY_MAPPED_VIEW_ADDRESS, MapViewOfFile,
    PAGE_READWRITE, UnmapViewOfFile,
};
use windows::core::PCWSTR;

use super::wide_string;
use crate::region::{FtHeap, HEAP_SIZE, RegionOpener, SharedRegion};
use crate::{ChannelError, Result};

/// Pagefile-backed mapping of one [`FtHeap`].
pub struct NamedRegion {
    name: String,
    mapping: HANDLE,
    base: NonNull<FtHeap>,
}

impl NamedRegion {
    /// Create the mapping, or attach to it if a client already created it.
    pub fn create(name: &str) -> Result<Self> {
        trace!(name, "Creating named file mapping");
        let wide_name = wide_string(name);

        let mapping = unsafe {
            CreateFileMappingW(
                INVALID_HANDLE_VALUE,
                None,
                PAGE_READWRITE,
                0,
                HEAP_SIZE as u32,
                PCWSTR::from_raw(wide_name.as_ptr()),
            )
            .map_err(|e| ChannelError::mapping(name, std::io::Error::other(e)))?
        };
        if unsafe { GetLastError() } == ERROR_ALREADY_EXISTS {
            debug!(name, "Attached to existing mapping");
        }

        let view = unsafe { MapViewOfFile(mapping, FILE_MAP_READ | FILE_MAP_WRITE, 0, 0, HEAP_SIZE) };
        let Some(base) = NonNull::new(view.Value as *mut FtHeap) else {
            let win_err = windows::core::Error::from_thread();
            unsafe {
                let _ = CloseHandle(mapping);
            }
            return Err(ChannelError::mapping(name, std::io::Error::other(win_err)));
        };

        debug!(name, size = HEAP_SIZE, "Mapped shared heap");
        Ok(Self { name: name.to_string(), mapping, base })
    }
}

impl SharedRegion for NamedRegion {
    fn heap(&self) -> &FtHeap {
        // SAFETY: the view is HEAP_SIZE bytes, page aligned, and every field of
        // FtHeap is an atomic slot valid for any bit pattern.
        unsafe { self.base.as_ref() }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for NamedRegion {
    fn drop(&mut self) {
        unsafe {
            let addr = MEMORY_MAPPED_VIEW_ADDRESS { Value: self.base.as_ptr() as *mut _ };
            let _ = UnmapViewOfFile(addr);
            let _ = CloseHandle(self.mapping);
        }
        debug!(name = %self.name, "Released shared heap");
    }
}

// SAFETY: the view is only accessed through atomic slots and the handle is a
// process-wide kernel object.
unsafe impl Send for NamedRegion {}
unsafe impl Sync for NamedRegion {}

/// Opens a [`NamedRegion`] on each channel start.
#[derive(Debug, Clone)]
pub struct NamedRegionOpener {
    name: String,
}

impl NamedRegionOpener {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl RegionOpener for NamedRegionOpener {
    fn open(&self) -> Result<Box<dyn SharedRegion>> {
        Ok(Box::new(NamedRegion::create(&self.name)?))
    }
}

#[cfg(all(test, windows))]
mod tests {
    use super::*;

    #[test]
    fn two_views_share_one_heap() {
        let name = format!("posewire_test_{}", std::process::id());
        let producer = NamedRegion::create(&name).unwrap();
        let consumer = NamedRegion::create(&name).unwrap();

        producer.heap().data.pitch.store(0.25);
        consumer.heap().game_id.store(9);

        assert_eq!(consumer.heap().data.pitch.load(), 0.25);
        assert_eq!(producer.heap().game_id.load(), 9);
    }
}
