//! Per-tick publish protocol.
//!
//! Each tick stores the pose, then looks at the consumer identity:
//!
//! - unchanged: the freshness counter is bumped by one
//! - changed: the calibration table is looked up and stored, the identity is
//!   acknowledged, and the freshness counter restarts at zero
//!
//! Every store is an independent atomic write. A consumer polling mid-tick can
//! see any mix of old and new fields, never a torn field. On an identity
//! change the table words land before the acknowledgment, which lands before
//! the counter reset. No stronger ordering is guaranteed.

use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, trace};

use crate::calibration::CalibrationProvider;
use crate::region::layout::{CAM_HEIGHT, CAM_WIDTH, INITIAL_DATA_ID};
use crate::region::FtHeap;
use crate::types::{Pose, UNKNOWN_GAME, WirePose};

/// Display name of the connected consumer, readable from any thread.
///
/// The tick thread writes it only on identity changes; status displays read
/// it whenever they like.
#[derive(Debug, Clone)]
pub struct ConsumerName(Arc<Mutex<String>>);

impl ConsumerName {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(String::new())))
    }

    pub fn get(&self) -> String {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set(&self, name: String) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = name;
    }
}

impl Default for ConsumerName {
    fn default() -> Self {
        Self::new()
    }
}

/// What a tick did besides storing the pose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Same consumer as last tick; freshness counter advanced.
    Fresh,
    /// New consumer identity acknowledged.
    IdentityChanged { id: i32, name: String },
}

/// Producer-side protocol state.
pub struct Publisher {
    /// Identity acknowledged on the last change; `None` until the first tick.
    last_id: Option<i32>,
    calibration: Arc<dyn CalibrationProvider>,
    connected: ConsumerName,
}

impl Publisher {
    pub fn new(calibration: Arc<dyn CalibrationProvider>) -> Self {
        Self::with_name(calibration, ConsumerName::new())
    }

    /// Publisher reporting the connected name through an existing handle.
    pub fn with_name(calibration: Arc<dyn CalibrationProvider>, connected: ConsumerName) -> Self {
        Self { last_id: None, calibration, connected }
    }

    /// Write the one-time values consumers expect before the first tick.
    pub fn initialize(&mut self, heap: &FtHeap) {
        heap.data.data_id.store(INITIAL_DATA_ID);
        heap.data.cam_width.store(CAM_WIDTH);
        heap.data.cam_height.store(CAM_HEIGHT);
        heap.game_id2.store(0);
        heap.store_table(&[0; 8]);

        self.last_id = None;
        self.connected.set(String::new());
    }

    /// Publish one sample. Never blocks on the consumer and cannot fail.
    pub fn publish(&mut self, heap: &FtHeap, pose: &Pose, raw: &Pose) -> TickOutcome {
        let filtered = WirePose::filtered(pose);
        let unfiltered = WirePose::raw(raw);
        let data = &heap.data;

        data.x.store(filtered.x);
        data.y.store(filtered.y);
        data.z.store(filtered.z);

        data.yaw.store(filtered.yaw);
        data.pitch.store(filtered.pitch);
        data.roll.store(filtered.roll);

        data.raw_yaw.store(unfiltered.yaw);
        data.raw_pitch.store(unfiltered.pitch);
        data.raw_roll.store(unfiltered.roll);
        data.raw_x.store(unfiltered.x);
        data.raw_y.store(unfiltered.y);
        data.raw_z.store(unfiltered.z);

        let id = heap.game_id.load();

        if self.last_id == Some(id) {
            let previous = data.data_id.fetch_add(1);
            trace!(data_id = previous.wrapping_add(1), "Published pose");
            return TickOutcome::Fresh;
        }

        let entry = self.calibration.lookup(id);
        heap.store_table(&entry.table);
        heap.game_id2.store(id);
        data.data_id.store(0);
        self.last_id = Some(id);

        let name = if entry.name.is_empty() { UNKNOWN_GAME.to_string() } else { entry.name };
        debug!(game_id = id, name = %name, table = ?entry.table, "Consumer identity changed");
        self.connected.set(name.clone());

        TickOutcome::IdentityChanged { id, name }
    }

    /// Identity acknowledged on the most recent change.
    pub fn acknowledged_id(&self) -> Option<i32> {
        self.last_id
    }

    pub fn consumer_name(&self) -> &ConsumerName {
        &self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::GameRegistry;
    use crate::types::{CalibrationEntry, D2R, PITCH_SINGULARITY_CLAMP};
    use proptest::prelude::*;

    fn registry() -> Arc<dyn CalibrationProvider> {
        Arc::new(GameRegistry::from_entries([(
            5,
            CalibrationEntry::new([9, 8, 7, 6, 5, 4, 3, 2], "Example Flight"),
        )]))
    }

    fn started() -> (FtHeap, Publisher) {
        let heap = FtHeap::default();
        let mut publisher = Publisher::new(registry());
        publisher.initialize(&heap);
        (heap, publisher)
    }

    #[test]
    fn initialize_writes_baseline_values() {
        let (heap, publisher) = started();

        assert_eq!(heap.data.data_id.load(), 1);
        assert_eq!(heap.data.cam_width.load(), 100);
        assert_eq!(heap.data.cam_height.load(), 250);
        assert_eq!(heap.game_id2.load(), 0);
        assert_eq!(heap.table_bytes(), [0; 8]);
        assert_eq!(publisher.acknowledged_id(), None);
    }

    #[test]
    fn first_tick_acknowledges_current_identity() {
        let (heap, mut publisher) = started();
        let pose = Pose::default();

        let outcome = publisher.publish(&heap, &pose, &pose);

        assert_eq!(
            outcome,
            TickOutcome::IdentityChanged { id: 0, name: UNKNOWN_GAME.to_string() }
        );
        assert_eq!(heap.data.data_id.load(), 0);
        assert_eq!(publisher.consumer_name().get(), UNKNOWN_GAME);
    }

    #[test]
    fn stores_filtered_and_raw_pose() {
        let (heap, mut publisher) = started();
        let pose = Pose::new(10.0, 45.0, 0.0, 1.0, 2.0, 3.0);
        let raw = Pose::new(-20.0, 10.0, 5.0, 0.1, 0.2, 0.3);

        publisher.publish(&heap, &pose, &raw);

        assert!((heap.data.yaw.load() - -0.1745).abs() < 1e-4);
        assert!((heap.data.pitch.load() - -0.7854).abs() < 1e-4);
        assert_eq!(heap.data.roll.load(), 0.0);
        assert_eq!(heap.data.x.load(), 10.0);
        assert_eq!(heap.data.y.load(), 20.0);
        assert_eq!(heap.data.z.load(), 30.0);

        assert!((heap.data.raw_yaw.load() - 0.3491).abs() < 1e-4);
        assert!((heap.data.raw_pitch.load() - 0.1745).abs() < 1e-4);
        assert!((heap.data.raw_roll.load() - 0.0873).abs() < 1e-4);
        assert!((heap.data.raw_x.load() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn pitch_singularity_is_clamped() {
        let (heap, mut publisher) = started();
        let pose = Pose { pitch: 89.92, ..Pose::default() };

        publisher.publish(&heap, &pose, &pose);

        assert_eq!(heap.data.pitch.load(), (-D2R * PITCH_SINGULARITY_CLAMP) as f32);
        assert_ne!(heap.data.pitch.load(), (-D2R * 89.92) as f32);
    }

    #[test]
    fn identity_change_republishes_table_and_resets_freshness() {
        let (heap, mut publisher) = started();
        let pose = Pose::default();

        publisher.publish(&heap, &pose, &pose);
        publisher.publish(&heap, &pose, &pose);
        assert_eq!(heap.data.data_id.load(), 1);

        heap.game_id.store(5);
        let outcome = publisher.publish(&heap, &pose, &pose);

        assert_eq!(
            outcome,
            TickOutcome::IdentityChanged { id: 5, name: "Example Flight".to_string() }
        );
        assert_eq!(heap.table_bytes(), [9, 8, 7, 6, 5, 4, 3, 2]);
        assert_eq!(heap.game_id2.load(), 5);
        assert_eq!(heap.data.data_id.load(), 0);
        assert_eq!(publisher.consumer_name().get(), "Example Flight");

        for expected in 1..=3 {
            assert_eq!(publisher.publish(&heap, &pose, &pose), TickOutcome::Fresh);
            assert_eq!(heap.data.data_id.load(), expected);
        }
    }

    #[test]
    fn returning_to_unknown_identity_zeroes_the_table() {
        let (heap, mut publisher) = started();
        let pose = Pose::default();

        heap.game_id.store(5);
        publisher.publish(&heap, &pose, &pose);
        heap.game_id.store(77);
        publisher.publish(&heap, &pose, &pose);

        assert_eq!(heap.table_bytes(), [0; 8]);
        assert_eq!(heap.game_id2.load(), 77);
        assert_eq!(publisher.consumer_name().get(), UNKNOWN_GAME);
    }

    #[test]
    fn empty_registry_name_reports_unknown_game() {
        let heap = FtHeap::default();
        let provider: Arc<dyn CalibrationProvider> =
            Arc::new(GameRegistry::from_entries([(3, CalibrationEntry::new([1; 8], ""))]));
        let mut publisher = Publisher::new(provider);
        publisher.initialize(&heap);

        heap.game_id.store(3);
        publisher.publish(&heap, &Pose::default(), &Pose::default());

        assert_eq!(heap.table_bytes(), [1; 8]);
        assert_eq!(publisher.consumer_name().get(), UNKNOWN_GAME);
    }

    #[test]
    fn consumer_name_is_readable_from_other_threads() {
        let (heap, mut publisher) = started();
        let name = publisher.consumer_name().clone();

        heap.game_id.store(5);
        publisher.publish(&heap, &Pose::default(), &Pose::default());

        let seen = std::thread::spawn(move || name.get()).join().unwrap();
        assert_eq!(seen, "Example Flight");
    }

    proptest! {
        #[test]
        fn freshness_is_monotonic_while_identity_holds(
            ticks in 1usize..200,
            id in any::<i32>(),
        ) {
            let (heap, mut publisher) = started();
            heap.game_id.store(id);
            let pose = Pose::default();

            publisher.publish(&heap, &pose, &pose);
            prop_assert_eq!(heap.data.data_id.load(), 0);

            let mut previous = 0;
            for _ in 0..ticks {
                publisher.publish(&heap, &pose, &pose);
                let current = heap.data.data_id.load();
                prop_assert_eq!(current, previous + 1);
                previous = current;
            }
        }

        #[test]
        fn freshness_resets_exactly_on_change_tick(
            before in 1usize..50,
            after in 1usize..50,
            new_id in 1i32..1000,
        ) {
            let (heap, mut publisher) = started();
            let pose = Pose::default();

            for _ in 0..before {
                publisher.publish(&heap, &pose, &pose);
            }
            prop_assert_eq!(heap.data.data_id.load(), (before - 1) as i32);

            heap.game_id.store(new_id);
            publisher.publish(&heap, &pose, &pose);
            prop_assert_eq!(heap.data.data_id.load(), 0);
            prop_assert_eq!(heap.game_id2.load(), new_id);

            for _ in 0..after {
                publisher.publish(&heap, &pose, &pose);
            }
            prop_assert_eq!(heap.data.data_id.load(), after as i32);
        }
    }
}
