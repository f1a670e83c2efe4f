//! Consumer side of the shared region.
//!
//! A game talks to the producer through the same heap it reads poses from:
//! it writes its identity into `GameID`, waits for the producer to echo it in
//! `GameID2` together with the calibration table, and then polls `DataID` to
//! tell new samples from stale ones. [`ConsumerView`] implements that half of
//! the protocol for tooling and tests.
//!
//! Reads are per-field atomic only. A [`ConsumerSample`] taken while the
//! producer is mid-tick may mix fields from two ticks.

use tracing::trace;

use crate::region::{FileRegion, FtHeap, SharedRegion};
use crate::types::WirePose;
use crate::Result;

/// One read of the pose record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsumerSample {
    pub data_id: i32,
    pub pose: WirePose,
    pub raw: WirePose,
    pub cam_width: i32,
    pub cam_height: i32,
}

/// Reader of a shared region that can announce its own identity.
pub struct ConsumerView<R> {
    region: R,
    last_data_id: Option<i32>,
}

impl ConsumerView<FileRegion> {
    /// Open a file-backed region created by a producer.
    pub fn open_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Ok(Self::new(FileRegion::open(path)?))
    }
}

impl<R: SharedRegion> ConsumerView<R> {
    pub fn new(region: R) -> Self {
        Self { region, last_data_id: None }
    }

    fn heap(&self) -> &FtHeap {
        self.region.heap()
    }

    /// Announce this consumer's identity to the producer.
    pub fn announce(&self, id: i32) {
        self.heap().game_id.store(id);
    }

    /// Whether the producer has acknowledged `id`.
    pub fn is_acknowledged(&self, id: i32) -> bool {
        self.heap().game_id2.load() == id
    }

    /// The identity the producer acknowledged last.
    pub fn acknowledged_id(&self) -> i32 {
        self.heap().game_id2.load()
    }

    pub fn calibration_table(&self) -> [u8; 8] {
        self.heap().table_bytes()
    }

    pub fn data_id(&self) -> i32 {
        self.heap().data.data_id.load()
    }

    /// Read the record regardless of freshness.
    pub fn read(&self) -> ConsumerSample {
        let data = &self.heap().data;
        ConsumerSample {
            data_id: data.data_id.load(),
            pose: WirePose {
                yaw: data.yaw.load(),
                pitch: data.pitch.load(),
                roll: data.roll.load(),
                x: data.x.load(),
                y: data.y.load(),
                z: data.z.load(),
            },
            raw: WirePose {
                yaw: data.raw_yaw.load(),
                pitch: data.raw_pitch.load(),
                roll: data.raw_roll.load(),
                x: data.raw_x.load(),
                y: data.raw_y.load(),
                z: data.raw_z.load(),
            },
            cam_width: data.cam_width.load(),
            cam_height: data.cam_height.load(),
        }
    }

    /// Read the record if `DataID` moved since the previous poll.
    pub fn poll(&mut self) -> Option<ConsumerSample> {
        let data_id = self.data_id();
        if self.last_data_id == Some(data_id) {
            trace!(data_id, "No new sample");
            return None;
        }

        self.last_data_id = Some(data_id);
        Some(self.read())
    }
}
