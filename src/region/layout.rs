//! FreeTrack 2.0 shared heap layout.
//!
//! The structs below are the wire format shared with every FreeTrack and
//! NPClient consumer library. Field order and widths must not change.
//!
//! The order is FreeTrack's own `FTHeap`: pose block first (DataID, camera,
//! pose, raw pose, points), then GameID, the calibration table and GameID2.

use std::mem::{offset_of, size_of};

use super::slot::Slot;

/// Shared memory region name used by FreeTrack clients.
pub const FREETRACK_HEAP: &str = "FT_SharedMem";

/// Size in bytes of the mapped heap.
pub const HEAP_SIZE: usize = size_of::<FtHeap>();

/// Freshness value written when the channel starts publishing.
pub const INITIAL_DATA_ID: i32 = 1;

/// Declared camera-plane width, kept for clients that still read it.
pub const CAM_WIDTH: i32 = 100;

/// Declared camera-plane height, kept for clients that still read it.
pub const CAM_HEIGHT: i32 = 250;

/// Pose and status block (`FTData`).
#[repr(C)]
#[derive(Debug, Default)]
pub struct FtData {
    /// Freshness counter; bumped once per unchanged-identity tick.
    pub data_id: Slot<i32>,
    pub cam_width: Slot<i32>,
    pub cam_height: Slot<i32>,

    // Filtered pose, radians and tenths of the producer unit
    pub yaw: Slot<f32>,
    pub pitch: Slot<f32>,
    pub roll: Slot<f32>,
    pub x: Slot<f32>,
    pub y: Slot<f32>,
    pub z: Slot<f32>,

    // Unfiltered pose for consumer-side diagnostics
    pub raw_yaw: Slot<f32>,
    pub raw_pitch: Slot<f32>,
    pub raw_roll: Slot<f32>,
    pub raw_x: Slot<f32>,
    pub raw_y: Slot<f32>,
    pub raw_z: Slot<f32>,

    /// Legacy LED point coordinates (X1, Y1 .. X4, Y4). Never written.
    pub points: [Slot<f32>; 8],
}

/// The complete shared heap (`FTHeap`).
#[repr(C)]
#[derive(Debug, Default)]
pub struct FtHeap {
    pub data: FtData,
    /// Consumer identity, written by the consumer.
    pub game_id: Slot<i32>,
    /// Calibration table as two words in memory order.
    pub table: [Slot<[u8; 4]>; 2],
    /// Identity acknowledgment, written by the producer.
    pub game_id2: Slot<i32>,
}

// Byte offsets third-party clients are compiled against.
const _: () = assert!(offset_of!(FtData, data_id) == 0);
const _: () = assert!(offset_of!(FtData, yaw) == 12);
const _: () = assert!(offset_of!(FtData, raw_yaw) == 36);
const _: () = assert!(offset_of!(FtData, points) == 60);
const _: () = assert!(size_of::<FtData>() == 92);
const _: () = assert!(offset_of!(FtHeap, game_id) == 92);
const _: () = assert!(offset_of!(FtHeap, table) == 96);
const _: () = assert!(offset_of!(FtHeap, table) % 4 == 0);
const _: () = assert!(offset_of!(FtHeap, game_id2) == 104);
const _: () = assert!(HEAP_SIZE == 108);

impl FtHeap {
    /// Read the calibration table as published.
    pub fn table_bytes(&self) -> [u8; 8] {
        let [lo, hi] = [self.table[0].load(), self.table[1].load()];
        let mut bytes = [0u8; 8];
        bytes[..4].copy_from_slice(&lo);
        bytes[4..].copy_from_slice(&hi);
        bytes
    }

    /// Publish the calibration table as two word stores.
    pub fn store_table(&self, table: &[u8; 8]) {
        let [lo, hi] = split_table(table);
        self.table[0].store(lo);
        self.table[1].store(hi);
    }
}

fn split_table(table: &[u8; 8]) -> [[u8; 4]; 2] {
    let mut lo = [0u8; 4];
    let mut hi = [0u8; 4];
    lo.copy_from_slice(&table[..4]);
    hi.copy_from_slice(&table[4..]);
    [lo, hi]
}
