//! Head pose values and their FreeTrack wire conversion.

use serde::{Deserialize, Serialize};

/// Degrees to radians.
pub const D2R: f64 = std::f64::consts::PI / 180.0;

/// Producer position units to protocol units.
pub const POSITION_SCALE: f64 = 10.0;

/// Pitch inputs closer than this to 90° are clamped.
pub const PITCH_SINGULARITY_TOLERANCE: f64 = 0.15;

/// Pitch published instead of inputs near 90°. Falcon BMS shows a visible
/// bump when pitch crosses this value.
pub const PITCH_SINGULARITY_CLAMP: f64 = 89.86;

/// A six degree-of-freedom pose in producer units.
///
/// Angles are degrees, positions are centimeters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Pose {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Pose {
    pub const fn new(yaw: f64, pitch: f64, roll: f64, x: f64, y: f64, z: f64) -> Self {
        Self { yaw, pitch, roll, x, y, z }
    }

    /// Build a pose from `[x, y, z, yaw, pitch, roll]`, the axis order most
    /// trackers emit.
    pub fn from_axes(axes: [f64; 6]) -> Self {
        let [x, y, z, yaw, pitch, roll] = axes;
        Self { yaw, pitch, roll, x, y, z }
    }
}

/// A pose converted to the consumer's convention, ready to store.
///
/// Angles are radians, positions are tenths of the producer unit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WirePose {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WirePose {
    /// Convert a filtered pose.
    ///
    /// Yaw and pitch are sign-flipped for the consumer's axis convention, and
    /// a pitch within [`PITCH_SINGULARITY_TOLERANCE`] of 90° is published as
    /// [`PITCH_SINGULARITY_CLAMP`].
    pub fn filtered(pose: &Pose) -> Self {
        let pitch = if is_crossing_90(pose.pitch) { PITCH_SINGULARITY_CLAMP } else { pose.pitch };

        Self {
            yaw: (-pose.yaw * D2R) as f32,
            pitch: (-D2R * pitch) as f32,
            roll: (pose.roll * D2R) as f32,
            x: (pose.x * POSITION_SCALE) as f32,
            y: (pose.y * POSITION_SCALE) as f32,
            z: (pose.z * POSITION_SCALE) as f32,
        }
    }

    /// Convert an unfiltered pose. Only yaw is sign-flipped; no clamp applies.
    pub fn raw(pose: &Pose) -> Self {
        Self {
            yaw: (-pose.yaw * D2R) as f32,
            pitch: (pose.pitch * D2R) as f32,
            roll: (pose.roll * D2R) as f32,
            x: (pose.x * POSITION_SCALE) as f32,
            y: (pose.y * POSITION_SCALE) as f32,
            z: (pose.z * POSITION_SCALE) as f32,
        }
    }
}

/// Whether `pitch` (degrees) falls inside the clamped band around 90°.
pub fn is_crossing_90(pitch: f64) -> bool {
    (pitch - 90.0).abs() < PITCH_SINGULARITY_TOLERANCE
}
