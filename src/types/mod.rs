//! Core value types.
//!
//! - [`Pose`] is what the producer computes (degrees, centimeters)
//! - [`WirePose`] is what consumers read (radians, tenths of a centimeter)
//! - [`CalibrationEntry`] is the per-consumer table and display name
//! - [`ChannelState`] and [`PublishStatus`] describe the producer side
//!
//! ## Usage Example
//!
//! ```rust
//! use posewire::types::{Pose, WirePose};
//!
//! let wire = WirePose::filtered(&Pose::new(10.0, 45.0, 0.0, 1.0, 2.0, 3.0));
//! assert!((wire.yaw + 0.1745).abs() < 1e-4);
//! assert_eq!(wire.x, 10.0);
//! ```

mod calibration;
mod pose;
mod status;

pub use calibration::{CalibrationEntry, UNKNOWN_GAME};
pub use pose::{
    D2R, PITCH_SINGULARITY_CLAMP, PITCH_SINGULARITY_TOLERANCE, POSITION_SCALE, Pose, WirePose,
    is_crossing_90,
};
pub use status::{ChannelState, PublishStatus};

/// One producer tick: the filtered pose and its unfiltered counterpart.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PoseSample {
    pub pose: Pose,
    pub raw: Pose,
}

impl PoseSample {
    pub fn new(pose: Pose, raw: Pose) -> Self {
        Self { pose, raw }
    }

    /// A sample whose raw pose equals the filtered one.
    pub fn unfiltered(pose: Pose) -> Self {
        Self { pose, raw: pose }
    }
}
