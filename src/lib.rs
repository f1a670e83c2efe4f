//! Head-pose telemetry over FreeTrack-compatible shared memory.
//!
//! Posewire publishes a tracker's filtered and raw head pose into the
//! `FT_SharedMem` region that FreeTrack 2.0 and NPClient consumers (games,
//! simulators) read, and runs the small handshake those consumers use to
//! announce themselves and fetch their calibration table.
//!
//! # Features
//!
//! - **Lock-free publication**: every field is a 4-byte atomic slot, so readers in
//!   other processes never see torn values
//! - **Consumer handshake**: identity acknowledgment and per-game calibration tables
//! - **Client discovery**: client libraries are installed and their location advertised
//! - **Async driver**: a tokio tick loop feeding the channel from any pose source
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use posewire::{ChannelConfig, Posewire, Pose, PoseSample};
//! use posewire::sources::ScriptedSource;
//!
//! #[tokio::main]
//! async fn main() -> posewire::Result<()> {
//!     let script = vec![PoseSample::unfiltered(Pose::new(15.0, -5.0, 0.0, 0.0, 0.0, 0.0)); 120];
//!     let handle = Posewire::spawn(ChannelConfig::default(), ScriptedSource::new(script, 60.0))?;
//!
//!     handle.join().await;
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Shared region and protocol
pub mod calibration;
pub mod channel;
pub mod consumer;
pub mod region;

// Startup collaborators
pub mod companion;
pub mod config;
pub mod install;

// Tick loop
pub mod driver;
pub mod source;
pub mod sources;

// Platform-specific modules
#[cfg(windows)]
pub mod windows;

// Core exports
pub use error::*;
pub use types::*;

// Main API exports
pub use calibration::{CalibrationProvider, GameRegistry};
pub use channel::{FreetrackChannel, PoseChannel};
pub use config::{ChannelConfig, InterfaceSelection};
pub use consumer::{ConsumerSample, ConsumerView};
pub use driver::{Driver, DriverHandle};
pub use source::{PoseSource, StreamSource};

/// Unified entry point for publishing head pose.
///
/// # Examples
///
/// ```rust,no_run
/// use posewire::{ChannelConfig, Posewire, Pose, PoseChannel};
///
/// fn main() -> posewire::Result<()> {
///     let mut channel = Posewire::start(ChannelConfig::default())?;
///     channel.publish(&Pose::new(10.0, 0.0, 0.0, 0.0, 0.0, 0.0), &Pose::default());
///     channel.shutdown();
///     Ok(())
/// }
/// ```
pub struct Posewire;

impl Posewire {
    /// Start a FreeTrack channel with the platform's default region, location
    /// registry and companion process.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The shared region cannot be created or opened
    /// - `used_interface` is not 0, 1 or 2, or the games file is unreadable
    /// - Client libraries cannot be copied to the custom location
    pub fn start(config: ChannelConfig) -> Result<FreetrackChannel> {
        let mut channel = FreetrackChannel::new(config);
        channel.start()?;
        Ok(channel)
    }

    /// Start a channel and drive it from `source` on the current tokio runtime.
    ///
    /// The channel is shut down when the source ends or the returned handle is
    /// stopped.
    pub fn spawn<S: PoseSource>(config: ChannelConfig, source: S) -> Result<DriverHandle<FreetrackChannel>> {
        let channel = Self::start(config)?;
        Ok(Driver::spawn(channel, source))
    }
}
