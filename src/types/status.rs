//! Channel lifecycle and publication status.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a pose channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum ChannelState {
    /// Created, nothing acquired yet.
    Uninitialized,
    /// Shared region acquired, initial values not yet written.
    Mapped,
    /// Accepting ticks.
    Publishing,
    /// Shut down; further ticks are ignored.
    Closed,
}

/// Snapshot of what the producer last published, for status displays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct PublishStatus {
    /// Ticks published since start.
    pub ticks: u64,
    /// Last acknowledged consumer identity.
    pub consumer_id: Option<i32>,
    /// Display name of the connected consumer.
    pub consumer_name: String,
}
