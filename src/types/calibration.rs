//! Per-consumer calibration data.

use serde::{Deserialize, Serialize};

/// Display name used for identities missing from the registry.
pub const UNKNOWN_GAME: &str = "Unknown game";

/// Calibration table and display name for one consumer identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct CalibrationEntry {
    pub table: [u8; 8],
    pub name: String,
}

impl CalibrationEntry {
    pub fn new(table: [u8; 8], name: impl Into<String>) -> Self {
        Self { table, name: name.into() }
    }

    /// The all-zero table and placeholder name.
    pub fn unknown() -> Self {
        Self::new([0; 8], UNKNOWN_GAME)
    }

    /// Whether this is the placeholder for an unregistered identity.
    pub fn is_unknown(&self) -> bool {
        self.table == [0; 8] && self.name == UNKNOWN_GAME
    }
}

impl Default for CalibrationEntry {
    fn default() -> Self {
        Self::unknown()
    }
}
