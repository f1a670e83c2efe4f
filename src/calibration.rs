//! Calibration table lookup by consumer identity.
//!
//! Consumers announce themselves with an integer identity. The producer maps
//! that identity to an 8-byte calibration table and a display name through a
//! [`CalibrationProvider`]. Lookups are total: identities that are not
//! registered yield [`CalibrationEntry::unknown`].
//!
//! [`GameRegistry`] is the stock provider, loaded once from YAML:
//!
//! ```yaml
//! games:
//!   - id: 1001
//!     name: Example Flight
//!     table: "0a1b2c3d4e5f6071"
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::types::CalibrationEntry;
use crate::{ChannelError, Result};

/// Identity → calibration lookup. Must be pure: the same identity always
/// yields the same entry.
pub trait CalibrationProvider: Send + Sync {
    fn lookup(&self, id: i32) -> CalibrationEntry;
}

/// Immutable registry of known consumers.
#[derive(Debug, Clone, Default)]
pub struct GameRegistry {
    games: HashMap<i32, CalibrationEntry>,
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    games: Vec<GameRecord>,
}

#[derive(Debug, Deserialize)]
struct GameRecord {
    id: i32,
    name: String,
    #[serde(default)]
    table: Option<String>,
}

impl GameRegistry {
    /// A registry with no known consumers.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a registry from `(id, entry)` pairs. Later duplicates win.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (i32, CalibrationEntry)>,
    {
        Self { games: entries.into_iter().collect() }
    }

    /// Parse a registry document.
    ///
    /// A record without a `table` gets the all-zero table but keeps its name,
    /// so the consumer is still reported by name.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: RegistryFile = serde_yaml_ng::from_str(yaml)?;

        let mut games = HashMap::with_capacity(file.games.len());
        for record in file.games {
            let table = match record.table.as_deref() {
                Some(hex) => parse_table(hex).ok_or_else(|| {
                    ChannelError::config(
                        "games.table",
                        format!("id {}: expected 16 hex digits, got '{}'", record.id, hex),
                    )
                })?,
                None => [0; 8],
            };
            games.insert(record.id, CalibrationEntry::new(table, record.name));
        }

        debug!(count = games.len(), "Loaded game registry");
        Ok(Self { games })
    }

    /// Load a registry document from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            ChannelError::config("games", format!("{}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

impl CalibrationProvider for GameRegistry {
    fn lookup(&self, id: i32) -> CalibrationEntry {
        self.games.get(&id).cloned().unwrap_or_else(CalibrationEntry::unknown)
    }
}

/// Parse 16 hex digits into table bytes.
fn parse_table(hex: &str) -> Option<[u8; 8]> {
    let hex = hex.trim();
    if hex.len() != 16 || !hex.is_ascii() {
        return None;
    }

    let mut table = [0u8; 8];
    for (i, byte) in table.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UNKNOWN_GAME;
    use proptest::prelude::*;

    const REGISTRY: &str = r#"
games:
  - id: 5
    name: Example Flight
    table: "0102030405060708"
  - id: 9
    name: Untabled Racer
"#;

    #[test]
    fn registered_identity_returns_its_entry() {
        let registry = GameRegistry::from_yaml_str(REGISTRY).unwrap();
        let entry = registry.lookup(5);

        assert_eq!(entry.table, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(entry.name, "Example Flight");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn record_without_table_keeps_name() {
        let registry = GameRegistry::from_yaml_str(REGISTRY).unwrap();
        let entry = registry.lookup(9);

        assert_eq!(entry.table, [0; 8]);
        assert_eq!(entry.name, "Untabled Racer");
    }

    #[test]
    fn bad_table_is_a_config_error() {
        let yaml = "games:\n  - id: 1\n    name: Broken\n    table: \"xyz\"\n";
        let err = GameRegistry::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ChannelError::Config { .. }));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GameRegistry::from_file(dir.path().join("games.yaml")).unwrap_err();
        assert!(matches!(err, ChannelError::Config { .. }));
    }

    #[test]
    fn parse_table_rejects_wrong_lengths() {
        assert_eq!(parse_table("00ff00ff00ff00ff"), Some([0, 255, 0, 255, 0, 255, 0, 255]));
        assert_eq!(parse_table("00ff"), None);
        assert_eq!(parse_table("00ff00ff00ff00ff00"), None);
        assert_eq!(parse_table("zzff00ff00ff00ff"), None);
    }

    proptest! {
        #[test]
        fn lookup_is_pure(id in any::<i32>()) {
            let registry = GameRegistry::from_yaml_str(REGISTRY).unwrap();
            prop_assert_eq!(registry.lookup(id), registry.lookup(id));
        }

        #[test]
        fn unknown_identities_yield_zero_table(id in any::<i32>()) {
            prop_assume!(id != 5 && id != 9);
            let registry = GameRegistry::from_yaml_str(REGISTRY).unwrap();
            let entry = registry.lookup(id);
            prop_assert_eq!(entry.table, [0u8; 8]);
            prop_assert_eq!(entry.name, UNKNOWN_GAME);
        }
    }
}
