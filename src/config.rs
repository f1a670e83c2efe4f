//! Channel configuration.
//!
//! Loaded from YAML. `used_interface` is kept as the raw stored integer so an
//! out-of-range value survives parsing and is reported as a
//! [`ChannelError::Config`] when the channel starts, like any other startup
//! failure.
//!
//! ```yaml
//! region_name: FT_SharedMem
//! install_dir: /opt/posewire/lib
//! used_interface: 0
//! use_custom_location: true
//! custom_location: /games/falcon/bin
//! ephemeral_library_location: false
//! games: /opt/posewire/games.yaml
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::region::FREETRACK_HEAP;
use crate::{ChannelError, Result};

/// Which consumer client libraries to advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum InterfaceSelection {
    /// FreeTrack and NPClient.
    Both,
    /// FreeTrack only; no companion process is started.
    FreetrackOnly,
    /// NPClient only.
    NpClientOnly,
}

impl InterfaceSelection {
    pub fn uses_freetrack(self) -> bool {
        matches!(self, InterfaceSelection::Both | InterfaceSelection::FreetrackOnly)
    }

    pub fn uses_npclient(self) -> bool {
        matches!(self, InterfaceSelection::Both | InterfaceSelection::NpClientOnly)
    }

    /// Whether NPClient-based consumers need the companion process.
    pub fn needs_companion(self) -> bool {
        self != InterfaceSelection::FreetrackOnly
    }
}

impl TryFrom<i32> for InterfaceSelection {
    type Error = ChannelError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(InterfaceSelection::Both),
            1 => Ok(InterfaceSelection::FreetrackOnly),
            2 => Ok(InterfaceSelection::NpClientOnly),
            other => Err(ChannelError::config(
                "used_interface",
                format!("wrong interface selection '{other}'"),
            )),
        }
    }
}

impl From<InterfaceSelection> for i32 {
    fn from(value: InterfaceSelection) -> Self {
        match value {
            InterfaceSelection::Both => 0,
            InterfaceSelection::FreetrackOnly => 1,
            InterfaceSelection::NpClientOnly => 2,
        }
    }
}

/// Settings for one channel instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Name of the shared region.
    pub region_name: String,
    /// Directory holding the bundled client libraries and companion program.
    pub install_dir: PathBuf,
    /// Raw interface selection (see [`InterfaceSelection`]).
    pub used_interface: i32,
    pub use_custom_location: bool,
    pub custom_location: Option<PathBuf>,
    /// Clear advertised locations on shutdown.
    pub ephemeral_library_location: bool,
    /// Calibration registry document. When unset, `games.yaml` in
    /// `install_dir` is used if present.
    pub games: Option<PathBuf>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            region_name: FREETRACK_HEAP.to_string(),
            install_dir: default_install_dir(),
            used_interface: InterfaceSelection::Both.into(),
            use_custom_location: false,
            custom_location: None,
            ephemeral_library_location: false,
            games: None,
        }
    }
}

impl ChannelConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| ChannelError::config("config", format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&yaml)
    }

    /// Validated interface selection.
    pub fn interface(&self) -> Result<InterfaceSelection> {
        InterfaceSelection::try_from(self.used_interface)
    }

    /// The custom location, if enabled and set to a non-empty path.
    ///
    /// Whether the directory exists is checked by the installer.
    pub fn custom_location(&self) -> Option<&Path> {
        if !self.use_custom_location {
            return None;
        }
        self.custom_location.as_deref().filter(|p| !p.as_os_str().is_empty())
    }
}

/// Directory of the running executable, or the working directory.
fn default_install_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_document() {
        let yaml = r#"
region_name: FT_Test
install_dir: /opt/posewire/lib
used_interface: 2
use_custom_location: true
custom_location: /games/bin
ephemeral_library_location: true
games: /opt/posewire/games.yaml
"#;
        let config = ChannelConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.region_name, "FT_Test");
        assert_eq!(config.interface().unwrap(), InterfaceSelection::NpClientOnly);
        assert_eq!(config.custom_location(), Some(Path::new("/games/bin")));
        assert!(config.ephemeral_library_location);
        assert_eq!(config.games.as_deref(), Some(Path::new("/opt/posewire/games.yaml")));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config = ChannelConfig::from_yaml_str("used_interface: 1").unwrap();

        assert_eq!(config.region_name, FREETRACK_HEAP);
        assert_eq!(config.interface().unwrap(), InterfaceSelection::FreetrackOnly);
        assert!(!config.ephemeral_library_location);
    }

    #[test]
    fn out_of_range_interface_is_a_config_error() {
        let config = ChannelConfig::from_yaml_str("used_interface: 7").unwrap();
        let err = config.interface().unwrap_err();

        assert!(matches!(err, ChannelError::Config { .. }));
        assert!(err.to_string().contains("'7'"));
    }

    #[test]
    fn malformed_yaml_is_a_config_error() {
        let err = ChannelConfig::from_yaml_str("used_interface: [").unwrap_err();
        assert!(matches!(err, ChannelError::Config { .. }));
    }

    #[test]
    fn custom_location_requires_flag_and_path() {
        let mut config = ChannelConfig {
            custom_location: Some(PathBuf::from("/games/bin")),
            ..ChannelConfig::default()
        };
        assert_eq!(config.custom_location(), None);

        config.use_custom_location = true;
        assert_eq!(config.custom_location(), Some(Path::new("/games/bin")));

        config.custom_location = Some(PathBuf::new());
        assert_eq!(config.custom_location(), None);
    }

    #[test]
    fn interface_flags() {
        assert!(InterfaceSelection::Both.uses_freetrack());
        assert!(InterfaceSelection::Both.uses_npclient());
        assert!(!InterfaceSelection::FreetrackOnly.uses_npclient());
        assert!(!InterfaceSelection::FreetrackOnly.needs_companion());
        assert!(InterfaceSelection::NpClientOnly.needs_companion());
        assert_eq!(i32::from(InterfaceSelection::NpClientOnly), 2);
    }
}
