//! Client library installation and location advertisement.
//!
//! Consumers find the FreeTrack and NPClient client libraries through a
//! per-user key-value store (the Windows registry on Windows). At startup the
//! channel copies the libraries into a custom directory when one is
//! configured, then writes the chosen directory into that store. An ephemeral
//! session clears the entries again on shutdown.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{ChannelConfig, InterfaceSelection};
use crate::{ChannelError, Result};

#[cfg(windows)]
const FREETRACK_LIBRARIES: [&str; 2] = ["freetrackclient.dll", "freetrackclient64.dll"];
#[cfg(windows)]
const NPCLIENT_LIBRARIES: [&str; 2] = ["NPClient.dll", "NPClient64.dll"];
#[cfg(not(windows))]
const FREETRACK_LIBRARIES: [&str; 2] = ["libfreetrackclient.so", "libfreetrackclient64.so"];
#[cfg(not(windows))]
const NPCLIENT_LIBRARIES: [&str; 2] = ["libnpclient.so", "libnpclient64.so"];

/// The two client families a location is advertised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClientKind {
    /// `HKCU\Software\Freetrack\FreetrackClient`
    Freetrack,
    /// `HKCU\Software\NaturalPoint\NATURALPOINT\NPClient Location`
    NpClient,
}

impl ClientKind {
    pub const ALL: [ClientKind; 2] = [ClientKind::Freetrack, ClientKind::NpClient];

    /// Registry subkey below `HKCU\Software`.
    pub fn registry_key(self) -> &'static str {
        match self {
            ClientKind::Freetrack => "Freetrack\\FreetrackClient",
            ClientKind::NpClient => "NaturalPoint\\NATURALPOINT\\NPClient Location",
        }
    }

    /// Client libraries for this family, 32-bit then 64-bit.
    pub fn library_files(self) -> [&'static str; 2] {
        match self {
            ClientKind::Freetrack => FREETRACK_LIBRARIES,
            ClientKind::NpClient => NPCLIENT_LIBRARIES,
        }
    }

    fn enabled_by(self, interface: InterfaceSelection) -> bool {
        match self {
            ClientKind::Freetrack => interface.uses_freetrack(),
            ClientKind::NpClient => interface.uses_npclient(),
        }
    }
}

/// Per-user store advertising where consumers find the client libraries.
pub trait LocationRegistry: Send {
    /// The advertised path, if any.
    fn get(&self, kind: ClientKind) -> Option<String>;

    /// Advertise `path`. An empty string withdraws the advertisement.
    fn set(&mut self, kind: ClientKind, path: &str) -> Result<()>;
}

/// In-process registry.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    paths: BTreeMap<ClientKind, String>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocationRegistry for MemoryRegistry {
    fn get(&self, kind: ClientKind) -> Option<String> {
        self.paths.get(&kind).cloned()
    }

    fn set(&mut self, kind: ClientKind, path: &str) -> Result<()> {
        self.paths.insert(kind, path.to_string());
        Ok(())
    }
}

/// Registry persisted as a small YAML document, for platforms without a
/// system registry.
#[derive(Debug, Clone)]
pub struct FileRegistry {
    path: PathBuf,
    paths: BTreeMap<ClientKind, String>,
}

impl FileRegistry {
    /// Load the document at `path`; a missing file starts empty.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        let paths = match std::fs::read_to_string(&path) {
            Ok(yaml) if !yaml.trim().is_empty() => serde_yaml_ng::from_str(&yaml)?,
            Ok(_) => BTreeMap::new(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(ChannelError::install(path, Some(e))),
        };
        Ok(Self { path, paths })
    }

    fn persist(&self) -> Result<()> {
        let yaml = serde_yaml_ng::to_string(&self.paths)?;
        std::fs::write(&self.path, yaml).map_err(|e| ChannelError::install(&self.path, Some(e)))
    }
}

impl LocationRegistry for FileRegistry {
    fn get(&self, kind: ClientKind) -> Option<String> {
        self.paths.get(&kind).cloned()
    }

    fn set(&mut self, kind: ClientKind, path: &str) -> Result<()> {
        self.paths.insert(kind, path.to_string());
        self.persist()
    }
}

/// The platform's default location registry.
pub fn default_registry() -> Result<Box<dyn LocationRegistry>> {
    #[cfg(windows)]
    {
        Ok(Box::new(crate::windows::WindowsRegistry))
    }

    #[cfg(not(windows))]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
            .unwrap_or_else(std::env::temp_dir);
        let dir = base.join("posewire");
        std::fs::create_dir_all(&dir).map_err(|e| ChannelError::install(&dir, Some(e)))?;
        Ok(Box::new(FileRegistry::open(dir.join("client-locations.yaml"))?))
    }
}

/// Copy any missing client libraries into the custom location and return the
/// directory to advertise.
///
/// Falls back to `install_dir` when no custom location is configured or the
/// configured directory does not exist. Every copy is attempted; the first
/// failure is reported once all of them have run.
pub fn install_libraries(config: &ChannelConfig, interface: InterfaceSelection) -> Result<PathBuf> {
    let Some(location) = config.custom_location().filter(|dir| dir.is_dir()) else {
        return Ok(config.install_dir.clone());
    };

    let mut first_failure = None;
    for kind in ClientKind::ALL.into_iter().filter(|k| k.enabled_by(interface)) {
        for file in kind.library_files() {
            let target = location.join(file);
            if target.exists() {
                continue;
            }

            let source = config.install_dir.join(file);
            match std::fs::copy(&source, &target) {
                Ok(_) => {
                    debug!(from = %source.display(), to = %target.display(), "Copied client library")
                }
                Err(e) => {
                    warn!(from = %source.display(), error = %e, "Failed to copy client library");
                    first_failure.get_or_insert(e);
                }
            }
        }
    }

    match first_failure {
        Some(e) => Err(ChannelError::install(location, Some(e))),
        None => Ok(location.to_path_buf()),
    }
}

/// Advertise `location` for every enabled client family and withdraw it for
/// the others.
pub fn advertise(
    registry: &mut dyn LocationRegistry,
    location: &Path,
    interface: InterfaceSelection,
) -> Result<()> {
    let location = normalize_location(location);

    for kind in ClientKind::ALL {
        let value = if kind.enabled_by(interface) { location.as_str() } else { "" };
        registry.set(kind, value)?;
    }

    info!(location = %location, ?interface, "Advertised client library location");
    Ok(())
}

/// Clear every advertised location.
pub fn withdraw(registry: &mut dyn LocationRegistry) -> Result<()> {
    for kind in ClientKind::ALL {
        registry.set(kind, "")?;
    }
    Ok(())
}

/// Forward slashes and a trailing separator, as client libraries expect.
pub fn normalize_location(location: &Path) -> String {
    let mut location = location.to_string_lossy().replace('\\', "/");
    if !location.ends_with('/') {
        location.push('/');
    }
    location
}
