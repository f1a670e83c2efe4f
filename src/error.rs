//! Error types for the pose channel.
//!
//! Every error in this crate is a startup error. Once a channel reaches the
//! publishing state, a tick cannot fail, so there is no error
//! kind for steady-state publication.
//!
//! ## Error Categories
//!
//! - **Mapping Errors**: the shared region could not be created or opened
//! - **Install Errors**: a client library could not be placed in the custom location
//! - **Config Errors**: invalid interface selection or unreadable configuration
//! - **Platform Errors**: features that only exist on one operating system
//!
//! ## Recovery
//!
//! Startup errors are never retried by the channel itself. The helpers below
//! exist so an operator-facing layer can explain what went wrong:
//!
//! ```rust
//! use posewire::ChannelError;
//!
//! let error = ChannelError::config("used_interface", "wrong interface selection '7'");
//! assert!(!error.is_retryable());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

#[cfg(windows)]
use windows_core as core;

/// Result type alias for channel operations.
pub type Result<T, E = ChannelError> = std::result::Result<T, E>;

/// Main error type for channel startup.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ChannelError {
    #[error("Can't load shared memory mapping '{name}'")]
    Mapping {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Can't copy library to selected custom location '{}'", .path.display())]
    Install {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Invalid configuration value for {field}: {details}")]
    Config { field: String, details: String },

    #[error("{feature} is only available on {required_platform}")]
    UnsupportedPlatform { feature: String, required_platform: String },

    #[error("Windows API error: {operation}")]
    #[cfg(windows)]
    WindowsApi {
        operation: String,
        #[source]
        source: core::Error,
    },
}

impl ChannelError {
    /// Returns whether this error is potentially recoverable through retry.
    ///
    /// The channel starts cleanly or not at all, so nothing here is retried
    /// automatically.
    pub fn is_retryable(&self) -> bool {
        match self {
            ChannelError::Mapping { .. } => false,
            ChannelError::Install { .. } => false,
            ChannelError::Config { .. } => false,
            ChannelError::UnsupportedPlatform { .. } => false,
            #[cfg(windows)]
            ChannelError::WindowsApi { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            ChannelError::Mapping { .. } => vec![
                "Check permissions for creating the shared memory region",
                "Close other programs publishing head tracking data",
                "Verify the region name is not used with a different size",
            ],
            ChannelError::Install { .. } => vec![
                "Check the custom location is writable",
                "Verify the client libraries exist in the install directory",
                "Disable the custom location to use the install directory",
            ],
            ChannelError::Config { .. } => vec![
                "Select FreeTrack, NPClient or both as interface",
                "Check the configuration file syntax",
            ],
            ChannelError::UnsupportedPlatform { .. } => vec![
                "Use platform-appropriate features",
                "Use a file-backed region on this platform",
            ],
            #[cfg(windows)]
            ChannelError::WindowsApi { .. } => vec![
                "Check Windows API permissions",
                "Verify system resources availability",
            ],
        }
    }

    /// Helper constructor for mapping errors.
    pub fn mapping(name: impl Into<String>, source: std::io::Error) -> Self {
        ChannelError::Mapping { name: name.into(), source }
    }

    /// Helper constructor for install errors with the offending path.
    pub fn install(path: impl Into<PathBuf>, source: Option<std::io::Error>) -> Self {
        ChannelError::Install { path: path.into(), source }
    }

    /// Helper constructor for configuration errors.
    pub fn config(field: impl Into<String>, details: impl Into<String>) -> Self {
        ChannelError::Config { field: field.into(), details: details.into() }
    }

    /// Helper constructor for unsupported platform errors.
    pub fn unsupported_platform(
        feature: impl Into<String>,
        required_platform: impl Into<String>,
    ) -> Self {
        ChannelError::UnsupportedPlatform {
            feature: feature.into(),
            required_platform: required_platform.into(),
        }
    }

    /// Helper constructor for Windows API errors.
    #[cfg(windows)]
    pub fn windows_api_error(operation: impl Into<String>, source: core::Error) -> Self {
        ChannelError::WindowsApi { operation: operation.into(), source }
    }
}

impl From<serde_yaml_ng::Error> for ChannelError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        ChannelError::Config { field: "<yaml>".to_string(), details: err.to_string() }
    }
}

#[cfg(windows)]
impl From<core::Error> for ChannelError {
    fn from(err: core::Error) -> Self {
        ChannelError::WindowsApi {
            operation: "Unknown Windows operation".to_string(),
            source: err,
        }
    }
}
