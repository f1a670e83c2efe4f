//! Windows backends
//!
//! FreeTrack clients find the producer through two Windows facilities: a
//! pagefile-backed file mapping named `FT_SharedMem`, and per-user registry
//! keys naming the directory their client library lives in.
//!
//! ```rust,ignore
//! use posewire::windows::{NamedRegion, WindowsRegistry};
//!
//! let region = NamedRegion::create("FT_SharedMem")?;
//! region.heap().data.yaw.store(0.1);
//! ```

mod mapping;
mod registry;

pub use mapping::{NamedRegion, NamedRegionOpener};
pub use registry::WindowsRegistry;

/// Convert string to null-terminated wide string for Windows APIs
fn wide_string(s: &str) -> Vec<u16> {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
}
