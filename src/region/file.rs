//! File-backed shared region.
//!
//! Maps a regular file (typically under `/dev/shm`) read-write with
//! `memmap2`. The mapping address is page-aligned, which satisfies the 4-byte
//! alignment every [`Slot`](super::Slot) requires.

use memmap2::MmapMut;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::layout::{FtHeap, HEAP_SIZE};
use super::{RegionOpener, SharedRegion};
use crate::{ChannelError, Result};

/// A heap mapped from a file shared with consumer processes.
pub struct FileRegion {
    _file: File,
    mmap: MmapMut,
    path: PathBuf,
    name: String,
    /// Producer-created regions are unlinked on drop.
    owner: bool,
}

impl FileRegion {
    /// Create (or take over) the region file as its producer.
    ///
    /// An existing file is reused so a consumer that already opened it keeps
    /// seeing the same memory. A file that is non-empty but too small to hold
    /// the heap belongs to something else and is rejected.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let map_err = |e| ChannelError::mapping(path.display().to_string(), e);

        let file =
            OpenOptions::new().create(true).read(true).write(true).open(path).map_err(map_err)?;

        let len = file.metadata().map_err(map_err)?.len();
        if len == 0 {
            file.set_len(HEAP_SIZE as u64).map_err(map_err)?;
        } else if len < HEAP_SIZE as u64 {
            return Err(map_err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("existing region is {len} bytes, need {HEAP_SIZE}"),
            )));
        }

        let mmap = unsafe { MmapMut::map_mut(&file) }.map_err(map_err)?;
        debug!(path = %path.display(), size = mmap.len(), "Created file-backed region");

        Ok(Self::from_parts(file, mmap, path, true))
    }

    /// Open an existing region file as a consumer.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let map_err = |e| ChannelError::mapping(path.display().to_string(), e);

        let file = OpenOptions::new().read(true).write(true).open(path).map_err(map_err)?;
        let mmap = unsafe { MmapMut::map_mut(&file) }.map_err(map_err)?;
        if mmap.len() < HEAP_SIZE {
            return Err(map_err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("region is {} bytes, need {HEAP_SIZE}", mmap.len()),
            )));
        }

        Ok(Self::from_parts(file, mmap, path, false))
    }

    fn from_parts(file: File, mmap: MmapMut, path: &Path, owner: bool) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { _file: file, mmap, path: path.to_path_buf(), name, owner }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SharedRegion for FileRegion {
    fn heap(&self) -> &FtHeap {
        // SAFETY: the mapping is page-aligned and at least HEAP_SIZE bytes
        // (checked at construction). FtHeap consists only of atomics, for
        // which any bit pattern is valid, and it is only ever accessed
        // through shared references.
        unsafe { &*(self.mmap.as_ptr() as *const FtHeap) }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for FileRegion {
    fn drop(&mut self) {
        if self.owner {
            if let Err(e) = std::fs::remove_file(&self.path) {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!(path = %self.path.display(), "Failed to unlink region: {}", e);
                }
            }
        }
    }
}

/// Creates a [`FileRegion`] at a fixed path.
#[derive(Debug, Clone)]
pub struct FileRegionOpener {
    path: PathBuf,
}

impl FileRegionOpener {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl RegionOpener for FileRegionOpener {
    fn open(&self) -> Result<Box<dyn SharedRegion>> {
        Ok(Box::new(FileRegion::create(&self.path)?))
    }
}
