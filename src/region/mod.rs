//! Shared region access.
//!
//! The producer publishes into an [`FtHeap`] that lives in memory shared with
//! consumer processes. How that memory is obtained is a platform concern, so
//! it hides behind two small traits:
//!
//! - [`RegionOpener`] performs the one-time, single-attempt acquisition and
//!   is the only place a [`ChannelError::Mapping`](crate::ChannelError::Mapping)
//!   can come from.
//! - [`SharedRegion`] hands out the mapped heap for as long as the region is
//!   alive; dropping it releases the mapping.
//!
//! Backends:
//!
//! - [`LocalRegion`]: process-local heap, for tests and in-process consumers
//! - [`FileRegion`]: file-backed mapping (`memmap2`), e.g. under `/dev/shm`
//! - `windows::NamedRegion`: the `FT_SharedMem` file mapping FreeTrack clients open

mod file;
pub mod layout;
pub mod slot;

pub use file::{FileRegion, FileRegionOpener};
pub use layout::{FREETRACK_HEAP, FtData, FtHeap, HEAP_SIZE};
pub use slot::{Slot, Word};

use std::sync::Arc;

use crate::Result;

/// A mapped shared heap.
pub trait SharedRegion: Send + Sync {
    /// The mapped heap. Valid for the lifetime of the region.
    fn heap(&self) -> &FtHeap;

    /// Name used in log output and errors.
    fn name(&self) -> &str;
}

/// One-shot acquisition of a [`SharedRegion`].
pub trait RegionOpener: Send {
    /// Create or open the region. Called once per channel start, never retried.
    fn open(&self) -> Result<Box<dyn SharedRegion>>;
}

/// A heap in ordinary process memory.
///
/// Cloning shares the same heap, so a clone can serve as the consumer side of
/// an in-process channel.
#[derive(Debug, Clone, Default)]
pub struct LocalRegion {
    heap: Arc<FtHeap>,
}

impl LocalRegion {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SharedRegion for LocalRegion {
    fn heap(&self) -> &FtHeap {
        &self.heap
    }

    fn name(&self) -> &str {
        "local"
    }
}

/// Opens a clone of an existing [`LocalRegion`].
impl RegionOpener for LocalRegion {
    fn open(&self) -> Result<Box<dyn SharedRegion>> {
        Ok(Box::new(self.clone()))
    }
}

/// The platform's default region: the named mapping on Windows, a file under
/// `/dev/shm` elsewhere.
pub fn default_opener(name: &str) -> Box<dyn RegionOpener> {
    #[cfg(windows)]
    {
        Box::new(crate::windows::NamedRegionOpener::new(name))
    }

    #[cfg(not(windows))]
    {
        Box::new(FileRegionOpener::new(std::path::Path::new("/dev/shm").join(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_region_clones_share_the_heap() {
        let producer = LocalRegion::new();
        let opened = producer.open().unwrap();

        producer.heap().data.yaw.store(1.5);
        assert_eq!(opened.heap().data.yaw.load(), 1.5);

        opened.heap().game_id.store(42);
        assert_eq!(producer.heap().game_id.load(), 42);
    }
}
