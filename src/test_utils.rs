//! Test doubles for the channel's external collaborators.
//!
//! These stand in for the location registry, the companion process and the
//! region opener so lifecycle behavior can be observed without touching the
//! user's registry or spawning processes.

#![cfg(any(test, feature = "benchmark"))]

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::companion::CompanionProcess;
use crate::install::{ClientKind, LocationRegistry};
use crate::region::{RegionOpener, SharedRegion};
use crate::{ChannelError, Result};

/// Location registry that records every write in a shared log.
#[derive(Debug, Clone, Default)]
pub struct RecordingRegistry {
    writes: Arc<Mutex<Vec<(ClientKind, String)>>>,
}

impl RecordingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `set` call so far, in order.
    pub fn writes(&self) -> Vec<(ClientKind, String)> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl LocationRegistry for RecordingRegistry {
    fn get(&self, kind: ClientKind) -> Option<String> {
        self.writes().into_iter().rev().find(|(k, _)| *k == kind).map(|(_, path)| path)
    }

    fn set(&mut self, kind: ClientKind, path: &str) -> Result<()> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner).push((kind, path.to_string()));
        Ok(())
    }
}

/// Companion process that only counts calls.
#[derive(Debug, Clone, Default)]
pub struct FakeCompanion {
    starts: Arc<AtomicUsize>,
    terminations: Arc<AtomicUsize>,
    running: Arc<AtomicUsize>,
}

impl FakeCompanion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn terminations(&self) -> usize {
        self.terminations.load(Ordering::SeqCst)
    }
}

impl CompanionProcess for FakeCompanion {
    fn start(&mut self) -> io::Result<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.running.store(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_running(&mut self) -> bool {
        self.running.load(Ordering::SeqCst) == 1
    }

    fn terminate(&mut self, _timeout: Duration) {
        if self.running.swap(0, Ordering::SeqCst) == 1 {
            self.terminations.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Region opener that always fails with `PermissionDenied`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedRegion;

impl RegionOpener for DeniedRegion {
    fn open(&self) -> Result<Box<dyn SharedRegion>> {
        Err(ChannelError::mapping(
            "FT_SharedMem",
            io::Error::new(io::ErrorKind::PermissionDenied, "access denied"),
        ))
    }
}
