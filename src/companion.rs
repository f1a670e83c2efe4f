//! Companion compatibility process.
//!
//! Some NPClient consumers refuse to talk to the tracker unless a process with
//! a known name is running. The channel starts a small shim executable from
//! the install directory and stops it again on shutdown.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How long shutdown waits for the companion to exit after killing it.
pub const COMPANION_EXIT_TIMEOUT: Duration = Duration::from_millis(100);

#[cfg(windows)]
const COMPANION_PROGRAM: &str = "TrackIR.exe";
#[cfg(not(windows))]
const COMPANION_PROGRAM: &str = "trackir-compat";

/// Control over an external helper process.
pub trait CompanionProcess: Send {
    /// Launch the process. Launch failures are reported, not retried.
    fn start(&mut self) -> std::io::Result<()>;

    fn is_running(&mut self) -> bool;

    /// Kill the process and wait up to `timeout` for it to exit.
    fn terminate(&mut self, timeout: Duration);
}

/// Companion backed by a child process.
#[derive(Debug)]
pub struct ChildCompanion {
    program: PathBuf,
    child: Option<Child>,
}

impl ChildCompanion {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self { program: program.into(), child: None }
    }

    /// The platform shim inside `install_dir`.
    pub fn in_install_dir(install_dir: &Path) -> Self {
        Self::new(install_dir.join(COMPANION_PROGRAM))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl CompanionProcess for ChildCompanion {
    fn start(&mut self) -> std::io::Result<()> {
        if self.is_running() {
            return Ok(());
        }

        let child = Command::new(&self.program)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        info!(program = %self.program.display(), pid = child.id(), "Started companion process");
        self.child = Some(child);
        Ok(())
    }

    fn is_running(&mut self) -> bool {
        match self.child.as_mut().map(Child::try_wait) {
            Some(Ok(None)) => true,
            Some(Ok(Some(status))) => {
                debug!(%status, "Companion process exited");
                self.child = None;
                false
            }
            Some(Err(e)) => {
                warn!("Failed to query companion process: {}", e);
                false
            }
            None => false,
        }
    }

    fn terminate(&mut self, timeout: Duration) {
        let Some(mut child) = self.child.take() else {
            return;
        };

        if let Err(e) = child.kill() {
            // Already exited; reap below.
            debug!("Companion kill failed: {}", e);
        }

        let deadline = Instant::now() + timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    debug!(%status, "Companion process stopped");
                    return;
                }
                Ok(None) if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(5));
                }
                Ok(None) => {
                    warn!(timeout_ms = timeout.as_millis() as u64, "Companion did not exit in time");
                    return;
                }
                Err(e) => {
                    warn!("Failed to wait for companion process: {}", e);
                    return;
                }
            }
        }
    }
}

impl Drop for ChildCompanion {
    fn drop(&mut self) {
        self.terminate(COMPANION_EXIT_TIMEOUT);
    }
}
