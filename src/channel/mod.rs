//! Pose channel lifecycle.
//!
//! A [`PoseChannel`] moves through `Uninitialized → Mapped → Publishing →
//! Closed`. Only [`start`](PoseChannel::start) can fail; once publishing,
//! [`publish`](PoseChannel::publish) is fire-and-forget.
//!
//! [`FreetrackChannel`] is the FreeTrack 2.0 implementation. Its collaborators
//! (region, location registry, companion process, calibration provider) are
//! platform defaults unless replaced before `start`:
//!
//! ```rust
//! use posewire::{ChannelConfig, FreetrackChannel, PoseChannel, Pose};
//! use posewire::install::MemoryRegistry;
//! use posewire::region::LocalRegion;
//!
//! # fn main() -> posewire::Result<()> {
//! let config = ChannelConfig { used_interface: 1, ..ChannelConfig::default() };
//! let mut channel = FreetrackChannel::new(config)
//!     .with_region(LocalRegion::new())
//!     .with_location_registry(MemoryRegistry::new());
//!
//! channel.start()?;
//! let pose = Pose::new(10.0, 5.0, 0.0, 1.0, 0.0, 0.0);
//! channel.publish(&pose, &pose);
//! channel.shutdown();
//! # Ok(())
//! # }
//! ```

mod publish;

pub use publish::{ConsumerName, Publisher, TickOutcome};

use std::sync::Arc;
use tracing::{debug, info, trace, warn};

use crate::calibration::{CalibrationProvider, GameRegistry};
use crate::companion::{COMPANION_EXIT_TIMEOUT, ChildCompanion, CompanionProcess};
use crate::config::{ChannelConfig, InterfaceSelection};
use crate::install::{self, LocationRegistry};
use crate::region::{self, RegionOpener, SharedRegion};
use crate::types::{ChannelState, Pose};
use crate::Result;

/// Game registry shipped next to the client libraries, used when the
/// configuration names none.
pub const BUNDLED_GAMES_FILE: &str = "games.yaml";

/// Capability set of a pose publication channel.
pub trait PoseChannel: Send {
    /// Acquire the shared region and prepare it for publishing.
    fn start(&mut self) -> Result<()>;

    /// Publish one tick. Ignored unless the channel is publishing.
    fn publish(&mut self, pose: &Pose, raw: &Pose);

    /// Display name of the consumer currently connected.
    fn current_consumer_name(&self) -> String;

    /// Stop publishing and release resources. Idempotent.
    fn shutdown(&mut self);

    /// Current lifecycle state.
    fn state(&self) -> ChannelState;

    /// Consumer identity acknowledged most recently, if any.
    fn acknowledged_consumer(&self) -> Option<i32> {
        None
    }
}

/// FreeTrack 2.0 compatible channel.
pub struct FreetrackChannel {
    config: ChannelConfig,
    state: ChannelState,
    opener: Box<dyn RegionOpener>,
    region: Option<Box<dyn SharedRegion>>,
    registry: Option<Box<dyn LocationRegistry>>,
    companion: Box<dyn CompanionProcess>,
    calibration: Option<Arc<dyn CalibrationProvider>>,
    publisher: Option<Publisher>,
    names: ConsumerName,
}

impl FreetrackChannel {
    /// Channel with platform-default collaborators.
    pub fn new(config: ChannelConfig) -> Self {
        let opener = region::default_opener(&config.region_name);
        let companion = Box::new(ChildCompanion::in_install_dir(&config.install_dir));

        Self {
            config,
            state: ChannelState::Uninitialized,
            opener,
            region: None,
            registry: None,
            companion,
            calibration: None,
            publisher: None,
            names: ConsumerName::default(),
        }
    }

    pub fn with_region(mut self, opener: impl RegionOpener + 'static) -> Self {
        self.opener = Box::new(opener);
        self
    }

    pub fn with_location_registry(mut self, registry: impl LocationRegistry + 'static) -> Self {
        self.registry = Some(Box::new(registry));
        self
    }

    pub fn with_companion(mut self, companion: impl CompanionProcess + 'static) -> Self {
        self.companion = Box::new(companion);
        self
    }

    pub fn with_calibration(mut self, provider: Arc<dyn CalibrationProvider>) -> Self {
        self.calibration = Some(provider);
        self
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// The mapped region, while the channel holds one.
    pub fn region(&self) -> Option<&dyn SharedRegion> {
        self.region.as_deref()
    }

    pub fn location_registry(&self) -> Option<&dyn LocationRegistry> {
        self.registry.as_deref()
    }

    /// Handle for reading the connected consumer's name from other threads.
    ///
    /// The handle stays valid across restarts of this channel.
    pub fn consumer_name_handle(&self) -> ConsumerName {
        self.names.clone()
    }

    pub fn companion_running(&mut self) -> bool {
        self.companion.is_running()
    }

    fn calibration_provider(&mut self) -> Result<Arc<dyn CalibrationProvider>> {
        if let Some(provider) = &self.calibration {
            return Ok(Arc::clone(provider));
        }

        let registry = match &self.config.games {
            Some(path) => GameRegistry::from_file(path)?,
            None => {
                let bundled = self.config.install_dir.join(BUNDLED_GAMES_FILE);
                if bundled.is_file() {
                    debug!(path = %bundled.display(), "Loading bundled game registry");
                    GameRegistry::from_file(&bundled)?
                } else {
                    GameRegistry::empty()
                }
            }
        };
        let provider: Arc<dyn CalibrationProvider> = Arc::new(registry);
        self.calibration = Some(Arc::clone(&provider));
        Ok(provider)
    }

    /// Everything after the region is mapped. Any error leaves the
    /// registry and companion untouched by later steps.
    fn prepare(&mut self) -> Result<()> {
        let interface = self.config.interface()?;
        let calibration = self.calibration_provider()?;

        let location = install::install_libraries(&self.config, interface)?;
        if self.registry.is_none() {
            self.registry = Some(install::default_registry()?);
        }
        if let Some(registry) = self.registry.as_deref_mut() {
            install::advertise(registry, &location, interface)?;
        }

        let mut publisher = Publisher::with_name(calibration, self.names.clone());
        if let Some(region) = &self.region {
            publisher.initialize(region.heap());
        }
        self.publisher = Some(publisher);

        self.start_companion(interface);
        Ok(())
    }

    fn start_companion(&mut self, interface: InterfaceSelection) {
        if !interface.needs_companion() {
            return;
        }
        if let Err(e) = self.companion.start() {
            warn!("Failed to start companion process: {}", e);
        }
    }
}

impl PoseChannel for FreetrackChannel {
    fn start(&mut self) -> Result<()> {
        if self.state == ChannelState::Publishing {
            debug!("Channel already publishing");
            return Ok(());
        }

        info!(region = %self.config.region_name, "Starting pose channel");

        let region = self.opener.open()?;
        debug!(region = region.name(), "Mapped shared region");
        self.region = Some(region);
        self.state = ChannelState::Mapped;

        if let Err(e) = self.prepare() {
            self.region = None;
            self.publisher = None;
            self.state = ChannelState::Uninitialized;
            return Err(e);
        }

        self.state = ChannelState::Publishing;
        info!("Pose channel publishing");
        Ok(())
    }

    fn publish(&mut self, pose: &Pose, raw: &Pose) {
        if self.state != ChannelState::Publishing {
            trace!(state = ?self.state, "Ignoring tick while not publishing");
            return;
        }

        if let (Some(region), Some(publisher)) = (&self.region, &mut self.publisher) {
            publisher.publish(region.heap(), pose, raw);
        }
    }

    fn current_consumer_name(&self) -> String {
        self.names.get()
    }

    fn shutdown(&mut self) {
        if matches!(self.state, ChannelState::Uninitialized | ChannelState::Closed) {
            return;
        }

        if self.config.ephemeral_library_location {
            if let Some(registry) = self.registry.as_deref_mut() {
                if let Err(e) = install::withdraw(registry) {
                    warn!("Failed to clear advertised library location: {}", e);
                }
            }
        }
        self.companion.terminate(COMPANION_EXIT_TIMEOUT);

        self.publisher = None;
        self.region = None;
        self.state = ChannelState::Closed;
        info!("Pose channel closed");
    }

    fn state(&self) -> ChannelState {
        self.state
    }

    fn acknowledged_consumer(&self) -> Option<i32> {
        self.publisher.as_ref().and_then(Publisher::acknowledged_id)
    }
}

impl Drop for FreetrackChannel {
    fn drop(&mut self) {
        self.shutdown();
    }
}
