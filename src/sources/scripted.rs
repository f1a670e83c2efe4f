//! Scripted pose source
//!
//! Plays back a fixed list of samples at a steady tick rate, optionally
//! looping. Used for demos, benchmarks and driver tests.

use std::collections::VecDeque;
use tokio::time::{Duration, Interval, MissedTickBehavior, interval};
use tracing::{debug, trace};

use crate::source::PoseSource;
use crate::types::PoseSample;

/// Source that replays a fixed script of samples.
pub struct ScriptedSource {
    /// Samples still to play this pass
    pending: VecDeque<PoseSample>,

    /// Full script, kept when looping
    script: Vec<PoseSample>,

    looping: bool,

    /// Tick pacing
    interval: Interval,

    tick_rate: f64,
}

impl ScriptedSource {
    /// Play `script` once at `tick_rate` Hz.
    pub fn new(script: Vec<PoseSample>, tick_rate: f64) -> Self {
        let tick_rate = tick_rate.clamp(1.0, 1000.0);
        let mut interval = interval(Duration::from_secs_f64(1.0 / tick_rate));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!("Scripted source: {} samples at {}Hz", script.len(), tick_rate);

        Self { pending: script.iter().copied().collect(), script, looping: false, interval, tick_rate }
    }

    /// Restart from the first sample when the script runs out.
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    pub fn tick_rate(&self) -> f64 {
        self.tick_rate
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

#[async_trait::async_trait]
impl PoseSource for ScriptedSource {
    async fn next_sample(&mut self) -> Option<PoseSample> {
        if self.pending.is_empty() {
            if !self.looping || self.script.is_empty() {
                debug!("Reached end of script");
                return None;
            }
            trace!("Restarting script");
            self.pending.extend(self.script.iter().copied());
        }

        self.interval.tick().await;
        self.pending.pop_front()
    }
}
