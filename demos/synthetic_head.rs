//! Publish a synthetic head sweep into FT_SharedMem
//!
//! Runs the default FreeTrack channel for ten seconds, feeding it a slow
//! yaw/pitch sweep, and logs every consumer that connects.
//!
//! ```text
//! RUST_LOG=posewire=debug cargo run --example synthetic_head -- [config.yaml]
//! ```

use futures::StreamExt;
use posewire::sources::ScriptedSource;
use posewire::{ChannelConfig, Pose, PoseChannel, PoseSample, Posewire};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

const TICK_RATE: f64 = 60.0;

fn sweep() -> Vec<PoseSample> {
    (0..(TICK_RATE as usize * 4))
        .map(|i| {
            let t = i as f64 / TICK_RATE * std::f64::consts::FRAC_PI_2;
            let pose = Pose::new(30.0 * t.sin(), 10.0 * (2.0 * t).sin(), 0.0, 0.0, 0.0, 2.0 * t.cos());
            PoseSample::unfiltered(pose)
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ChannelConfig::from_file(path)?,
        None => ChannelConfig::default(),
    };
    info!(region = %config.region_name, "Publishing synthetic head motion");

    let handle = Posewire::spawn(config, ScriptedSource::new(sweep(), TICK_RATE).looping())?;
    let mut updates = handle.status_updates();

    let watch_consumers = async {
        let mut last = None;
        while let Some(status) = updates.next().await {
            if status.consumer_id != last {
                info!(id = ?status.consumer_id, name = %status.consumer_name, "Consumer connected");
                last = status.consumer_id;
            }
        }
    };

    let _ = tokio::time::timeout(Duration::from_secs(10), watch_consumers).await;

    if let Some(channel) = handle.stop().await {
        info!(state = ?channel.state(), "Stopped");
    }
    Ok(())
}
