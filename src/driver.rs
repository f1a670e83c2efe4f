//! Driver runs the tick loop that feeds a pose channel

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::channel::PoseChannel;
use crate::source::PoseSource;
use crate::types::PublishStatus;

/// Handle to a running tick loop
pub struct DriverHandle<C> {
    /// Receiver for publication status
    pub status: watch::Receiver<PublishStatus>,
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
    task: JoinHandle<C>,
}

impl<C> DriverHandle<C> {
    /// Status updates as a stream, starting with the current value.
    pub fn status_updates(&self) -> WatchStream<PublishStatus> {
        WatchStream::new(self.status.clone())
    }

    /// Whether the tick loop has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the loop and wait for it to exit.
    ///
    /// Returns the channel, already shut down, or `None` if the loop panicked.
    pub async fn stop(self) -> Option<C> {
        self.cancel.cancel();
        self.join().await
    }

    /// Wait for the loop to exit on its own, e.g. when the source runs dry.
    pub async fn join(self) -> Option<C> {
        self.task.await.ok()
    }
}

/// Driver owns a started channel and publishes every sample its source yields
///
/// The loop ends when the source is exhausted or the cancellation token fires.
/// Either way the channel is shut down before the task returns it.
pub struct Driver;

impl Driver {
    /// Spawn the tick loop for `channel` and `source`
    ///
    /// The channel should already be started; ticks on a channel that is not
    /// publishing are dropped by the channel itself.
    pub fn spawn<C, S>(channel: C, source: S) -> DriverHandle<C>
    where
        C: PoseChannel + 'static,
        S: PoseSource,
    {
        let (status_tx, status_rx) = watch::channel(PublishStatus::default());
        let cancel = CancellationToken::new();
        let cancel_loop = cancel.clone();

        let task =
            tokio::spawn(async move { Self::tick_task(channel, source, status_tx, cancel_loop).await });

        DriverHandle { status: status_rx, cancel, task }
    }

    async fn tick_task<C, S>(
        mut channel: C,
        mut source: S,
        status_tx: watch::Sender<PublishStatus>,
        cancel: CancellationToken,
    ) -> C
    where
        C: PoseChannel,
        S: PoseSource,
    {
        info!("Tick loop started");
        let mut ticks = 0u64;

        loop {
            let sample = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Tick loop cancelled");
                    break;
                }
                sample = source.next_sample() => sample,
            };

            let Some(sample) = sample else {
                info!("Pose source ended after {} ticks", ticks);
                break;
            };

            channel.publish(&sample.pose, &sample.raw);
            ticks += 1;
            trace!("Tick {}: yaw={:.2}", ticks, sample.pose.yaw);

            let consumer_id = channel.acknowledged_consumer();
            status_tx.send_modify(|status| {
                status.ticks = ticks;
                if status.consumer_id != consumer_id {
                    debug!("Consumer changed: {:?} -> {:?}", status.consumer_id, consumer_id);
                    status.consumer_id = consumer_id;
                    status.consumer_name = channel.current_consumer_name();
                }
            });
        }

        channel.shutdown();
        info!("Tick loop ended (published {} ticks)", ticks);
        channel
    }
}
