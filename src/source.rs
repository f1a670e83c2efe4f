//! Pose source trait

use futures::{Stream, StreamExt};

use crate::types::PoseSample;

/// Supplier of pose samples for the tick driver.
///
/// Sources pace themselves: `next_sample` resolves when the next tick's pose
/// is ready. How the pose is computed is entirely up to the source.
#[async_trait::async_trait]
pub trait PoseSource: Send + 'static {
    /// Get the next sample
    ///
    /// Returns:
    /// - `Some(sample)` - publish this sample now
    /// - `None` - the source is exhausted and the driver should stop
    async fn next_sample(&mut self) -> Option<PoseSample>;
}

/// Adapts any `Stream` of samples into a [`PoseSource`].
pub struct StreamSource<S> {
    stream: S,
}

impl<S> StreamSource<S>
where
    S: Stream<Item = PoseSample> + Unpin + Send + 'static,
{
    pub fn new(stream: S) -> Self {
        Self { stream }
    }
}

#[async_trait::async_trait]
impl<S> PoseSource for StreamSource<S>
where
    S: Stream<Item = PoseSample> + Unpin + Send + 'static,
{
    async fn next_sample(&mut self) -> Option<PoseSample> {
        self.stream.next().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Pose;

    #[tokio::test]
    async fn stream_source_yields_then_ends() {
        let samples = vec![
            PoseSample::unfiltered(Pose::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0)),
            PoseSample::unfiltered(Pose::new(2.0, 0.0, 0.0, 0.0, 0.0, 0.0)),
        ];
        let mut source = StreamSource::new(futures::stream::iter(samples));

        assert_eq!(source.next_sample().await.map(|s| s.pose.yaw), Some(1.0));
        assert_eq!(source.next_sample().await.map(|s| s.pose.yaw), Some(2.0));
        assert!(source.next_sample().await.is_none());
    }
}
