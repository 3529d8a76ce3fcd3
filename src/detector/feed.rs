//! Live detection feed: a tokio task that pushes one simulated frame per
//! tick into an mpsc channel, aimed at whatever the consumer last published.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::detector::protocol::StreamMessage;
use crate::detector::simulated::SimulatedDetector;

/// What the simulated thrower should play for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AimTarget {
    pub score: u32,
    pub double_out: bool,
    /// No frames are produced while false.
    pub active: bool,
}

impl Default for AimTarget {
    fn default() -> Self {
        Self { score: 501, double_out: true, active: false }
    }
}

/// Handle to a running feed. Dropping it stops the task at its next tick.
pub struct DetectorFeed {
    pub frames: mpsc::Receiver<StreamMessage>,
    target: watch::Sender<AimTarget>,
    task: JoinHandle<()>,
}

impl DetectorFeed {
    /// Spawn the feed on the current runtime.
    pub fn spawn(mut detector: SimulatedDetector, interval: Duration) -> Self {
        let (tx, frames) = mpsc::channel(32);
        let (target, target_rx) = watch::channel(AimTarget::default());

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately.
            ticker.tick().await;
            tracing::info!(strategy = detector.strategy_name(), ?interval, "detector feed started");
            loop {
                ticker.tick().await;
                let aim = *target_rx.borrow();
                if !aim.active {
                    continue;
                }
                let score = detector.detect(aim.score, aim.double_out);
                tracing::debug!(total = score.total_score, "detector frame");
                let msg = StreamMessage { score: Some(score), ..StreamMessage::default() };
                if tx.send(msg).await.is_err() {
                    break;
                }
            }
            tracing::info!("detector feed stopped");
        });

        Self { frames, target, task }
    }

    /// Publish the current player's remaining score.
    pub fn aim(&self, target: AimTarget) {
        self.target.send_replace(target);
    }

    /// Stop future deliveries. Frames already queued stay readable.
    pub fn stop(&self) {
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for DetectorFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::simulated::CheckoutThrower;
    use crate::games::x01::board::{Dart, Throw};

    #[tokio::test]
    async fn test_feed_waits_until_active() {
        let detector = SimulatedDetector::new(Box::new(CheckoutThrower::new(1.0)), Some(1));
        let mut feed = DetectorFeed::spawn(detector, Duration::from_millis(5));
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(feed.frames.try_recv().is_err());

        feed.aim(AimTarget { score: 40, double_out: true, active: true });
        let msg = tokio::time::timeout(Duration::from_secs(2), feed.frames.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            msg.score.unwrap().detected_throws(),
            Ok(vec![Throw::Dart(Dart::double(20))])
        );
    }

    #[tokio::test]
    async fn test_stop_ends_deliveries() {
        let detector = SimulatedDetector::new(Box::new(CheckoutThrower::new(1.0)), Some(2));
        let mut feed = DetectorFeed::spawn(detector, Duration::from_millis(5));
        feed.aim(AimTarget { score: 501, double_out: true, active: true });
        assert!(feed.frames.recv().await.is_some());
        feed.stop();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!feed.is_running());
        while feed.frames.try_recv().is_ok() {}
        assert!(feed.frames.recv().await.is_none());
    }
}
