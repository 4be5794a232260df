use crate::feed::ObservationFeed;
use crate::sink::NotificationSink;
use crate::status_bridge::StatusBridge;
use log::{info, warn};
use overheadcore::{EventKind, ProximityTracker, TrackerEvent};
use std::future::Future;
use std::time::Duration;
use tokio::sync::oneshot;

/// Totals reported at the end of a bounded run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub ticks: usize,
    pub entered: usize,
    pub exited: usize,
    pub records: usize,
}

/// Listens for `signal` on a background task. The listener is registered
/// before this returns, so a signal raised during the first tick still
/// stops the loop at the next tick boundary.
pub async fn arm_shutdown<F>(signal: F) -> oneshot::Receiver<()>
where
    F: Future<Output = std::io::Result<()>> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        match signal.await {
            Ok(()) => {
                let _ = tx.send(());
            }
            Err(err) => {
                warn!("awaiting shutdown signal failed: {}", err);
                // Holding the sender keeps the loop running.
                std::future::pending::<()>().await;
                drop(tx);
            }
        }
    });
    tokio::task::yield_now().await;
    rx
}

/// Drives the tracker: one feed fetch, one state update and the resulting
/// notifications per tick.
pub struct Runner {
    tracker: ProximityTracker,
    feed: Box<dyn ObservationFeed>,
    sink: Box<dyn NotificationSink>,
    bridge: Option<StatusBridge>,
}

impl Runner {
    pub fn new(
        tracker: ProximityTracker,
        feed: Box<dyn ObservationFeed>,
        sink: Box<dyn NotificationSink>,
    ) -> Self {
        Self {
            tracker,
            feed,
            sink,
            bridge: None,
        }
    }

    pub fn with_bridge(mut self, bridge: StatusBridge) -> Self {
        bridge.publish(&self.tracker, &[]);
        self.bridge = Some(bridge);
        self
    }

    /// Runs one tick. Feed and sink failures are logged and counted; they
    /// never abort the tick.
    pub async fn tick(&mut self) -> Vec<TrackerEvent> {
        let batch = match self.feed.fetch().await {
            Ok(batch) => batch,
            Err(err) => {
                warn!("feed error: {:#}", err);
                self.tracker.metrics().record_error();
                Vec::new()
            }
        };

        let events = self.tracker.observe(&batch);
        for event in &events {
            if let Err(err) = self.sink.notify(event).await {
                warn!("notification failed for {}: {:#}", event.callsign, err);
                self.tracker.metrics().record_error();
            }
        }

        if let Some(bridge) = &self.bridge {
            bridge.publish(&self.tracker, &events);
        }
        events
    }

    /// Ticks with a fixed delay between completions until `shutdown`
    /// resolves. Shutdown is only observed between ticks.
    pub async fn run_until<F>(&mut self, poll_interval: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            self.tick().await;
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested, stopping after completed tick");
                    break;
                }
                _ = tokio::time::sleep(poll_interval) => {}
            }
        }
    }

    /// Ticks until the feed is exhausted, then once more so a trailing
    /// encounter is closed.
    pub async fn run_to_completion(&mut self) -> RunSummary {
        let mut summary = RunSummary::default();
        loop {
            let exhausted = self.feed.exhausted();
            let events = self.tick().await;
            summary.ticks += 1;
            summary.entered += events
                .iter()
                .filter(|e| e.kind == EventKind::Entered)
                .count();
            summary.exited += events
                .iter()
                .filter(|e| e.kind == EventKind::Exited)
                .count();
            if exhausted && self.tracker.active().is_none() {
                break;
            }
        }
        summary.records = self.tracker.history().len();
        summary
    }

    #[cfg(test)]
    pub fn tracker(&self) -> &ProximityTracker {
        &self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::ScenarioFeed;
    use crate::generator::profile::{build_scenario, GeneratorConfig};
    use async_trait::async_trait;
    use chrono::Utc;
    use overheadcore::{NoopResolver, Observation, TrackerConfig};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::{tempdir, TempDir};

    #[derive(Clone, Default)]
    struct RecordingSink {
        events: Arc<Mutex<Vec<(EventKind, String)>>>,
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn health(&self) -> anyhow::Result<()> {
            Ok(())
        }

        async fn notify(&self, event: &TrackerEvent) -> anyhow::Result<()> {
            self.events
                .lock()
                .unwrap()
                .push((event.kind, event.callsign.clone()));
            Ok(())
        }
    }

    struct FailingFeed;

    #[async_trait]
    impl ObservationFeed for FailingFeed {
        async fn fetch(&mut self) -> anyhow::Result<Vec<Observation>> {
            anyhow::bail!("upstream unavailable")
        }
    }

    fn tracker(dir: &TempDir) -> ProximityTracker {
        let mut config = TrackerConfig::new(38.57, -121.49, 3.0);
        config.history_path = dir.path().join("history.json");
        config.export_path = dir.path().join("export.json");
        ProximityTracker::new(config, Box::new(NoopResolver)).unwrap()
    }

    #[tokio::test]
    async fn runner_executes_generated_scenario() {
        let dir = tempdir().unwrap();
        let batches = build_scenario(&GeneratorConfig::default()).unwrap();
        let sink = RecordingSink::default();
        let mut runner = Runner::new(
            tracker(&dir),
            Box::new(ScenarioFeed::new(batches)),
            Box::new(sink.clone()),
        );

        let summary = runner.run_to_completion().await;
        assert_eq!(summary.entered, 3);
        assert_eq!(summary.exited, 3);
        assert_eq!(summary.records, runner.tracker().history().len());
        assert!(dir.path().join("export.json").exists());

        let events = sink.events.lock().unwrap();
        assert_eq!(events.first().map(|e| e.0), Some(EventKind::Entered));
        assert_eq!(events.last().map(|e| e.0), Some(EventKind::Exited));
    }

    #[tokio::test]
    async fn feed_failure_counts_as_empty_tick() {
        let dir = tempdir().unwrap();
        let mut tracker = tracker(&dir);
        tracker.observe(&[Observation::new("UAL1", 38.58, -121.49, Utc::now()).with_distance(0.6)]);

        let sink = RecordingSink::default();
        let mut runner = Runner::new(tracker, Box::new(FailingFeed), Box::new(sink.clone()));
        let events = runner.tick().await;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Exited);
        assert_eq!(runner.tracker().metrics().snapshot().errors, 1);
    }

    #[tokio::test]
    async fn run_until_stops_on_shutdown() {
        let dir = tempdir().unwrap();
        let mut runner = Runner::new(
            tracker(&dir),
            Box::new(ScenarioFeed::new(Vec::new())),
            Box::new(RecordingSink::default()),
        );

        runner
            .run_until(Duration::from_secs(3600), std::future::ready(()))
            .await;
        assert_eq!(runner.tracker().metrics().snapshot().ticks, 1);
    }

    #[tokio::test]
    async fn shutdown_listener_is_armed_before_first_tick() {
        let armed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&armed);
        let (fire, fired) = oneshot::channel::<()>();

        let stop = arm_shutdown(async move {
            flag.store(true, Ordering::SeqCst);
            let _ = fired.await;
            Ok(())
        })
        .await;
        assert!(armed.load(Ordering::SeqCst));

        fire.send(()).unwrap();
        let dir = tempdir().unwrap();
        let mut runner = Runner::new(
            tracker(&dir),
            Box::new(ScenarioFeed::new(Vec::new())),
            Box::new(RecordingSink::default()),
        );
        runner
            .run_until(Duration::from_secs(3600), async {
                let _ = stop.await;
            })
            .await;
        assert_eq!(runner.tracker().metrics().snapshot().ticks, 1);
    }
}
