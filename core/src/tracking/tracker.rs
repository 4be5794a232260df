use crate::interface::{EventKind, Observation, TrackerEvent};
use crate::math::stats::StatsHelper;
use crate::prelude::{AircraftResolver, TrackerConfig, TrackerResult};
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::MetricsRecorder;
use crate::tracking::export::{ExportPayload, ExportPublisher, ExportStatus};
use crate::tracking::history::HistoryStore;
use crate::tracking::trajectory::{TrajectoryBuffer, TrajectorySnapshot};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// Follows the single closest flight through the detection radius.
///
/// The tracker is either idle or holds one active identity. Every tick the
/// closest observation of the batch decides between entry, continuation and
/// exit; history, trajectory and export are updated accordingly and the
/// resulting events are returned in the order they happened.
pub struct ProximityTracker {
    config: TrackerConfig,
    history: HistoryStore,
    trajectory: TrajectoryBuffer,
    publisher: ExportPublisher,
    active: Option<String>,
    resolver: Box<dyn AircraftResolver + Send>,
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
}

impl ProximityTracker {
    /// Builds a tracker and loads the persisted history.
    pub fn new(
        config: TrackerConfig,
        resolver: Box<dyn AircraftResolver + Send>,
    ) -> TrackerResult<Self> {
        config.validate()?;
        let history = HistoryStore::load(&config.history_path, config.radius_nm);
        let publisher = ExportPublisher::new(
            &config.export_path,
            Duration::from_secs(config.export_interval_secs),
            config.radius_nm,
        );
        let mut tracker = Self {
            trajectory: TrajectoryBuffer::with_capacity(config.trajectory_capacity),
            history,
            publisher,
            active: None,
            resolver,
            metrics: Arc::new(MetricsRecorder::new()),
            logger: LogManager::new("tracker"),
            config,
        };
        // Consumers get the waiting or history-based document before the
        // first encounter.
        tracker.export(true, ExportStatus::Completed);
        Ok(tracker)
    }

    /// Processes one poll tick.
    pub fn observe(&mut self, batch: &[Observation]) -> Vec<TrackerEvent> {
        self.metrics.record_tick();
        // Observations without a distance cannot be ranked against the zone.
        let candidates: Vec<&Observation> =
            batch.iter().filter(|obs| obs.distance_nm.is_some()).collect();
        let closest = StatsHelper::argmin_by(candidates.iter(), |obs| obs.ranking_distance())
            .map(|idx| candidates[idx]);

        let mut events = Vec::new();
        match (closest, self.active.take()) {
            (None, None) => {}
            (None, Some(active)) => events.push(self.complete_encounter(active)),
            (Some(obs), Some(active)) if obs.callsign == active => {
                self.active = Some(active);
                events.push(self.follow(obs, EventKind::StillPresent));
            }
            (Some(obs), Some(active)) => {
                events.push(self.complete_encounter(active));
                events.push(self.begin_encounter(obs));
            }
            (Some(obs), None) => events.push(self.begin_encounter(obs)),
        }
        events
    }

    fn begin_encounter(&mut self, obs: &Observation) -> TrackerEvent {
        self.logger.record(&format!(
            "{} entered at {:.2}nm",
            obs.callsign,
            obs.ranking_distance()
        ));
        self.active = Some(obs.callsign.clone());
        self.follow(obs, EventKind::Entered)
    }

    fn follow(&mut self, obs: &Observation, kind: EventKind) -> TrackerEvent {
        if self.history.record(obs).is_err() {
            self.metrics.record_error();
        }

        let snapshot = self.enrich(obs);
        let event = event_from_snapshot(kind, &snapshot);
        self.trajectory.append(snapshot);

        // A new encounter is exported immediately; continuations are throttled.
        let force = kind == EventKind::Entered;
        self.export(force, ExportStatus::Tracking);
        if force {
            // The snapshot carried over from the previous encounter only
            // bridges the hand-off export.
            self.trajectory.retain_flight(&obs.callsign);
        }

        if kind == EventKind::StillPresent {
            self.logger.detail(&format!(
                "{} still present at {:.2}nm",
                obs.callsign,
                obs.ranking_distance()
            ));
        }
        event
    }

    fn complete_encounter(&mut self, callsign: String) -> TrackerEvent {
        let event = match self.trajectory.latest() {
            Some(snapshot) if snapshot.observation.callsign == callsign => {
                event_from_snapshot(EventKind::Exited, snapshot)
            }
            _ => TrackerEvent {
                kind: EventKind::Exited,
                callsign: callsign.clone(),
                flight_number: None,
                distance_nm: None,
                altitude_ft: None,
                speed_kt: None,
                track_deg: None,
                route: None,
                aircraft_type: "?".to_string(),
                timestamp: Utc::now(),
            },
        };

        self.export(true, ExportStatus::Completed);
        self.trajectory.clear(true);
        self.metrics.record_encounter();
        self.logger.record(&format!("{} left the zone", callsign));
        event
    }

    fn export(&mut self, force: bool, status: ExportStatus) {
        if let Err(err) = self
            .publisher
            .maybe_export(force, status, &self.trajectory, &self.history)
        {
            self.metrics.record_error();
            self.logger.warn(&format!(
                "export to {} failed: {}",
                self.publisher.path().display(),
                err
            ));
        }
    }

    fn enrich(&self, obs: &Observation) -> TrajectorySnapshot {
        let mut snapshot = TrajectorySnapshot::new(obs.clone());
        match obs.aircraft_type.as_deref() {
            Some(code) => {
                snapshot.aircraft_name = self.resolver.resolve(code);
                snapshot.manufacturer = self.resolver.manufacturer(code);
            }
            None => snapshot.aircraft_name = self.resolver.guess(obs),
        }
        if obs.flight_number.is_none() {
            snapshot.observation.flight_number = self.resolver.flight_number(&obs.callsign);
        }
        snapshot
    }

    /// Export document reflecting the current state, without writing it.
    pub fn current_export(&self) -> ExportPayload {
        let status = if self.active.is_some() {
            ExportStatus::Tracking
        } else {
            ExportStatus::Completed
        };
        ExportPayload::derive(
            &self.trajectory,
            &self.history,
            self.config.radius_nm,
            status,
            Utc::now(),
        )
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn trajectory(&self) -> &TrajectoryBuffer {
        &self.trajectory
    }

    pub fn metrics(&self) -> Arc<MetricsRecorder> {
        Arc::clone(&self.metrics)
    }
}

fn event_from_snapshot(kind: EventKind, snapshot: &TrajectorySnapshot) -> TrackerEvent {
    let obs = &snapshot.observation;
    TrackerEvent {
        kind,
        callsign: obs.callsign.clone(),
        flight_number: obs.flight_number.clone(),
        distance_nm: obs.distance_nm,
        altitude_ft: obs.altitude_ft,
        speed_kt: obs.speed_kt,
        track_deg: obs.track_deg,
        route: obs.route(),
        aircraft_type: snapshot.display_type(),
        timestamp: obs.timestamp,
    }
}
