use crate::math::stats::StatsHelper;
use crate::prelude::TrackerResult;
use crate::telemetry::log::LogManager;
use crate::tracking::history::{write_atomically, HistoryStore};
use crate::tracking::trajectory::TrajectoryBuffer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Distance under which a flight counts as overhead.
pub const OVERHEAD_DISTANCE_NM: f64 = 1.0;

/// Snapshot count from which a live closest approach is `high` precision.
const HIGH_PRECISION_SNAPSHOTS: usize = 3;

/// How the exported closest approach was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    High,
    Tracked,
    Estimated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStatus {
    Waiting,
    Tracking,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosestApproach {
    pub distance: f64,
    pub altitude: Option<i64>,
    pub speed: Option<i64>,
    pub timestamp: DateTime<Utc>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub precision: Precision,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSummary {
    pub callsign: String,
    pub aircraft_type: String,
    pub origin: Option<String>,
    pub destination: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPayload {
    pub closest_approach: ClosestApproach,
    pub flight: FlightSummary,
    pub overhead_score: u8,
    pub is_overhead: bool,
    pub path_snapshots: usize,
    pub status: ExportStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitingPayload {
    pub status: ExportStatus,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Document written to the export target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExportPayload {
    Snapshot(SnapshotPayload),
    Waiting(WaitingPayload),
}

impl ExportPayload {
    /// Derives the export from live trajectory data, falling back to the
    /// best closest approach in the history.
    pub fn derive(
        trajectory: &TrajectoryBuffer,
        history: &HistoryStore,
        radius_nm: f64,
        status: ExportStatus,
        now: DateTime<Utc>,
    ) -> Self {
        if let Some(snapshot) = trajectory.closest() {
            let obs = &snapshot.observation;
            let precision = if trajectory.len() >= HIGH_PRECISION_SNAPSHOTS {
                Precision::High
            } else {
                Precision::Tracked
            };
            let approach = ClosestApproach {
                distance: StatsHelper::round_to(obs.ranking_distance(), 2),
                altitude: obs.altitude_ft.map(round_whole),
                speed: obs.speed_kt.map(round_whole),
                timestamp: obs.timestamp,
                lat: Some(obs.lat),
                lon: Some(obs.lon),
                precision,
            };
            let flight = FlightSummary {
                callsign: obs.callsign.clone(),
                aircraft_type: snapshot.display_type(),
                origin: obs.origin.clone(),
                destination: obs.destination.clone(),
            };
            return Self::snapshot(approach, flight, trajectory.len(), radius_nm, status, now);
        }

        match history.overall_closest() {
            Some(record) => {
                let approach = ClosestApproach {
                    distance: StatsHelper::round_to(record.closest_distance, 2),
                    altitude: record.closest_altitude.map(round_whole),
                    speed: record.closest_speed.map(round_whole),
                    timestamp: record.last_seen,
                    lat: None,
                    lon: None,
                    precision: Precision::Estimated,
                };
                let flight = FlightSummary {
                    callsign: record.callsign.clone(),
                    aircraft_type: record
                        .aircraft_type
                        .clone()
                        .or_else(|| record.flight_number.clone())
                        .unwrap_or_else(|| record.callsign.clone()),
                    origin: record.origin.clone(),
                    destination: record.destination.clone(),
                };
                Self::snapshot(approach, flight, 0, radius_nm, status, now)
            }
            None => ExportPayload::Waiting(WaitingPayload {
                status: ExportStatus::Waiting,
                message: "No flights recorded yet".to_string(),
                timestamp: now,
            }),
        }
    }

    fn snapshot(
        approach: ClosestApproach,
        flight: FlightSummary,
        path_snapshots: usize,
        radius_nm: f64,
        status: ExportStatus,
        now: DateTime<Utc>,
    ) -> Self {
        let distance = approach.distance;
        ExportPayload::Snapshot(SnapshotPayload {
            overhead_score: overhead_score(distance, radius_nm),
            is_overhead: distance < OVERHEAD_DISTANCE_NM,
            closest_approach: approach,
            flight,
            path_snapshots,
            status,
            timestamp: now,
        })
    }

    pub fn status(&self) -> ExportStatus {
        match self {
            ExportPayload::Snapshot(payload) => payload.status,
            ExportPayload::Waiting(payload) => payload.status,
        }
    }
}

fn round_whole(value: f64) -> i64 {
    value.round() as i64
}

/// 100 directly overhead, 0 at or beyond the detection radius.
fn overhead_score(distance_nm: f64, radius_nm: f64) -> u8 {
    if radius_nm <= 0.0 {
        return 0;
    }
    let score = ((1.0 - distance_nm / radius_nm) * 100.0).round();
    score.clamp(0.0, 100.0) as u8
}

/// Throttled writer of the export document.
pub struct ExportPublisher {
    path: PathBuf,
    interval: Duration,
    radius_nm: f64,
    last_write: Option<Instant>,
    logger: LogManager,
    #[cfg(test)]
    written: Vec<ExportStatus>,
}

impl ExportPublisher {
    pub fn new(path: impl Into<PathBuf>, interval: Duration, radius_nm: f64) -> Self {
        Self {
            path: path.into(),
            interval,
            radius_nm,
            last_write: None,
            logger: LogManager::new("export"),
            #[cfg(test)]
            written: Vec::new(),
        }
    }

    /// Writes a fresh export unless one was written within the throttle
    /// interval. `force` bypasses the throttle and restarts the window; it
    /// is used at encounter boundaries. Returns whether a write happened.
    pub fn maybe_export(
        &mut self,
        force: bool,
        status: ExportStatus,
        trajectory: &TrajectoryBuffer,
        history: &HistoryStore,
    ) -> TrackerResult<bool> {
        let now = Instant::now();
        if !force {
            if let Some(last) = self.last_write {
                if now.duration_since(last) < self.interval {
                    return Ok(false);
                }
            }
        }

        let payload = ExportPayload::derive(trajectory, history, self.radius_nm, status, Utc::now());
        let contents = serde_json::to_vec_pretty(&payload)?;
        write_atomically(&self.path, &contents)?;

        self.last_write = Some(now);
        #[cfg(test)]
        self.written.push(payload.status());
        self.logger.detail(&format!(
            "wrote {:?} export to {}",
            payload.status(),
            self.path.display()
        ));
        Ok(true)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Statuses of the documents written so far, oldest first.
    #[cfg(test)]
    pub(crate) fn written(&self) -> &[ExportStatus] {
        &self.written
    }
}
