use crate::interface::Observation;
use crate::math::stats::StatsHelper;
use crate::prelude::{TrackerError, TrackerResult};
use crate::telemetry::log::LogManager;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Aggregated history of one flight identity inside the detection radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterRecord {
    pub callsign: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// Seconds between first and last sighting.
    #[serde(rename = "duration")]
    pub duration_secs: i64,
    pub closest_distance: f64,
    pub closest_altitude: Option<f64>,
    pub closest_speed: Option<f64>,
    pub initial_distance: f64,
    pub initial_altitude: Option<f64>,
    pub initial_speed: Option<f64>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub flight_number: Option<String>,
    #[serde(default)]
    pub aircraft_type: Option<String>,
    #[serde(default)]
    pub sightings: u64,
}

impl EncounterRecord {
    fn from_observation(obs: &Observation, distance: f64) -> Self {
        Self {
            callsign: obs.callsign.clone(),
            first_seen: obs.timestamp,
            last_seen: obs.timestamp,
            duration_secs: 0,
            closest_distance: distance,
            closest_altitude: obs.altitude_ft,
            closest_speed: obs.speed_kt,
            initial_distance: distance,
            initial_altitude: obs.altitude_ft,
            initial_speed: obs.speed_kt,
            origin: obs.origin.clone(),
            destination: obs.destination.clone(),
            flight_number: obs.flight_number.clone(),
            aircraft_type: obs.aircraft_type.clone(),
            sightings: 1,
        }
    }

    /// Folds a later observation into the record. Returns true when the
    /// closest approach improved.
    fn absorb(&mut self, obs: &Observation) -> bool {
        if obs.timestamp > self.last_seen {
            self.last_seen = obs.timestamp;
        }
        self.duration_secs = (self.last_seen - self.first_seen).num_seconds();
        self.sightings += 1;

        fill_once(&mut self.origin, &obs.origin);
        fill_once(&mut self.destination, &obs.destination);
        fill_once(&mut self.flight_number, &obs.flight_number);
        fill_once(&mut self.aircraft_type, &obs.aircraft_type);

        match obs.distance_nm.filter(|d| d.is_finite()) {
            Some(distance) if distance < self.closest_distance => {
                self.closest_distance = distance;
                self.closest_altitude = obs.altitude_ft;
                self.closest_speed = obs.speed_kt;
                true
            }
            _ => false,
        }
    }
}

fn fill_once(slot: &mut Option<String>, candidate: &Option<String>) {
    if slot.is_none() {
        if let Some(value) = candidate.as_ref().filter(|v| !v.is_empty()) {
            *slot = Some(value.clone());
        }
    }
}

/// Result of folding one observation into the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// Unknown identity observed outside the radius; nothing stored.
    Ignored,
    Created,
    Updated { closer: bool },
}

/// Durable map from flight identity to its encounter record.
pub struct HistoryStore {
    path: PathBuf,
    radius_nm: f64,
    records: BTreeMap<String, EncounterRecord>,
    logger: LogManager,
}

impl HistoryStore {
    /// Empty store backed by `path`; nothing is read from disk.
    pub fn new(path: impl Into<PathBuf>, radius_nm: f64) -> Self {
        Self {
            path: path.into(),
            radius_nm,
            records: BTreeMap::new(),
            logger: LogManager::new("history"),
        }
    }

    /// Opens the store and reads any persisted records. A missing or
    /// unreadable file yields an empty history.
    pub fn load(path: impl Into<PathBuf>, radius_nm: f64) -> Self {
        let mut store = Self::new(path, radius_nm);
        match read_records(&store.path) {
            Ok(Some(records)) => {
                store.records = records
                    .into_iter()
                    .map(|record| (record.callsign.clone(), record))
                    .collect();
                store.logger.record(&format!(
                    "loaded {} records from {}",
                    store.records.len(),
                    store.path.display()
                ));
            }
            Ok(None) => store.logger.record(&format!(
                "no history at {}, starting empty",
                store.path.display()
            )),
            Err(err) => store.logger.warn(&format!(
                "ignoring unreadable history {}: {}",
                store.path.display(),
                err
            )),
        }
        store
    }

    /// Folds `obs` into the record for its callsign, in memory only.
    pub fn upsert(&mut self, obs: &Observation) -> UpsertOutcome {
        if let Some(record) = self.records.get_mut(&obs.callsign) {
            let closer = record.absorb(obs);
            return UpsertOutcome::Updated { closer };
        }

        match obs.distance_nm.filter(|d| d.is_finite()) {
            Some(distance) if distance <= self.radius_nm => {
                self.records.insert(
                    obs.callsign.clone(),
                    EncounterRecord::from_observation(obs, distance),
                );
                self.logger.detail(&format!(
                    "new record {} at {:.2}nm",
                    obs.callsign, distance
                ));
                UpsertOutcome::Created
            }
            _ => UpsertOutcome::Ignored,
        }
    }

    /// Upserts and, if anything changed, persists. Persist failures are
    /// logged and returned; the in-memory record stays authoritative.
    pub fn record(&mut self, obs: &Observation) -> TrackerResult<UpsertOutcome> {
        let outcome = self.upsert(obs);
        if outcome != UpsertOutcome::Ignored {
            if let Err(err) = self.persist() {
                self.logger.warn(&format!(
                    "persist to {} failed: {}",
                    self.path.display(),
                    err
                ));
                return Err(err);
            }
        }
        Ok(outcome)
    }

    /// Writes the whole record set to a sibling temp file, then renames it
    /// over the target.
    pub fn persist(&self) -> TrackerResult<()> {
        let records: Vec<&EncounterRecord> = self.records.values().collect();
        let contents = serde_json::to_vec_pretty(&records)?;
        write_atomically(&self.path, &contents)
    }

    pub fn get(&self, callsign: &str) -> Option<&EncounterRecord> {
        self.records.get(callsign)
    }

    /// Record with the smallest closest distance ever observed.
    pub fn overall_closest(&self) -> Option<&EncounterRecord> {
        let idx = StatsHelper::argmin_by(self.records.values(), |r| r.closest_distance)?;
        self.records.values().nth(idx)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_records(path: &Path) -> TrackerResult<Option<Vec<EncounterRecord>>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)?;
    let records = serde_json::from_str(&contents)?;
    Ok(Some(records))
}

/// Replaces `path` with `contents` via a temp file in the same directory.
pub(crate) fn write_atomically(path: &Path, contents: &[u8]) -> TrackerResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file_name = path
        .file_name()
        .ok_or_else(|| TrackerError::Persistence(format!("{} has no file name", path.display())))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
    }
    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.into());
    }
    Ok(())
}
