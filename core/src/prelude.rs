use crate::interface::Observation;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default capacity of the per-encounter trajectory buffer.
pub const TRAJECTORY_CAPACITY: usize = 100;

/// Default minimum interval between non-forced export writes.
pub const EXPORT_INTERVAL_SECS: u64 = 5;

/// Shared configuration for the tracking core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_nm: f64,
    pub history_path: PathBuf,
    pub export_path: PathBuf,
    #[serde(default = "default_export_interval")]
    pub export_interval_secs: u64,
    #[serde(default = "default_trajectory_capacity")]
    pub trajectory_capacity: usize,
}

fn default_export_interval() -> u64 {
    EXPORT_INTERVAL_SECS
}

fn default_trajectory_capacity() -> usize {
    TRAJECTORY_CAPACITY
}

impl TrackerConfig {
    pub fn new(latitude: f64, longitude: f64, radius_nm: f64) -> Self {
        Self {
            latitude,
            longitude,
            radius_nm,
            history_path: PathBuf::from("flight-history.json"),
            export_path: PathBuf::from("flight-export.json"),
            export_interval_secs: EXPORT_INTERVAL_SECS,
            trajectory_capacity: TRAJECTORY_CAPACITY,
        }
    }

    pub fn validate(&self) -> TrackerResult<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(TrackerError::InvalidConfig(format!(
                "latitude {} outside [-90, 90]",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(TrackerError::InvalidConfig(format!(
                "longitude {} outside [-180, 180]",
                self.longitude
            )));
        }
        if !self.radius_nm.is_finite() || self.radius_nm <= 0.0 {
            return Err(TrackerError::InvalidConfig(format!(
                "radius must be positive, got {}",
                self.radius_nm
            )));
        }
        if self.trajectory_capacity == 0 {
            return Err(TrackerError::InvalidConfig(
                "trajectory capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Common error type for the tracking core.
#[derive(thiserror::Error, Debug)]
pub enum TrackerError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization failure: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("persistence failure: {0}")]
    Persistence(String),
}

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Lookup capability for aircraft type codes. The core calls it to enrich
/// trajectory snapshots but never owns the underlying tables.
pub trait AircraftResolver {
    fn resolve(&self, code: &str) -> Option<String>;

    fn manufacturer(&self, _code: &str) -> Option<String> {
        None
    }

    /// Best-effort type description for an observation that carries no
    /// type code.
    fn guess(&self, _obs: &Observation) -> Option<String> {
        None
    }

    /// Display flight number derived from a callsign, e.g. `UAL498` to
    /// `UA498`.
    fn flight_number(&self, _callsign: &str) -> Option<String> {
        None
    }
}

/// Resolver that knows no aircraft types.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResolver;

impl AircraftResolver for NoopResolver {
    fn resolve(&self, _code: &str) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = TrackerConfig::new(37.62, -122.38, 2.0);
        assert!(config.validate().is_ok());
        assert_eq!(config.trajectory_capacity, 100);
        assert_eq!(config.export_interval_secs, 5);
    }

    #[test]
    fn config_rejects_bad_radius_and_coordinates() {
        let mut config = TrackerConfig::new(37.62, -122.38, 0.0);
        assert!(matches!(
            config.validate(),
            Err(TrackerError::InvalidConfig(_))
        ));

        config.radius_nm = 2.0;
        config.latitude = 91.0;
        assert!(config.validate().is_err());

        config.latitude = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_fills_defaults_when_deserializing() {
        let config: TrackerConfig = serde_json::from_str(
            r#"{"latitude":1.0,"longitude":2.0,"radius_nm":3.0,
                "history_path":"h.json","export_path":"e.json"}"#,
        )
        .unwrap();
        assert_eq!(config.export_interval_secs, EXPORT_INTERVAL_SECS);
        assert_eq!(config.trajectory_capacity, TRAJECTORY_CAPACITY);
    }
}
