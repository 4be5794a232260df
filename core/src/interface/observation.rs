use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Distance assumed for an observation whose distance is unknown. Such
/// observations always rank behind any measured one.
pub const UNKNOWN_DISTANCE_NM: f64 = 999.0;

/// One normalized aircraft position report produced by the upstream feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub callsign: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_number: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub distance_nm: Option<f64>,
    pub altitude_ft: Option<f64>,
    pub speed_kt: Option<f64>,
    pub track_deg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aircraft_type: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Observation {
    pub fn new(callsign: impl Into<String>, lat: f64, lon: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            callsign: callsign.into(),
            flight_number: None,
            lat,
            lon,
            distance_nm: None,
            altitude_ft: None,
            speed_kt: None,
            track_deg: None,
            origin: None,
            destination: None,
            aircraft_type: None,
            timestamp,
        }
    }

    pub fn with_distance(mut self, distance_nm: f64) -> Self {
        self.distance_nm = Some(distance_nm);
        self
    }

    pub fn with_altitude(mut self, altitude_ft: f64) -> Self {
        self.altitude_ft = Some(altitude_ft);
        self
    }

    pub fn with_speed(mut self, speed_kt: f64) -> Self {
        self.speed_kt = Some(speed_kt);
        self
    }

    pub fn with_route(mut self, origin: impl Into<String>, destination: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self.destination = Some(destination.into());
        self
    }

    pub fn with_flight_number(mut self, flight_number: impl Into<String>) -> Self {
        self.flight_number = Some(flight_number.into());
        self
    }

    pub fn with_aircraft_type(mut self, code: impl Into<String>) -> Self {
        self.aircraft_type = Some(code.into());
        self
    }

    /// Distance used for ranking, with unknown distances pushed far away.
    pub fn ranking_distance(&self) -> f64 {
        self.distance_nm
            .filter(|d| d.is_finite())
            .unwrap_or(UNKNOWN_DISTANCE_NM)
    }

    pub fn route(&self) -> Option<Route> {
        match (&self.origin, &self.destination) {
            (Some(origin), Some(destination)) => Some(Route {
                origin: origin.clone(),
                destination: destination.clone(),
            }),
            _ => None,
        }
    }
}

/// Origin/destination airport pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub origin: String,
    pub destination: String,
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}→{}", self.origin, self.destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_distance_ranks_far_away() {
        let obs = Observation::new("UA1", 0.0, 0.0, Utc::now());
        assert_eq!(obs.ranking_distance(), UNKNOWN_DISTANCE_NM);
        assert_eq!(obs.with_distance(1.25).ranking_distance(), 1.25);
    }

    #[test]
    fn route_requires_both_airports() {
        let mut obs = Observation::new("UA1", 0.0, 0.0, Utc::now());
        obs.origin = Some("SMF".into());
        assert!(obs.route().is_none());

        let obs = obs.with_route("SMF", "PDX");
        assert_eq!(obs.route().unwrap().to_string(), "SMF→PDX");
    }
}
