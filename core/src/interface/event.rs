use crate::interface::observation::Route;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of state change reported to the notification sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Entered,
    StillPresent,
    Exited,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EventKind::Entered => "entered",
            EventKind::StillPresent => "stillPresent",
            EventKind::Exited => "exited",
        };
        f.write_str(label)
    }
}

/// Notification emitted by the tracker for one flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerEvent {
    pub kind: EventKind,
    pub callsign: String,
    pub flight_number: Option<String>,
    pub distance_nm: Option<f64>,
    pub altitude_ft: Option<f64>,
    pub speed_kt: Option<f64>,
    pub track_deg: Option<f64>,
    pub route: Option<Route>,
    pub aircraft_type: String,
    pub timestamp: DateTime<Utc>,
}

impl TrackerEvent {
    pub fn route_label(&self) -> String {
        self.route
            .as_ref()
            .map(|route| route.to_string())
            .unwrap_or_else(|| "UNKNOWN".to_string())
    }
}
