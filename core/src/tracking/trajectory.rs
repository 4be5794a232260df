use crate::interface::Observation;
use crate::math::stats::StatsHelper;
use crate::prelude::TRAJECTORY_CAPACITY;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Observation captured while its flight was the active encounter, plus
/// the resolved aircraft description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectorySnapshot {
    #[serde(flatten)]
    pub observation: Observation,
    pub aircraft_name: Option<String>,
    pub manufacturer: Option<String>,
}

impl TrajectorySnapshot {
    pub fn new(observation: Observation) -> Self {
        Self {
            observation,
            aircraft_name: None,
            manufacturer: None,
        }
    }

    /// Name shown for the aircraft: resolved name, raw type code, flight
    /// number, then callsign.
    pub fn display_type(&self) -> String {
        let obs = &self.observation;
        self.aircraft_name
            .clone()
            .or_else(|| obs.aircraft_type.clone())
            .or_else(|| obs.flight_number.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| {
                if obs.callsign.is_empty() {
                    "?".to_string()
                } else {
                    obs.callsign.clone()
                }
            })
    }
}

/// Bounded FIFO of snapshots for the active encounter.
#[derive(Debug, Clone)]
pub struct TrajectoryBuffer {
    snapshots: VecDeque<TrajectorySnapshot>,
    max_capacity: usize,
}

impl TrajectoryBuffer {
    pub fn new() -> Self {
        Self::with_capacity(TRAJECTORY_CAPACITY)
    }

    pub fn with_capacity(max_capacity: usize) -> Self {
        let max_capacity = max_capacity.max(1);
        Self {
            snapshots: VecDeque::with_capacity(max_capacity),
            max_capacity,
        }
    }

    /// Appends a snapshot, evicting the oldest entries once full.
    pub fn append(&mut self, snapshot: TrajectorySnapshot) {
        while self.snapshots.len() >= self.max_capacity {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    /// Empties the buffer, optionally keeping only the most recent snapshot.
    pub fn clear(&mut self, retain_last: bool) {
        let last = if retain_last {
            self.snapshots.pop_back()
        } else {
            None
        };
        self.snapshots.clear();
        if let Some(snapshot) = last {
            self.snapshots.push_back(snapshot);
        }
    }

    /// Drops every snapshot that does not belong to `callsign`.
    pub fn retain_flight(&mut self, callsign: &str) {
        self.snapshots
            .retain(|snapshot| snapshot.observation.callsign == callsign);
    }

    /// Snapshot with the smallest distance; the earliest wins a tie.
    pub fn closest(&self) -> Option<&TrajectorySnapshot> {
        let idx = StatsHelper::argmin_by(self.snapshots.iter(), |s| {
            s.observation.ranking_distance()
        })?;
        self.snapshots.get(idx)
    }

    pub fn latest(&self) -> Option<&TrajectorySnapshot> {
        self.snapshots.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrajectorySnapshot> {
        self.snapshots.iter()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl Default for TrajectoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn snapshot(callsign: &str, distance: f64, seq: i64) -> TrajectorySnapshot {
        let ts = Utc.timestamp_opt(1_700_000_000 + seq, 0).unwrap();
        TrajectorySnapshot::new(Observation::new(callsign, 0.0, 0.0, ts).with_distance(distance))
    }

    #[test]
    fn buffer_keeps_most_recent_hundred() {
        let mut buffer = TrajectoryBuffer::new();
        for seq in 0..150 {
            buffer.append(snapshot("UA1", 1.0, seq));
        }
        assert_eq!(buffer.len(), 100);
        let first = buffer.iter().next().unwrap();
        assert_eq!(first.observation.timestamp.timestamp(), 1_700_000_050);
        assert_eq!(
            buffer.latest().unwrap().observation.timestamp.timestamp(),
            1_700_000_149
        );
    }

    #[test]
    fn closest_prefers_first_of_equal_distances() {
        let mut buffer = TrajectoryBuffer::with_capacity(3);
        assert!(buffer.closest().is_none());

        buffer.append(snapshot("UA1", 1.5, 0));
        buffer.append(snapshot("UA1", 0.7, 1));
        buffer.append(snapshot("UA1", 0.7, 2));
        assert_eq!(
            buffer.closest().unwrap().observation.timestamp.timestamp(),
            1_700_000_001
        );

        buffer.append(snapshot("UA1", 0.7, 3));
        buffer.append(snapshot("UA1", 0.2, 4));
        assert_eq!(buffer.closest().unwrap().observation.distance_nm, Some(0.2));
    }

    #[test]
    fn clear_can_retain_latest_snapshot() {
        let mut buffer = TrajectoryBuffer::new();
        buffer.append(snapshot("DL2", 1.5, 0));
        buffer.append(snapshot("DL2", 1.1, 1));

        buffer.clear(true);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.latest().unwrap().observation.distance_nm, Some(1.1));

        buffer.clear(false);
        assert!(buffer.is_empty());
    }

    #[test]
    fn retain_flight_drops_other_callsigns() {
        let mut buffer = TrajectoryBuffer::new();
        buffer.append(snapshot("DL2", 0.2, 0));
        buffer.append(snapshot("AA3", 1.4, 1));
        buffer.append(snapshot("AA3", 1.2, 2));

        buffer.retain_flight("AA3");
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.closest().unwrap().observation.callsign, "AA3");
    }

    #[test]
    fn display_type_falls_back_through_identifiers() {
        let mut snap = snapshot("SWA2053", 1.0, 0);
        assert_eq!(snap.display_type(), "SWA2053");

        snap.observation.flight_number = Some("WN2053".into());
        assert_eq!(snap.display_type(), "WN2053");

        snap.observation.aircraft_type = Some("B738".into());
        assert_eq!(snap.display_type(), "B738");

        snap.aircraft_name = Some("B737-800".into());
        assert_eq!(snap.display_type(), "B737-800");
    }
}
