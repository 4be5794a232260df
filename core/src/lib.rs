//! Proximity-tracking core for the overhead flight tracker.
//!
//! Each poll tick hands the tracker a batch of aircraft observations. The
//! tracker follows the single closest flight through the detection radius,
//! folds closest-approach statistics into a persisted history, keeps a
//! bounded trajectory for the active encounter and publishes a throttled
//! export snapshot for external consumers.

pub mod interface;
pub mod math;
pub mod prelude;
pub mod telemetry;
pub mod tracking;

pub use interface::{EventKind, Observation, Route, TrackerEvent};
pub use prelude::{AircraftResolver, NoopResolver, TrackerConfig, TrackerError, TrackerResult};
pub use tracking::{
    EncounterRecord, ExportPayload, ExportPublisher, HistoryStore, ProximityTracker,
    TrajectoryBuffer, TrajectorySnapshot,
};
