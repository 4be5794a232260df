pub mod export;
pub mod history;
pub mod tracker;
pub mod trajectory;

pub use export::{ExportPayload, ExportPublisher, ExportStatus, Precision};
pub use history::{EncounterRecord, HistoryStore, UpsertOutcome};
pub use tracker::ProximityTracker;
pub use trajectory::{TrajectoryBuffer, TrajectorySnapshot};
