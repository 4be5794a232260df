pub mod event;
pub mod observation;

pub use event::{EventKind, TrackerEvent};
pub use observation::{Observation, Route, UNKNOWN_DISTANCE_NM};
