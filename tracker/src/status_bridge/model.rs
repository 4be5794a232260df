use overheadcore::telemetry::Metrics;
use overheadcore::{ExportPayload, TrackerEvent};
use serde::{Deserialize, Serialize};

const RECENT_EVENTS: usize = 20;

/// State served by the status bridge.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatusModel {
    pub active: Option<String>,
    pub ticks: usize,
    pub encounters: usize,
    pub errors: usize,
    pub recent_events: Vec<TrackerEvent>,
    pub export: Option<ExportPayload>,
}

impl StatusModel {
    pub fn apply_metrics(&mut self, metrics: Metrics) {
        self.ticks = metrics.ticks;
        self.encounters = metrics.encounters;
        self.errors = metrics.errors;
    }

    /// Appends events, keeping only the most recent ones.
    pub fn push_events(&mut self, events: &[TrackerEvent]) {
        self.recent_events.extend_from_slice(events);
        let excess = self.recent_events.len().saturating_sub(RECENT_EVENTS);
        self.recent_events.drain(..excess);
    }
}
