pub mod format;
pub mod webhook;

use async_trait::async_trait;
use log::info;
use overheadcore::{EventKind, TrackerEvent};

pub use webhook::WebhookSink;

/// Consumer of tracker events, typically a display device.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Fails when the sink cannot be reached at all.
    async fn health(&self) -> anyhow::Result<()>;

    async fn notify(&self, event: &TrackerEvent) -> anyhow::Result<()>;
}

/// Writes each event as a summary line to the log.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn health(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn notify(&self, event: &TrackerEvent) -> anyhow::Result<()> {
        match event.kind {
            EventKind::Entered => info!("New flight: {}", format::summary_line(event)),
            EventKind::StillPresent => info!("Overhead: {}", format::summary_line(event)),
            EventKind::Exited => info!("{} left the zone", event.callsign),
        }
        Ok(())
    }
}
