use crate::sink::{format, NotificationSink};
use anyhow::Context;
use async_trait::async_trait;
use overheadcore::TrackerEvent;
use serde::Serialize;
use std::time::Duration;

/// Posts events as JSON to an HTTP endpoint, e.g. a display bridge.
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct WebhookBody<'a> {
    event: &'a TrackerEvent,
    text: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .context("building webhook HTTP client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn health(&self) -> anyhow::Result<()> {
        self.client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("reaching notification sink {}", self.url))?
            .error_for_status()
            .with_context(|| format!("notification sink {} is unhealthy", self.url))?;
        Ok(())
    }

    async fn notify(&self, event: &TrackerEvent) -> anyhow::Result<()> {
        let body = WebhookBody {
            event,
            text: format::summary_line(event),
        };
        self.client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("posting {} event to {}", event.kind, self.url))?
            .error_for_status()
            .with_context(|| format!("notification sink {} rejected event", self.url))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warp::Filter;

    #[tokio::test]
    async fn unreachable_sink_fails_health_check() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let sink = WebhookSink::new("http://127.0.0.1:9/api/notify").unwrap();
        assert!(sink.health().await.is_err());
    }

    #[tokio::test]
    async fn error_status_fails_health_check() {
        let route = warp::any().map(|| {
            warp::reply::with_status("down", warp::http::StatusCode::SERVICE_UNAVAILABLE)
        });
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let sink = WebhookSink::new(format!("http://{}/api/notify", addr)).unwrap();
        assert!(sink.health().await.is_err());
    }
}
