use crate::status_bridge::model::StatusModel;
use anyhow::Context;
use log::info;
use overheadcore::{ProximityTracker, TrackerEvent};
use std::net::SocketAddr;
use std::sync::{Arc, PoisonError, RwLock};
use warp::Filter;

pub fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

/// Bridge that serves the latest tracker state over HTTP.
#[derive(Clone, Default)]
pub struct StatusBridge {
    state: Arc<RwLock<StatusModel>>,
}

impl StatusBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the HTTP server on the current runtime and returns the bound
    /// address.
    pub fn serve(&self, addr: SocketAddr) -> anyhow::Result<SocketAddr> {
        let state = self.state.clone();
        let state_filter = warp::any().map(move || state.clone());

        let status_route = warp::path("status")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: Arc<RwLock<StatusModel>>| {
                let guard = state.read().unwrap_or_else(PoisonError::into_inner);
                warp::reply::json(&*guard)
            });

        let export_route = warp::path("export")
            .and(warp::get())
            .and(state_filter)
            .map(|state: Arc<RwLock<StatusModel>>| {
                let guard = state.read().unwrap_or_else(PoisonError::into_inner);
                warp::reply::json(&guard.export)
            });

        let (bound, server) = warp::serve(status_route.or(export_route))
            .try_bind_ephemeral(addr)
            .with_context(|| format!("binding status bridge to {}", addr))?;
        tokio::spawn(server);
        info!("status bridge listening on http://{}", bound);
        Ok(bound)
    }

    /// Refreshes the served state from the tracker after a tick.
    pub fn publish(&self, tracker: &ProximityTracker, events: &[TrackerEvent]) {
        let export = tracker.current_export();
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        guard.active = tracker.active().map(str::to_string);
        guard.apply_metrics(tracker.metrics().snapshot());
        guard.push_events(events);
        guard.export = Some(export);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> StatusModel {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
