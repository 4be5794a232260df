//! OpenSky Network `states/all` client.
//!
//! A state vector is a positional JSON array:
//! `[icao24, callsign, origin_country, time_position, last_contact, longitude,
//!   latitude, baro_altitude, on_ground, velocity, true_track, vertical_rate,
//!   sensors, geo_altitude, squawk, spi, position_source]`.

use crate::feed::ObservationFeed;
use crate::workflow::config::FeedSettings;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use log::debug;
use overheadcore::math::GeodesyHelper;
use overheadcore::{Observation, TrackerConfig};
use serde_json::Value;
use std::time::Duration;

const FEET_PER_METER: f64 = 3.28084;
const KNOTS_PER_MPS: f64 = 1.94384;
const STATE_FIELDS: usize = 17;

pub struct OpenSkyFeed {
    client: reqwest::Client,
    base_url: String,
    latitude: f64,
    longitude: f64,
    radius_nm: f64,
}

impl OpenSkyFeed {
    pub fn new(settings: &FeedSettings, tracker: &TrackerConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .context("building OpenSky HTTP client")?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            latitude: tracker.latitude,
            longitude: tracker.longitude,
            radius_nm: tracker.radius_nm,
        })
    }

    fn bounds(&self) -> [(&'static str, String); 4] {
        let (lat_deg, lon_deg) = GeodesyHelper::bounding_extent(self.latitude, self.radius_nm);
        [
            ("lamin", format!("{:.6}", self.latitude - lat_deg)),
            ("lamax", format!("{:.6}", self.latitude + lat_deg)),
            ("lomin", format!("{:.6}", self.longitude - lon_deg)),
            ("lomax", format!("{:.6}", self.longitude + lon_deg)),
        ]
    }
}

#[async_trait]
impl ObservationFeed for OpenSkyFeed {
    async fn fetch(&mut self) -> anyhow::Result<Vec<Observation>> {
        let url = format!("{}/states/all", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&self.bounds())
            .send()
            .await
            .with_context(|| format!("requesting {}", url))?
            .error_for_status()
            .with_context(|| format!("OpenSky returned an error for {}", url))?;
        let body: Value = response
            .json()
            .await
            .context("decoding OpenSky response")?;

        let observations = parse_states(
            &body,
            self.latitude,
            self.longitude,
            self.radius_nm,
            Utc::now(),
        );
        debug!("OpenSky returned {} aircraft in range", observations.len());
        Ok(observations)
    }
}

/// Converts a `states/all` response into observations within `radius_nm`
/// of the given point. Grounded or position-less aircraft are dropped.
pub fn parse_states(
    body: &Value,
    latitude: f64,
    longitude: f64,
    radius_nm: f64,
    now: DateTime<Utc>,
) -> Vec<Observation> {
    let Some(states) = body.get("states").and_then(Value::as_array) else {
        return Vec::new();
    };

    states
        .iter()
        .filter_map(|state| parse_state(state.as_array()?, now))
        .filter_map(|mut obs| {
            let distance = GeodesyHelper::haversine_nm(latitude, longitude, obs.lat, obs.lon);
            if distance > radius_nm {
                return None;
            }
            obs.distance_nm = Some(distance);
            Some(obs)
        })
        .collect()
}

fn parse_state(state: &[Value], now: DateTime<Utc>) -> Option<Observation> {
    if state.len() < STATE_FIELDS {
        return None;
    }
    if state[8].as_bool() == Some(true) {
        return None;
    }
    let lon = state[5].as_f64()?;
    let lat = state[6].as_f64()?;

    let icao = state[0].as_str().unwrap_or_default().trim();
    let callsign = state[1]
        .as_str()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(icao);
    if callsign.is_empty() {
        return None;
    }

    let timestamp = state[3]
        .as_i64()
        .or_else(|| state[4].as_i64())
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .unwrap_or(now);

    let mut obs = Observation::new(callsign, lat, lon, timestamp);
    obs.altitude_ft = state[7].as_f64().map(|m| (m * FEET_PER_METER).round());
    obs.speed_kt = state[9].as_f64().map(|mps| (mps * KNOTS_PER_MPS).round());
    obs.track_deg = state[10].as_f64();
    Some(obs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state(callsign: &str, lat: f64, lon: f64, on_ground: bool) -> Value {
        json!([
            "a1b2c3", callsign, "United States", 1_700_000_000, 1_700_000_001, lon, lat,
            3048.0, on_ground, 128.6, 271.5, -2.5, null, 3100.0, "1200", false, 0
        ])
    }

    #[test]
    fn states_are_converted_and_filtered_by_radius() {
        let body = json!({
            "time": 1_700_000_002,
            "states": [
                state("UAL498  ", 38.58, -121.49, false),
                state("SWA2053", 38.57, -121.49, true),
                state("DAL17", 39.50, -121.49, false),
                ["short"],
            ]
        });

        let observations = parse_states(&body, 38.57, -121.49, 3.0, Utc::now());
        assert_eq!(observations.len(), 1);

        let obs = &observations[0];
        assert_eq!(obs.callsign, "UAL498");
        assert_eq!(obs.altitude_ft, Some(10000.0));
        assert_eq!(obs.speed_kt, Some(250.0));
        assert_eq!(obs.track_deg, Some(271.5));
        assert_eq!(obs.timestamp.timestamp(), 1_700_000_000);
        assert!((obs.distance_nm.unwrap() - 0.6).abs() < 0.01);
    }

    #[test]
    fn blank_callsign_falls_back_to_icao() {
        let body = json!({ "states": [state("   ", 38.57, -121.49, false)] });
        let observations = parse_states(&body, 38.57, -121.49, 3.0, Utc::now());
        assert_eq!(observations[0].callsign, "a1b2c3");
    }

    #[test]
    fn missing_states_yield_empty_batch() {
        let body = json!({ "time": 1, "states": null });
        assert!(parse_states(&body, 0.0, 0.0, 3.0, Utc::now()).is_empty());
    }
}
