use anyhow::Context;
use overheadcore::TrackerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

const DEFAULT_POLL_INTERVAL_SECS: u64 = 20;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            base_url: "https://opensky-network.org/api".to_string(),
            user_agent: "overhead-tracker/0.1".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub tracker: TrackerConfig,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default)]
    pub feed: FeedSettings,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub bridge_addr: Option<SocketAddr>,
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

/// Values collected from the command line and environment.
#[derive(Clone, Debug)]
pub struct ArgSettings {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_nm: f64,
    pub poll_interval_secs: u64,
    pub history_path: PathBuf,
    pub export_path: PathBuf,
    pub webhook_url: Option<String>,
}

impl Settings {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading tracker settings {}", path_ref.display()))?;
        let mut settings: Settings = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing tracker settings {}", path_ref.display()))?;
        settings.poll_interval_secs = settings.poll_interval_secs.max(1);
        settings
            .tracker
            .validate()
            .with_context(|| format!("validating tracker settings {}", path_ref.display()))?;
        Ok(settings)
    }

    pub fn from_args(args: ArgSettings) -> anyhow::Result<Self> {
        let mut tracker = TrackerConfig::new(args.latitude, args.longitude, args.radius_nm);
        tracker.history_path = args.history_path;
        tracker.export_path = args.export_path;
        tracker.validate().context("validating command-line settings")?;

        Ok(Self {
            tracker,
            poll_interval_secs: args.poll_interval_secs.max(1),
            feed: FeedSettings::default(),
            webhook_url: args.webhook_url,
            bridge_addr: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args() -> ArgSettings {
        ArgSettings {
            latitude: 38.57,
            longitude: -121.49,
            radius_nm: 3.0,
            poll_interval_secs: 0,
            history_path: PathBuf::from("history.json"),
            export_path: PathBuf::from("export.json"),
            webhook_url: None,
        }
    }

    #[test]
    fn settings_from_args_produce_tracker_config() {
        let settings = Settings::from_args(args()).unwrap();
        assert_eq!(settings.tracker.radius_nm, 3.0);
        assert_eq!(settings.poll_interval_secs, 1);
        assert_eq!(settings.feed, FeedSettings::default());
    }

    #[test]
    fn settings_from_args_reject_bad_coordinates() {
        let mut bad = args();
        bad.latitude = 123.0;
        assert!(Settings::from_args(bad).is_err());
    }

    #[test]
    fn settings_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"tracker:\n  latitude: 38.57\n  longitude: -121.49\n  radius_nm: 2.5\n  history_path: h.json\n  export_path: e.json\npoll_interval_secs: 15\nwebhook_url: http://clock.local/api/notify\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.poll_interval_secs, 15);
        assert_eq!(settings.tracker.export_interval_secs, 5);
        assert_eq!(settings.feed.timeout_secs, 10);
        assert!(settings.webhook_url.is_some());
    }

    #[test]
    fn settings_load_clamps_zero_poll_interval() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"tracker:\n  latitude: 38.57\n  longitude: -121.49\n  radius_nm: 2.5\n  history_path: h.json\n  export_path: e.json\npoll_interval_secs: 0\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        assert_eq!(Settings::load(&path).unwrap().poll_interval_secs, 1);
    }
}
