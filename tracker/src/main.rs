use anyhow::Context;
use catalog::StaticCatalog;
use clap::Parser;
use feed::{ObservationFeed, OpenSkyFeed, ScenarioFeed};
use generator::profile::{build_scenario, GeneratorConfig};
use log::info;
use overheadcore::ProximityTracker;
use sink::{LogSink, NotificationSink, WebhookSink};
use status_bridge::{default_bind_address, StatusBridge};
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Builder as TokioBuilder;
use workflow::config::{ArgSettings, Settings};
use workflow::runner::{arm_shutdown, Runner};

mod catalog;
mod feed;
mod generator;
mod sink;
mod status_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Tracks the closest aircraft over a fixed point")]
struct Args {
    /// Load tracker settings from YAML instead of flags
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, env = "TRACKER_LAT", default_value_t = 0.0, allow_negative_numbers = true)]
    lat: f64,
    #[arg(long, env = "TRACKER_LON", default_value_t = 0.0, allow_negative_numbers = true)]
    lon: f64,
    /// Detection radius in nautical miles
    #[arg(long, env = "TRACKER_RADIUS_NM", default_value_t = 3.0)]
    radius_nm: f64,
    /// Seconds between the end of one tick and the start of the next
    #[arg(long, env = "POLL_INTERVAL", default_value_t = 20)]
    poll_interval: u64,
    #[arg(long, default_value = "flight-history.json")]
    history: PathBuf,
    #[arg(long, default_value = "flight-export.json")]
    export: PathBuf,
    /// Post events to this URL instead of only logging them
    #[arg(long, env = "TRACKER_WEBHOOK")]
    webhook: Option<String>,
    /// Replay a synthetic scenario instead of polling OpenSky, then exit
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Seed for the offline scenario
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Serve tracker status over HTTP
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let settings = if let Some(path) = args.config.as_ref() {
        Settings::load(path)?
    } else {
        Settings::from_args(ArgSettings {
            latitude: args.lat,
            longitude: args.lon,
            radius_nm: args.radius_nm,
            poll_interval_secs: args.poll_interval,
            history_path: args.history.clone(),
            export_path: args.export.clone(),
            webhook_url: args.webhook.clone(),
        })?
    };

    let runtime = TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating tracker runtime")?;
    runtime.block_on(run(args, settings))
}

async fn run(args: Args, settings: Settings) -> anyhow::Result<()> {
    let config = &settings.tracker;
    info!(
        "tracking {:.4}, {:.4} within {}nm, polling every {}s",
        config.latitude, config.longitude, config.radius_nm, settings.poll_interval_secs
    );

    let sink: Box<dyn NotificationSink> = match settings.webhook_url.as_deref() {
        Some(url) => Box::new(WebhookSink::new(url)?),
        None => Box::new(LogSink),
    };
    sink.health()
        .await
        .context("notification sink unavailable at startup")?;

    let feed: Box<dyn ObservationFeed> = if args.offline {
        let generator = GeneratorConfig {
            seed: args.seed,
            latitude: config.latitude,
            longitude: config.longitude,
            radius_nm: config.radius_nm,
            ..Default::default()
        };
        Box::new(ScenarioFeed::new(build_scenario(&generator)?))
    } else {
        Box::new(OpenSkyFeed::new(&settings.feed, config)?)
    };

    let tracker = ProximityTracker::new(config.clone(), Box::new(StaticCatalog))
        .context("initializing proximity tracker")?;
    let mut runner = Runner::new(tracker, feed, sink);

    if args.serve || settings.bridge_addr.is_some() {
        let bridge = StatusBridge::new();
        bridge.serve(settings.bridge_addr.unwrap_or_else(default_bind_address))?;
        runner = runner.with_bridge(bridge);
    }

    if args.offline {
        let summary = runner.run_to_completion().await;
        println!(
            "Offline run -> ticks {}, entered {}, exited {}, history records {}",
            summary.ticks, summary.entered, summary.exited, summary.records
        );
        return Ok(());
    }

    let stop = arm_shutdown(tokio::signal::ctrl_c()).await;
    runner
        .run_until(Duration::from_secs(settings.poll_interval_secs), async {
            let _ = stop.await;
        })
        .await;
    Ok(())
}
