use anyhow::Context;
use chrono::{DateTime, Duration, TimeZone, Utc};
use overheadcore::math::GeodesyHelper;
use overheadcore::Observation;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const AIRLINES: [&str; 6] = ["UAL", "SWA", "DAL", "AAL", "ASA", "SKW"];
const TYPES: [&str; 6] = ["B738", "A320", "E75L", "B39M", "A21N", "CRJ9"];
const ROUTES: [(&str, &str); 5] = [
    ("SMF", "PDX"),
    ("SFO", "SEA"),
    ("LAX", "SMF"),
    ("SMF", "DEN"),
    ("PHX", "SMF"),
];

/// Configuration for generating synthetic flyover passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub passes: usize,
    pub ticks_per_pass: usize,
    pub gap_ticks: usize,
    pub seed: u64,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_nm: f64,
    pub tick_secs: i64,
    pub start_secs: i64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            passes: 3,
            ticks_per_pass: 8,
            gap_ticks: 2,
            seed: 0,
            latitude: 38.57,
            longitude: -121.49,
            radius_nm: 3.0,
            tick_secs: 20,
            start_secs: 1_700_000_000,
        }
    }
}

impl GeneratorConfig {
    fn normalized_ticks(&self) -> usize {
        self.ticks_per_pass.max(2)
    }
}

/// Builds one batch per tick: each pass is a single aircraft flying a
/// straight line through the zone, followed by `gap_ticks` empty batches.
pub fn build_scenario(config: &GeneratorConfig) -> anyhow::Result<Vec<Vec<Observation>>> {
    let ticks = config.normalized_ticks();
    let total = config
        .passes
        .checked_mul(ticks + config.gap_ticks)
        .context("overflow computing scenario length")?;
    let start = Utc
        .timestamp_opt(config.start_secs, 0)
        .single()
        .context("invalid scenario start time")?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut batches = Vec::with_capacity(total);

    for pass in 0..config.passes {
        let offset = (pass * (ticks + config.gap_ticks)) as i64;
        batches.extend(build_pass(config, &mut rng, start, offset, ticks));
        batches.extend(std::iter::repeat_with(Vec::new).take(config.gap_ticks));
    }

    Ok(batches)
}

fn build_pass(
    config: &GeneratorConfig,
    rng: &mut StdRng,
    start: DateTime<Utc>,
    tick_offset: i64,
    ticks: usize,
) -> Vec<Vec<Observation>> {
    let airline = AIRLINES[rng.gen_range(0..AIRLINES.len())];
    let callsign = format!("{}{}", airline, rng.gen_range(100..3000));
    let type_code = TYPES[rng.gen_range(0..TYPES.len())];
    let (origin, destination) = ROUTES[rng.gen_range(0..ROUTES.len())];

    let radius = config.radius_nm.max(0.1);
    let miss = rng.gen_range(0.05..radius * 0.6);
    let half_chord = (radius * radius - miss * miss).sqrt() * 0.95;
    let heading: f64 = rng.gen_range(0.0..360.0);
    let altitude = rng.gen_range(2_000.0..12_000.0);
    let speed = rng.gen_range(140.0..300.0);

    let (sin_h, cos_h) = heading.to_radians().sin_cos();
    let nm_per_lon = 60.0 * config.latitude.to_radians().cos().max(1e-6);

    (0..ticks)
        .map(|step| {
            let along = -half_chord + 2.0 * half_chord * step as f64 / (ticks - 1) as f64;
            // Track runs along the heading; the miss offset is perpendicular to it.
            let north = along * cos_h - miss * sin_h;
            let east = along * sin_h + miss * cos_h;
            let lat = config.latitude + north / 60.0;
            let lon = config.longitude + east / nm_per_lon;

            let timestamp = start + Duration::seconds((tick_offset + step as i64) * config.tick_secs);
            let mut obs = Observation::new(callsign.clone(), lat, lon, timestamp)
                .with_altitude((altitude + rng.gen_range(-150.0..150.0_f64)).round())
                .with_speed((speed + rng.gen_range(-5.0..5.0_f64)).round())
                .with_aircraft_type(type_code)
                .with_route(origin, destination);
            obs.track_deg = Some(heading);
            obs.distance_nm = Some(GeodesyHelper::haversine_nm(
                config.latitude,
                config.longitude,
                lat,
                lon,
            ));
            vec![obs]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_has_expected_tick_count() {
        let config = GeneratorConfig::default();
        let batches = build_scenario(&config).unwrap();
        assert_eq!(batches.len(), 3 * (8 + 2));
        assert!(batches[8].is_empty() && batches[9].is_empty());
        assert_eq!(batches[0].len(), 1);
    }

    #[test]
    fn passes_stay_inside_radius_and_approach_then_recede() {
        let config = GeneratorConfig {
            passes: 2,
            ticks_per_pass: 9,
            gap_ticks: 1,
            seed: 13,
            ..Default::default()
        };
        let batches = build_scenario(&config).unwrap();
        let distances: Vec<f64> = batches[..9]
            .iter()
            .map(|batch| batch[0].distance_nm.unwrap())
            .collect();

        assert!(distances.iter().all(|d| *d <= config.radius_nm));
        assert!(distances[4] < distances[0]);
        assert!(distances[4] < distances[8]);
    }

    #[test]
    fn same_seed_reproduces_scenario() {
        let config = GeneratorConfig {
            seed: 7,
            ..Default::default()
        };
        assert_eq!(
            build_scenario(&config).unwrap(),
            build_scenario(&config).unwrap()
        );
    }
}
