use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, info};

use crate::angles::{normalize_angle, round_to, NoaaSunPosition, SunPositionProvider};
use crate::aoi::{load_aoi, Aoi};
use crate::clock::{date_key, iso_timestamp, time_of_day, SimulationClock};
use crate::config::{validate_turbine, RunRequest};
use crate::error::Result;
use crate::footprint::footprint;
use crate::intersect::footprint_hits_aoi;
use crate::output::write_outputs;
use crate::projection::{CoordinateTransform, EpsgTransform};
use crate::types::{
    AnimationDocument, AnimationMeta, CalendarOutputs, DayBucket, EngineConfig, HitRecord,
    SimulationResult, TimestepFrame, Turbine, TurbineShadow,
};

pub const PROGRESS_EVERY: usize = 200;
pub const HIT_DECIMALS: i32 = 5;

pub type Progress<'a> = Option<&'a mut dyn FnMut(u8, &str)>;

fn report(progress: &mut Progress<'_>, percent: u8, message: &str) {
    if let Some(sink) = progress.as_deref_mut() {
        sink(percent, message);
    }
}

pub fn progress_percent(steps_done: usize, total_steps: usize) -> u8 {
    if total_steps == 0 {
        return 0;
    }
    let pct = (100.0 * steps_done as f64 / total_steps as f64).round();
    pct.min(99.0) as u8
}

/// Walks every timestep of the year over every turbine and collects the hit log
/// and the day-bucketed playback frames.
pub fn run<S, C>(
    aoi: &Aoi,
    turbines: &[Turbine],
    config: &EngineConfig,
    sun: &S,
    transform: &C,
    mut progress: Progress<'_>,
) -> Result<SimulationResult>
where
    S: SunPositionProvider + ?Sized,
    C: CoordinateTransform + ?Sized,
{
    let mut sites = Vec::with_capacity(turbines.len());
    for turbine in turbines {
        validate_turbine(turbine)?;
        sites.push((turbine, transform.to_geographic(turbine.x, turbine.y)?));
    }

    let clock = SimulationClock::new(config.year, config.timezone)?;
    let total_steps = clock.total_steps();
    info!(
        year = config.year,
        timezone = config.timezone.name(),
        turbines = turbines.len(),
        total_steps,
        min_solar_elevation_deg = config.min_solar_elevation_deg,
        "starting shadow calendar run"
    );

    let mut hits = Vec::new();
    let mut days: BTreeMap<String, DayBucket> = BTreeMap::new();

    for (index, ts) in clock.iter().enumerate() {
        let instant = ts.with_timezone(&Utc);
        let mut keys: Option<(String, String)> = None;

        for (turbine, site) in &sites {
            let sun_state = sun.sun_position(site.latitude, site.longitude, instant);
            if sun_state.elevation_deg <= config.min_solar_elevation_deg {
                continue;
            }

            let shadow = footprint(
                turbine.x,
                turbine.y,
                turbine.hub_height_m,
                turbine.rotor_diameter_m,
                sun_state.azimuth_deg,
                sun_state.elevation_deg,
            );
            let hit = footprint_hits_aoi(&shadow, aoi);

            let (day, stamp) = keys.get_or_insert_with(|| (date_key(&ts), iso_timestamp(&ts)));
            let bucket = days.entry(day.clone()).or_default();
            let frame = bucket
                .timesteps
                .entry(stamp.clone())
                .or_insert_with(|| TimestepFrame {
                    sun: sun_state,
                    turbines: Vec::new(),
                });
            frame.turbines.push(TurbineShadow {
                turbine_id: turbine.turbine_id.clone(),
                center: [shadow.center.0, shadow.center.1],
                major_m: shadow.major_m,
                minor_m: shadow.minor_m,
                rotation_deg: shadow.rotation_deg,
                intersects_aoi: hit,
            });

            if hit {
                bucket.has_hit = true;
                hits.push(HitRecord {
                    turbine_id: turbine.turbine_id.clone(),
                    timestamp_local: stamp.clone(),
                    date: day.clone(),
                    time: time_of_day(&ts),
                    sun_azimuth_deg: normalize_angle(round_to(sun_state.azimuth_deg, HIT_DECIMALS)),
                    sun_elevation_deg: round_to(sun_state.elevation_deg, HIT_DECIMALS),
                });
            }
        }

        let done = index + 1;
        if done % PROGRESS_EVERY == 0 {
            let pct = progress_percent(done, total_steps);
            debug!(done, total_steps, pct, hits = hits.len(), "progress");
            report(
                &mut progress,
                pct,
                &format!("Processed {done}/{total_steps} timesteps"),
            );
        }
    }

    days.retain(|_, bucket| bucket.has_hit);
    let mut computed_days: Vec<String> = days.keys().cloned().collect();
    computed_days.sort();

    let rows = hits.len();
    info!(rows, days = computed_days.len(), "shadow calendar run finished");
    report(&mut progress, 100, "Completed");

    Ok(SimulationResult {
        hits,
        animation: AnimationDocument {
            meta: AnimationMeta {
                year: config.year,
                min_solar_elevation_deg: config.min_solar_elevation_deg,
                project_epsg: config.project_epsg,
            },
            days,
        },
        computed_days,
        rows,
    })
}

/// Full pipeline: validate, load the AOI, simulate, write both output files under `project_dir/outputs`.
pub fn run_calendar(request: &RunRequest, progress: Progress<'_>) -> Result<CalendarOutputs> {
    request.validate()?;
    let config = request.engine_config()?;
    let aoi = load_aoi(&request.aoi_path)?;
    let transform = EpsgTransform::from_epsg(request.project_epsg)?;

    let result = run(
        &aoi,
        &request.turbines,
        &config,
        &NoaaSunPosition::default(),
        &transform,
        progress,
    )?;
    write_outputs(&request.project_dir.join("outputs"), &result)
}
