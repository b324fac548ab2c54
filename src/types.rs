use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono_tz::Tz;
use geo::{Polygon, Rect};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turbine {
    #[serde(alias = "id")]
    pub turbine_id: String,
    pub x: f64,
    pub y: f64,
    pub hub_height_m: f64,
    pub rotor_diameter_m: f64,
}

impl Turbine {
    pub fn new(
        turbine_id: impl Into<String>,
        x: f64,
        y: f64,
        hub_height_m: f64,
        rotor_diameter_m: f64,
    ) -> Self {
        Self {
            turbine_id: turbine_id.into(),
            x,
            y,
            hub_height_m,
            rotor_diameter_m,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunState {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShadowFootprint {
    pub polygon: Polygon<f64>,
    pub bbox: Option<Rect<f64>>,
    pub center: (f64, f64),
    pub major_m: f64,
    pub minor_m: f64,
    pub rotation_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitRecord {
    pub turbine_id: String,
    pub timestamp_local: String,
    pub date: String,
    pub time: String,
    pub sun_azimuth_deg: f64,
    pub sun_elevation_deg: f64,
}

/// One turbine's shadow as drawn in a playback frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurbineShadow {
    pub turbine_id: String,
    pub center: [f64; 2],
    pub major_m: f64,
    pub minor_m: f64,
    pub rotation_deg: f64,
    pub intersects_aoi: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestepFrame {
    pub sun: SunState,
    pub turbines: Vec<TurbineShadow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayBucket {
    pub timesteps: BTreeMap<String, TimestepFrame>,
    pub has_hit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationMeta {
    pub year: i32,
    pub min_solar_elevation_deg: f64,
    pub project_epsg: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationDocument {
    pub meta: AnimationMeta,
    pub days: BTreeMap<String, DayBucket>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub hits: Vec<HitRecord>,
    pub animation: AnimationDocument,
    pub computed_days: Vec<String>,
    pub rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub min_solar_elevation_deg: f64,
    pub year: i32,
    pub timezone: Tz,
    pub project_epsg: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_solar_elevation_deg: 0.0,
            year: 2025,
            timezone: chrono_tz::Europe::Rome,
            project_epsg: 32633,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarOutputs {
    pub csv_path: PathBuf,
    pub animation_data_path: PathBuf,
    pub computed_days: Vec<String>,
    pub rows: usize,
}
