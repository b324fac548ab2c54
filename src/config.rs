use std::fs;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ShadowError};
use crate::projection::epsg_is_supported;
use crate::types::{EngineConfig, Turbine};

pub const MAX_TURBINES: usize = 20;
pub const DEFAULT_YEAR: i32 = 2025;
pub const DEFAULT_TIMEZONE: &str = "Europe/Rome";

fn default_year() -> i32 {
    DEFAULT_YEAR
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

/// A calendar run as submitted by a host: where the AOI lives, where outputs go, and the layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    pub project_dir: PathBuf,
    pub aoi_path: PathBuf,
    pub project_epsg: u32,
    #[serde(default)]
    pub min_solar_elevation_deg: f64,
    #[serde(default = "default_year")]
    pub year: i32,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    pub turbines: Vec<Turbine>,
}

impl RunRequest {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(toml::from_str(&text)?),
            Some("json") => Ok(serde_json::from_str(&text)?),
            _ => Err(ShadowError::Configuration(format!(
                "run request '{}' must be .json or .toml",
                path.display()
            ))),
        }
    }

    pub fn timezone(&self) -> Result<Tz> {
        parse_timezone(&self.timezone)
    }

    pub fn engine_config(&self) -> Result<EngineConfig> {
        Ok(EngineConfig {
            min_solar_elevation_deg: self.min_solar_elevation_deg,
            year: self.year,
            timezone: self.timezone()?,
            project_epsg: self.project_epsg,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.turbines.is_empty() {
            return Err(ShadowError::Data("run request has no turbines".into()));
        }
        if self.turbines.len() > MAX_TURBINES {
            return Err(ShadowError::Data(format!(
                "max {MAX_TURBINES} turbines, got {}",
                self.turbines.len()
            )));
        }
        for turbine in &self.turbines {
            validate_turbine(turbine)?;
        }
        if !self.min_solar_elevation_deg.is_finite() {
            return Err(ShadowError::Configuration(
                "min_solar_elevation_deg must be finite".into(),
            ));
        }
        if !(1..=9999).contains(&self.year) {
            return Err(ShadowError::Configuration(format!("year {} out of range", self.year)));
        }
        if !epsg_is_supported(self.project_epsg) {
            return Err(ShadowError::Configuration(format!(
                "unsupported coordinate system EPSG:{}",
                self.project_epsg
            )));
        }
        self.timezone()?;
        Ok(())
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| ShadowError::Configuration(format!("unknown time zone '{name}'")))
}

pub fn validate_turbine(turbine: &Turbine) -> Result<()> {
    let id = &turbine.turbine_id;
    if id.trim().is_empty() {
        return Err(ShadowError::Data("turbine with empty id".into()));
    }
    if !turbine.x.is_finite() || !turbine.y.is_finite() {
        return Err(ShadowError::Data(format!("turbine {id} has non-finite position")));
    }
    if !(turbine.hub_height_m.is_finite() && turbine.hub_height_m > 0.0) {
        return Err(ShadowError::Data(format!(
            "turbine {id} hub height must be positive, got {}",
            turbine.hub_height_m
        )));
    }
    if !(turbine.rotor_diameter_m.is_finite() && turbine.rotor_diameter_m > 0.0) {
        return Err(ShadowError::Data(format!(
            "turbine {id} rotor diameter must be positive, got {}",
            turbine.rotor_diameter_m
        )));
    }
    Ok(())
}
