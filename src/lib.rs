pub mod angles;
pub mod aoi;
pub mod clock;
pub mod config;
pub mod demo;
pub mod engine;
pub mod error;
pub mod footprint;
pub mod intersect;
pub mod jobs;
pub mod output;
pub mod projection;
pub mod types;

pub use angles::{
    atmospheric_refraction, deg_to_rad, equation_of_time, julian_century, julian_day,
    normalize_angle, rad_to_deg, round_to, solar_azimuth, solar_declination, solar_elevation,
    NoaaSunPosition, SunPositionProvider,
};

pub use aoi::{load_aoi, parse_shapefile, Aoi};

pub use clock::{date_key, iso_timestamp, local_new_year, time_of_day, SimulationClock, STEP_MINUTES};

pub use config::{parse_timezone, validate_turbine, RunRequest, MAX_TURBINES};

pub use engine::{progress_percent, run, run_calendar, Progress, PROGRESS_EVERY};

pub use error::{Result, ShadowError};

pub use footprint::{footprint, major_axis, shadow_length, ELLIPSE_VERTICES, MIN_ELEVATION_DEG};

pub use intersect::{bboxes_overlap, footprint_hits_aoi, intersects};

pub use jobs::{JobError, JobId, JobSnapshot, JobStatus, JobStore, OutputKind};

pub use output::{animation_json, hit_log_csv, write_animation, write_hit_log, write_outputs};

pub use projection::{utm_inverse, CoordinateTransform, EpsgTransform, Projection};

pub use types::{
    AnimationDocument, AnimationMeta, CalendarOutputs, DayBucket, EngineConfig, GeoPoint,
    HitRecord, ShadowFootprint, SimulationResult, SunState, TimestepFrame, Turbine, TurbineShadow,
};
