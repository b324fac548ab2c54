use chrono::{DateTime, Timelike, Utc};

use crate::types::SunState;

pub const JULIAN_UNIX_EPOCH: f64 = 2_440_587.5;
pub const JULIAN_J2000: f64 = 2_451_545.0;
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;
pub const MINUTES_PER_DEGREE: f64 = 4.0;

pub fn deg_to_rad(deg: f64) -> f64 {
    deg * (std::f64::consts::PI / 180.0)
}

pub fn rad_to_deg(rad: f64) -> f64 {
    rad * (180.0 / std::f64::consts::PI)
}

pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn julian_day(instant: &DateTime<Utc>) -> f64 {
    let secs = instant.timestamp() as f64 + instant.timestamp_subsec_nanos() as f64 * 1e-9;
    secs / 86_400.0 + JULIAN_UNIX_EPOCH
}

pub fn julian_century(jd: f64) -> f64 {
    (jd - JULIAN_J2000) / DAYS_PER_JULIAN_CENTURY
}

pub fn geom_mean_long_sun(t: f64) -> f64 {
    normalize_angle(280.46646 + t * (36000.76983 + 0.0003032 * t))
}

pub fn geom_mean_anomaly_sun(t: f64) -> f64 {
    357.52911 + t * (35999.05029 - 0.0001537 * t)
}

pub fn eccent_earth_orbit(t: f64) -> f64 {
    0.016708634 - t * (0.000042037 + 0.0000001267 * t)
}

pub fn sun_eq_of_center(t: f64) -> f64 {
    let m = deg_to_rad(geom_mean_anomaly_sun(t));
    m.sin() * (1.914602 - t * (0.004817 + 0.000014 * t))
        + (2.0 * m).sin() * (0.019993 - 0.000101 * t)
        + (3.0 * m).sin() * 0.000289
}

pub fn sun_apparent_long(t: f64) -> f64 {
    let true_long = geom_mean_long_sun(t) + sun_eq_of_center(t);
    true_long - 0.00569 - 0.00478 * deg_to_rad(125.04 - 1934.136 * t).sin()
}

pub fn obliquity_corrected(t: f64) -> f64 {
    let mean = 23.0 + (26.0 + (21.448 - t * (46.815 + t * (0.00059 - t * 0.001813))) / 60.0) / 60.0;
    mean + 0.00256 * deg_to_rad(125.04 - 1934.136 * t).cos()
}

pub fn solar_declination(t: f64) -> f64 {
    let e = deg_to_rad(obliquity_corrected(t));
    let lambda = deg_to_rad(sun_apparent_long(t));
    rad_to_deg((e.sin() * lambda.sin()).asin())
}

/// Equation of time in minutes.
pub fn equation_of_time(t: f64) -> f64 {
    let e = deg_to_rad(obliquity_corrected(t));
    let l0 = deg_to_rad(geom_mean_long_sun(t));
    let ecc = eccent_earth_orbit(t);
    let m = deg_to_rad(geom_mean_anomaly_sun(t));
    let y = (e / 2.0).tan().powi(2);

    let etime = y * (2.0 * l0).sin() - 2.0 * ecc * m.sin()
        + 4.0 * ecc * y * m.sin() * (2.0 * l0).cos()
        - 0.5 * y * y * (4.0 * l0).sin()
        - 1.25 * ecc * ecc * (2.0 * m).sin();
    rad_to_deg(etime) * MINUTES_PER_DEGREE
}

pub fn hour_angle(true_solar_minutes: f64) -> f64 {
    true_solar_minutes / MINUTES_PER_DEGREE - 180.0
}

pub fn solar_elevation(latitude: f64, declination: f64, hour_angle: f64) -> f64 {
    let lat = deg_to_rad(latitude);
    let dec = deg_to_rad(declination);
    let ha = deg_to_rad(hour_angle);
    let sin_el = lat.sin() * dec.sin() + lat.cos() * dec.cos() * ha.cos();
    rad_to_deg(sin_el.clamp(-1.0, 1.0).asin())
}

/// Degrees clockwise from north.
pub fn solar_azimuth(latitude: f64, declination: f64, hour_angle: f64) -> f64 {
    let lat = deg_to_rad(latitude);
    let dec = deg_to_rad(declination);
    let ha = deg_to_rad(hour_angle);
    let y = ha.sin();
    let x = ha.cos() * lat.sin() - dec.tan() * lat.cos();
    normalize_angle(rad_to_deg(y.atan2(x)) + 180.0)
}

/// Approximate lift of the apparent sun above its geometric position, in degrees.
pub fn atmospheric_refraction(elevation: f64) -> f64 {
    if elevation > 85.0 {
        return 0.0;
    }
    let te = deg_to_rad(elevation).tan();
    let arcsec = if elevation > 5.0 {
        58.1 / te - 0.07 / te.powi(3) + 0.000086 / te.powi(5)
    } else if elevation > -0.575 {
        1735.0
            + elevation * (-518.2 + elevation * (103.4 + elevation * (-12.79 + elevation * 0.711)))
    } else {
        -20.774 / te
    };
    arcsec / 3600.0
}

pub trait SunPositionProvider {
    fn sun_position(&self, latitude: f64, longitude: f64, instant: DateTime<Utc>) -> SunState;
}

impl<F> SunPositionProvider for F
where
    F: Fn(f64, f64, DateTime<Utc>) -> SunState,
{
    fn sun_position(&self, latitude: f64, longitude: f64, instant: DateTime<Utc>) -> SunState {
        self(latitude, longitude, instant)
    }
}

/// NOAA general solar position algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoaaSunPosition {
    pub refraction: bool,
}

impl Default for NoaaSunPosition {
    fn default() -> Self {
        Self { refraction: true }
    }
}

impl NoaaSunPosition {
    pub fn geometric() -> Self {
        Self { refraction: false }
    }
}

impl SunPositionProvider for NoaaSunPosition {
    fn sun_position(&self, latitude: f64, longitude: f64, instant: DateTime<Utc>) -> SunState {
        let t = julian_century(julian_day(&instant));
        let decl = solar_declination(t);
        let eot = equation_of_time(t);

        let utc_minutes = instant.hour() as f64 * 60.0
            + instant.minute() as f64
            + instant.second() as f64 / 60.0;
        let true_solar = (utc_minutes + eot + MINUTES_PER_DEGREE * longitude).rem_euclid(1440.0);
        let ha = hour_angle(true_solar);

        let geometric = solar_elevation(latitude, decl, ha);
        let elevation = if self.refraction {
            geometric + atmospheric_refraction(geometric)
        } else {
            geometric
        };

        SunState {
            azimuth_deg: solar_azimuth(latitude, decl, ha),
            elevation_deg: elevation,
        }
    }
}
