use geo::{BoundingRect, LineString, Polygon};

use crate::angles::{deg_to_rad, normalize_angle};
use crate::types::ShadowFootprint;

pub const MIN_ELEVATION_DEG: f64 = 0.01;
pub const ELLIPSE_VERTICES: usize = 48;

pub fn clamped_elevation_rad(sun_elevation_deg: f64) -> f64 {
    deg_to_rad(sun_elevation_deg.max(MIN_ELEVATION_DEG))
}

/// Distance from the tower base to the footprint center.
pub fn shadow_length(hub_height_m: f64, sun_elevation_deg: f64) -> f64 {
    hub_height_m / clamped_elevation_rad(sun_elevation_deg).tan()
}

pub fn major_axis(rotor_diameter_m: f64, sun_elevation_deg: f64) -> f64 {
    let elongated = rotor_diameter_m / clamped_elevation_rad(sun_elevation_deg).sin();
    rotor_diameter_m.max(elongated)
}

pub fn shadow_direction_deg(sun_azimuth_deg: f64) -> f64 {
    normalize_angle(sun_azimuth_deg + 180.0)
}

pub fn footprint_rotation_deg(sun_azimuth_deg: f64) -> f64 {
    normalize_angle(sun_azimuth_deg + 90.0)
}

pub fn ellipse_ring(
    center: (f64, f64),
    major_m: f64,
    minor_m: f64,
    rotation_deg: f64,
    vertices: usize,
) -> LineString<f64> {
    let a = major_m / 2.0;
    let b = minor_m / 2.0;
    let rot = deg_to_rad(rotation_deg);
    let (sin_r, cos_r) = rot.sin_cos();

    let points: Vec<(f64, f64)> = (0..vertices)
        .map(|i| {
            let t = 2.0 * std::f64::consts::PI * i as f64 / vertices as f64;
            let ex = a * t.cos();
            let ey = b * t.sin();
            (
                center.0 + ex * cos_r - ey * sin_r,
                center.1 + ex * sin_r + ey * cos_r,
            )
        })
        .collect();
    LineString::from(points)
}

/// Elliptical approximation of the rotor shadow cast on flat ground.
///
/// The minor axis is the rotor diameter; the major axis stretches as the sun
/// drops, and the ellipse sits `hub_height / tan(elevation)` down-sun of the tower.
pub fn footprint(
    turbine_x: f64,
    turbine_y: f64,
    hub_height_m: f64,
    rotor_diameter_m: f64,
    sun_azimuth_deg: f64,
    sun_elevation_deg: f64,
) -> ShadowFootprint {
    let length = shadow_length(hub_height_m, sun_elevation_deg);
    let theta = deg_to_rad(shadow_direction_deg(sun_azimuth_deg));
    let center = (
        turbine_x + length * theta.sin(),
        turbine_y + length * theta.cos(),
    );

    let major_m = major_axis(rotor_diameter_m, sun_elevation_deg);
    let minor_m = rotor_diameter_m;
    let rotation_deg = footprint_rotation_deg(sun_azimuth_deg);

    let ring = ellipse_ring(center, major_m, minor_m, rotation_deg, ELLIPSE_VERTICES);
    let polygon = Polygon::new(ring, vec![]);
    let bbox = polygon.bounding_rect();

    ShadowFootprint {
        polygon,
        bbox,
        center,
        major_m,
        minor_m,
        rotation_deg,
    }
}
