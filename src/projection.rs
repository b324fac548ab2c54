use crate::angles::rad_to_deg;
use crate::error::{Result, ShadowError};
use crate::types::GeoPoint;

pub const WGS84_A: f64 = 6_378_137.0;
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
pub const UTM_SCALE: f64 = 0.9996;
pub const UTM_FALSE_EASTING: f64 = 500_000.0;
pub const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

pub trait CoordinateTransform {
    fn to_geographic(&self, x: f64, y: f64) -> Result<GeoPoint>;
}

impl<F> CoordinateTransform for F
where
    F: Fn(f64, f64) -> Result<GeoPoint>,
{
    fn to_geographic(&self, x: f64, y: f64) -> Result<GeoPoint> {
        self(x, y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Geographic,
    WebMercator,
    Utm { zone: u8, north: bool },
}

/// Planar-to-geographic transformer for the EPSG codes a wind project is usually surveyed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpsgTransform {
    pub epsg: u32,
    pub projection: Projection,
}

impl EpsgTransform {
    pub fn from_epsg(epsg: u32) -> Result<Self> {
        let projection = match epsg {
            4326 => Projection::Geographic,
            3857 => Projection::WebMercator,
            32601..=32660 => Projection::Utm {
                zone: (epsg - 32600) as u8,
                north: true,
            },
            32701..=32760 => Projection::Utm {
                zone: (epsg - 32700) as u8,
                north: false,
            },
            // ETRS89 / UTM zones 28N..38N
            25828..=25838 => Projection::Utm {
                zone: (epsg - 25800) as u8,
                north: true,
            },
            _ => {
                return Err(ShadowError::Configuration(format!(
                    "unsupported coordinate system EPSG:{epsg}"
                )))
            }
        };
        Ok(Self { epsg, projection })
    }
}

impl CoordinateTransform for EpsgTransform {
    fn to_geographic(&self, x: f64, y: f64) -> Result<GeoPoint> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ShadowError::Data(format!(
                "non-finite coordinate ({x}, {y}) for EPSG:{}",
                self.epsg
            )));
        }
        let point = match self.projection {
            Projection::Geographic => GeoPoint {
                latitude: y,
                longitude: x,
            },
            Projection::WebMercator => GeoPoint {
                latitude: rad_to_deg(2.0 * (y / WGS84_A).exp().atan() - std::f64::consts::FRAC_PI_2),
                longitude: rad_to_deg(x / WGS84_A),
            },
            Projection::Utm { zone, north } => utm_inverse(x, y, zone, north),
        };
        if !point.latitude.is_finite()
            || !point.longitude.is_finite()
            || point.latitude.abs() > 90.0
        {
            return Err(ShadowError::Data(format!(
                "({x}, {y}) does not map to a valid position in EPSG:{}",
                self.epsg
            )));
        }
        Ok(point)
    }
}

pub fn utm_central_meridian(zone: u8) -> f64 {
    (zone as f64 - 1.0) * 6.0 - 180.0 + 3.0
}

/// Inverse transverse mercator (Snyder, USGS PP 1395, eqs. 8-18..8-25).
pub fn utm_inverse(easting: f64, northing: f64, zone: u8, north: bool) -> GeoPoint {
    let e2 = WGS84_F * (2.0 - WGS84_F);
    let ep2 = e2 / (1.0 - e2);
    let x = easting - UTM_FALSE_EASTING;
    let y = if north {
        northing
    } else {
        northing - UTM_FALSE_NORTHING_SOUTH
    };

    let m = y / UTM_SCALE;
    let mu = m / (WGS84_A * (1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2.powi(3) / 256.0));
    let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let (sin1, cos1, tan1) = (phi1.sin(), phi1.cos(), phi1.tan());
    let c1 = ep2 * cos1 * cos1;
    let t1 = tan1 * tan1;
    let n1 = WGS84_A / (1.0 - e2 * sin1 * sin1).sqrt();
    let r1 = WGS84_A * (1.0 - e2) / (1.0 - e2 * sin1 * sin1).powf(1.5);
    let d = x / (n1 * UTM_SCALE);

    let lat = phi1
        - (n1 * tan1 / r1)
            * (d * d / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                    * d.powi(6)
                    / 720.0);
    let lon = (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
        + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d.powi(5)
            / 120.0)
        / cos1;

    GeoPoint {
        latitude: rad_to_deg(lat),
        longitude: utm_central_meridian(zone) + rad_to_deg(lon),
    }
}

pub fn epsg_is_supported(epsg: u32) -> bool {
    EpsgTransform::from_epsg(epsg).is_ok()
}
