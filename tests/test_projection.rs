use shadow_calendar::error::ShadowError;
use shadow_calendar::projection::*;
use shadow_calendar::types::GeoPoint;

macro_rules! assert_approx {
    ($left:expr, $right:expr, $tol:expr) => {
        let (l, r) = ($left as f64, $right as f64);
        assert!(
            (l - r).abs() <= $tol,
            "assert_approx failed: left={}, right={}, diff={}, tol={}",
            l, r, (l - r).abs(), $tol
        );
    };
}

// ── EPSG lookup ──

#[test]
fn test_utm_zone_from_epsg() {
    let t = EpsgTransform::from_epsg(32633).unwrap();
    assert_eq!(t.projection, Projection::Utm { zone: 33, north: true });
    let t = EpsgTransform::from_epsg(32755).unwrap();
    assert_eq!(t.projection, Projection::Utm { zone: 55, north: false });
    let t = EpsgTransform::from_epsg(25832).unwrap();
    assert_eq!(t.projection, Projection::Utm { zone: 32, north: true });
}

#[test]
fn test_unsupported_epsg_is_configuration_error() {
    for code in [0, 2154, 32600, 32661, 27700] {
        match EpsgTransform::from_epsg(code) {
            Err(ShadowError::Configuration(msg)) => assert!(msg.contains(&code.to_string())),
            other => panic!("EPSG:{} gave {:?}", code, other),
        }
    }
}

#[test]
fn test_central_meridians() {
    assert_eq!(utm_central_meridian(1), -177.0);
    assert_eq!(utm_central_meridian(31), 3.0);
    assert_eq!(utm_central_meridian(33), 15.0);
    assert_eq!(utm_central_meridian(60), 177.0);
}

// ── UTM inverse ──

#[test]
fn test_origin_of_zone_maps_to_equator() {
    let p = utm_inverse(500_000.0, 0.0, 31, true);
    assert_approx!(p.latitude, 0.0, 1e-9);
    assert_approx!(p.longitude, 3.0, 1e-9);

    let s = utm_inverse(500_000.0, 10_000_000.0, 33, false);
    assert_approx!(s.latitude, 0.0, 1e-9);
    assert_approx!(s.longitude, 15.0, 1e-9);
}

#[test]
fn test_demo_site_in_zone_33n() {
    let t = EpsgTransform::from_epsg(32633).unwrap();
    let p = t.to_geographic(500_000.0, 4_649_800.0).unwrap();
    assert_approx!(p.longitude, 15.0, 1e-9);
    assert_approx!(p.latitude, 42.0, 0.01);
}

#[test]
fn test_longitude_symmetric_about_central_meridian() {
    let west = utm_inverse(450_000.0, 5_000_000.0, 32, true);
    let east = utm_inverse(550_000.0, 5_000_000.0, 32, true);
    assert_approx!(west.latitude, east.latitude, 1e-9);
    assert_approx!(9.0 - west.longitude, east.longitude - 9.0, 1e-9);
    assert!(east.longitude > 9.0);
    // 50 km east at 45°N is about 50 / (111.3 * cos 45°) degrees
    assert_approx!(east.longitude - 9.0, 0.634, 0.02);
}

#[test]
fn test_southern_hemisphere_is_negative() {
    let p = utm_inverse(500_000.0, 6_250_000.0, 56, false);
    assert!(p.latitude < -33.0 && p.latitude > -35.0, "{:?}", p);
    assert_approx!(p.longitude, 153.0, 1e-9);
}

// ── Other projections ──

#[test]
fn test_geographic_is_identity() {
    let t = EpsgTransform::from_epsg(4326).unwrap();
    let p = t.to_geographic(12.5, 41.9).unwrap();
    assert_eq!(p, GeoPoint { latitude: 41.9, longitude: 12.5 });
}

#[test]
fn test_web_mercator_inverse() {
    let t = EpsgTransform::from_epsg(3857).unwrap();
    let origin = t.to_geographic(0.0, 0.0).unwrap();
    assert_approx!(origin.latitude, 0.0, 1e-12);
    assert_approx!(origin.longitude, 0.0, 1e-12);
    let edge = t.to_geographic(WGS84_A * std::f64::consts::PI, 0.0).unwrap();
    assert_approx!(edge.longitude, 180.0, 1e-9);
}

#[test]
fn test_bad_coordinates_are_data_errors() {
    let t = EpsgTransform::from_epsg(4326).unwrap();
    assert!(matches!(t.to_geographic(f64::NAN, 0.0), Err(ShadowError::Data(_))));
    assert!(matches!(t.to_geographic(0.0, 95.0), Err(ShadowError::Data(_))));
}

#[test]
fn test_closure_transform() {
    let fixed = |_x: f64, _y: f64| -> shadow_calendar::Result<GeoPoint> {
        Ok(GeoPoint { latitude: 10.0, longitude: 20.0 })
    };
    let p = fixed.to_geographic(1.0, 2.0).unwrap();
    assert_eq!(p.latitude, 10.0);
    assert!(epsg_is_supported(32633));
    assert!(!epsg_is_supported(2154));
}
