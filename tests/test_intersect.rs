use geo::{LineString, Polygon, Rect};

use shadow_calendar::aoi::Aoi;
use shadow_calendar::demo::{DEMO_AOI_MAX, DEMO_AOI_MIN};
use shadow_calendar::footprint::footprint;
use shadow_calendar::intersect::*;

fn square(x0: f64, y0: f64, side: f64) -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![
            (x0, y0),
            (x0 + side, y0),
            (x0 + side, y0 + side),
            (x0, y0 + side),
            (x0, y0),
        ]),
        vec![],
    )
}

fn demo_aoi() -> Aoi {
    Aoi::rectangle(DEMO_AOI_MIN, DEMO_AOI_MAX).unwrap()
}

// ── Bounding boxes ──

#[test]
fn test_bbox_overlap_cases() {
    let a = Rect::new((0.0, 0.0), (10.0, 10.0));
    assert!(bboxes_overlap(&a, &Rect::new((5.0, 5.0), (15.0, 15.0))));
    assert!(bboxes_overlap(&a, &Rect::new((10.0, 0.0), (20.0, 10.0))));
    assert!(!bboxes_overlap(&a, &Rect::new((10.1, 0.0), (20.0, 10.0))));
    assert!(!bboxes_overlap(&a, &Rect::new((0.0, -5.0), (10.0, -0.1))));
}

#[test]
fn test_far_footprint_rejected_by_bbox() {
    let aoi = demo_aoi();
    let fp = footprint(400_000.0, 4_000_000.0, 100.0, 100.0, 180.0, 40.0);
    assert!(!intersects(&fp.polygon, &aoi.shape, fp.bbox.as_ref(), &aoi.bbox));
    assert!(!footprint_hits_aoi(&fp, &aoi));
}

#[test]
fn test_missing_footprint_bbox_never_hits() {
    let aoi = demo_aoi();
    let fp = footprint(500_500.0, 4_650_000.0, 100.0, 100.0, 180.0, 40.0);
    assert!(!intersects(&fp.polygon, &aoi.shape, None, &aoi.bbox));
}

// ── Exact test ──

#[test]
fn test_gap_between_rings_is_not_a_hit() {
    // two squares with a gap; the AOI box spans the gap
    let aoi = Aoi::from_polygons(vec![square(0.0, 0.0, 100.0), square(300.0, 0.0, 100.0)]).unwrap();
    assert_eq!(aoi.shape.0.len(), 2);

    let fp = footprint(200.0, 20.0, 20.0, 40.0, 180.0, 60.0);
    let bbox = fp.bbox.unwrap();
    assert!(bboxes_overlap(&bbox, &aoi.bbox));
    assert!(!footprint_hits_aoi(&fp, &aoi));
}

#[test]
fn test_second_ring_is_checked() {
    let aoi = Aoi::from_polygons(vec![square(0.0, 0.0, 100.0), square(300.0, 0.0, 100.0)]).unwrap();
    let fp = footprint(350.0, 20.0, 20.0, 40.0, 180.0, 60.0);
    assert!(footprint_hits_aoi(&fp, &aoi));
}

#[test]
fn test_partial_overlap_hits() {
    let aoi = demo_aoi();
    // tower 60 m south of the AOI, noon sun throws the shadow north across the edge
    let fp = footprint(500_500.0, 4_649_640.0, 100.0, 120.0, 180.0, 45.0);
    assert!(footprint_hits_aoi(&fp, &aoi));
}

// ── Scenarios on the demo AOI ──

#[test]
fn test_short_shadow_at_centroid_is_inside() {
    let aoi = demo_aoi();
    let (cx, cy) = (
        (DEMO_AOI_MIN.0 + DEMO_AOI_MAX.0) / 2.0,
        (DEMO_AOI_MIN.1 + DEMO_AOI_MAX.1) / 2.0,
    );
    let fp = footprint(cx, cy, 10.0, 150.0, 180.0, 70.0);
    // the whole ellipse lies inside the rectangle, which counts as touching the AOI
    let bbox = fp.bbox.unwrap();
    assert!(bbox.min().x > DEMO_AOI_MIN.0 && bbox.max().x < DEMO_AOI_MAX.0);
    assert!(bbox.min().y > DEMO_AOI_MIN.1 && bbox.max().y < DEMO_AOI_MAX.1);
    assert!(footprint_hits_aoi(&fp, &aoi));
}

#[test]
fn test_short_shadow_outside_never_reaches_edge() {
    let aoi = demo_aoi();
    let cy = (DEMO_AOI_MIN.1 + DEMO_AOI_MAX.1) / 2.0;
    // 1 km west of the AOI, midsummer noon: shadow is a few metres long
    let fp = footprint(DEMO_AOI_MIN.0 - 1000.0, cy, 10.0, 150.0, 180.0, 70.0);
    assert!(!footprint_hits_aoi(&fp, &aoi));
}
