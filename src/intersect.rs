use geo::{Intersects, MultiPolygon, Polygon, Rect};

use crate::aoi::Aoi;
use crate::types::ShadowFootprint;

pub fn bboxes_overlap(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    !(a.max().x < b.min().x || a.min().x > b.max().x || a.max().y < b.min().y || a.min().y > b.max().y)
}

/// Bounding-box reject first, exact polygon test only when the boxes touch.
pub fn intersects(
    footprint_polygon: &Polygon<f64>,
    aoi_polygon: &MultiPolygon<f64>,
    footprint_bbox: Option<&Rect<f64>>,
    aoi_bbox: &Rect<f64>,
) -> bool {
    match footprint_bbox {
        Some(bbox) if !bboxes_overlap(bbox, aoi_bbox) => false,
        None => false,
        Some(_) => aoi_polygon.0.iter().any(|part| footprint_polygon.intersects(part)),
    }
}

pub fn footprint_hits_aoi(footprint: &ShadowFootprint, aoi: &Aoi) -> bool {
    intersects(&footprint.polygon, &aoi.shape, footprint.bbox.as_ref(), &aoi.bbox)
}
