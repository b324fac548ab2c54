use std::fs;
use std::path::Path;

use geo::{BooleanOps, BoundingRect, Contains, LineString, MultiPolygon, Point, Polygon, Rect, Winding};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Result, ShadowError};

const SHP_FILE_CODE: i32 = 9994;
const SHP_HEADER_LEN: usize = 100;
const SHP_NULL: i32 = 0;
const SHP_POLYGON: i32 = 5;
const SHP_POLYGON_Z: i32 = 15;
const SHP_POLYGON_M: i32 = 25;

/// Area of interest: every input polygon unioned into one planar shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Aoi {
    pub shape: MultiPolygon<f64>,
    pub bbox: Rect<f64>,
}

impl Aoi {
    pub fn from_polygons(polygons: Vec<Polygon<f64>>) -> Result<Self> {
        for polygon in &polygons {
            check_ring(polygon.exterior())?;
        }
        let mut iter = polygons.into_iter();
        let first = iter
            .next()
            .ok_or_else(|| ShadowError::Geometry("AOI contains no polygons".into()))?;
        let shape = iter.fold(MultiPolygon::new(vec![first]), |acc, polygon| {
            acc.union(&MultiPolygon::new(vec![polygon]))
        });
        if shape.0.is_empty() {
            return Err(ShadowError::Geometry("AOI union is empty".into()));
        }
        let bbox = shape
            .bounding_rect()
            .ok_or_else(|| ShadowError::Geometry("AOI has no extent".into()))?;
        Ok(Self { shape, bbox })
    }

    pub fn from_polygon(polygon: Polygon<f64>) -> Result<Self> {
        Self::from_polygons(vec![polygon])
    }

    pub fn rectangle(min: (f64, f64), max: (f64, f64)) -> Result<Self> {
        Self::from_polygon(Polygon::new(
            LineString::from(vec![
                (min.0, min.1),
                (max.0, min.1),
                (max.0, max.1),
                (min.0, max.1),
                (min.0, min.1),
            ]),
            vec![],
        ))
    }
}

fn check_ring(ring: &LineString<f64>) -> Result<()> {
    if ring.0.len() < 4 {
        return Err(ShadowError::Geometry(format!(
            "polygon ring has {} vertices, need at least 3 distinct",
            ring.0.len().saturating_sub(1)
        )));
    }
    if ring.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(ShadowError::Geometry("polygon ring has non-finite vertex".into()));
    }
    Ok(())
}

pub fn load_aoi(path: &Path) -> Result<Aoi> {
    let bytes = fs::read(path).map_err(|e| {
        ShadowError::Geometry(format!("cannot read AOI source '{}': {e}", path.display()))
    })?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let polygons = match ext.as_str() {
        "shp" => parse_shapefile(&bytes)?,
        "geojson" | "json" => {
            let value: Value = serde_json::from_slice(&bytes).map_err(|e| {
                ShadowError::Geometry(format!("invalid GeoJSON in '{}': {e}", path.display()))
            })?;
            let mut out = Vec::new();
            collect_geojson(&value, &mut out)?;
            out
        }
        other => {
            return Err(ShadowError::Geometry(format!(
                "unsupported AOI format '.{other}' for '{}'",
                path.display()
            )))
        }
    };

    let count = polygons.len();
    let aoi = Aoi::from_polygons(polygons)?;
    info!(
        path = %path.display(),
        input_polygons = count,
        merged_polygons = aoi.shape.0.len(),
        "loaded AOI"
    );
    Ok(aoi)
}

// ── Shapefile ──

fn bytes_at<const N: usize>(buf: &[u8], at: usize) -> Result<[u8; N]> {
    buf.get(at..at + N)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| ShadowError::Geometry(format!("shapefile truncated at byte {at}")))
}

fn be_i32(buf: &[u8], at: usize) -> Result<i32> {
    Ok(i32::from_be_bytes(bytes_at(buf, at)?))
}

fn le_i32(buf: &[u8], at: usize) -> Result<i32> {
    Ok(i32::from_le_bytes(bytes_at(buf, at)?))
}

fn le_f64(buf: &[u8], at: usize) -> Result<f64> {
    Ok(f64::from_le_bytes(bytes_at(buf, at)?))
}

fn count(value: i32, what: &str) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| ShadowError::Geometry(format!("negative {what} count in shapefile")))
}

pub fn parse_shapefile(buf: &[u8]) -> Result<Vec<Polygon<f64>>> {
    if be_i32(buf, 0)? != SHP_FILE_CODE {
        return Err(ShadowError::Geometry("not an ESRI shapefile (bad file code)".into()));
    }
    let file_len = (count(be_i32(buf, 24)?, "file length")? * 2).min(buf.len());
    let shape_type = le_i32(buf, 32)?;
    if !matches!(shape_type, SHP_POLYGON | SHP_POLYGON_Z | SHP_POLYGON_M) {
        return Err(ShadowError::Geometry(format!(
            "shapefile holds shape type {shape_type}, expected polygons"
        )));
    }

    let mut polygons = Vec::new();
    let mut offset = SHP_HEADER_LEN;
    while offset + 8 <= file_len {
        let record_no = be_i32(buf, offset)?;
        let content_len = count(be_i32(buf, offset + 4)?, "record length")? * 2;
        let content = offset + 8;
        if content + content_len > buf.len() {
            return Err(ShadowError::Geometry(format!("shapefile record {record_no} is truncated")));
        }
        let record = &buf[content..content + content_len];
        match le_i32(record, 0)? {
            SHP_NULL => debug!(record_no, "skipping null shape"),
            SHP_POLYGON | SHP_POLYGON_Z | SHP_POLYGON_M => {
                polygons.extend(parse_polygon_record(record, record_no)?);
            }
            other => {
                return Err(ShadowError::Geometry(format!(
                    "record {record_no} has shape type {other}, expected polygon"
                )))
            }
        }
        offset = content + content_len;
    }
    Ok(polygons)
}

fn parse_polygon_record(record: &[u8], record_no: i32) -> Result<Vec<Polygon<f64>>> {
    // shape type (4) + bbox (32)
    let num_parts = count(le_i32(record, 36)?, "part")?;
    let num_points = count(le_i32(record, 40)?, "point")?;
    let parts_at = 44;
    // counts come from the file, so size them against the record before allocating
    let points_at = num_parts
        .checked_mul(4)
        .and_then(|n| n.checked_add(parts_at))
        .filter(|&at| at <= record.len())
        .ok_or_else(|| ShadowError::Geometry(format!("record {record_no} is truncated")))?;
    let fits = num_points
        .checked_mul(16)
        .and_then(|n| n.checked_add(points_at))
        .is_some_and(|end| end <= record.len());
    if !fits {
        return Err(ShadowError::Geometry(format!("record {record_no} is truncated")));
    }

    let mut starts = Vec::with_capacity(num_parts);
    for i in 0..num_parts {
        starts.push(count(le_i32(record, parts_at + 4 * i)?, "part start")?);
    }

    let mut rings = Vec::with_capacity(num_parts);
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(num_points);
        if start > end || end > num_points {
            return Err(ShadowError::Geometry(format!(
                "record {record_no} has inconsistent part offsets"
            )));
        }
        let mut coords = Vec::with_capacity(end - start);
        for p in start..end {
            let at = points_at + 16 * p;
            coords.push((le_f64(record, at)?, le_f64(record, at + 8)?));
        }
        rings.push(LineString::from(coords));
    }
    Ok(assemble_rings(rings, record_no))
}

/// Clockwise rings are shells, counter-clockwise rings are holes of the shell that contains them.
fn assemble_rings(rings: Vec<LineString<f64>>, record_no: i32) -> Vec<Polygon<f64>> {
    let mut shells: Vec<(LineString<f64>, Vec<LineString<f64>>)> = Vec::new();
    let mut holes = Vec::new();
    for mut ring in rings {
        ring.close();
        if ring.is_cw() {
            shells.push((ring, Vec::new()));
        } else {
            holes.push(ring);
        }
    }

    for hole in holes {
        let probe = hole.0.first().map(|c| Point::from(*c));
        let owner = probe.and_then(|pt| {
            shells
                .iter()
                .position(|(shell, _)| Polygon::new(shell.clone(), vec![]).contains(&pt))
        });
        match owner {
            Some(idx) => shells[idx].1.push(hole),
            None => {
                warn!(record_no, "counter-clockwise ring outside every shell, treating it as a shell");
                shells.push((hole, Vec::new()));
            }
        }
    }

    shells
        .into_iter()
        .map(|(shell, interiors)| Polygon::new(shell, interiors))
        .collect()
}

// ── GeoJSON ──

fn collect_geojson(value: &Value, out: &mut Vec<Polygon<f64>>) -> Result<()> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ShadowError::Geometry("GeoJSON object without a type".into()))?;
    match kind {
        "FeatureCollection" => {
            for feature in json_array(value, "features")? {
                collect_geojson(feature, out)?;
            }
        }
        "Feature" => match value.get("geometry") {
            Some(Value::Null) | None => {}
            Some(geometry) => collect_geojson(geometry, out)?,
        },
        "GeometryCollection" => {
            for geometry in json_array(value, "geometries")? {
                collect_geojson(geometry, out)?;
            }
        }
        "Polygon" => {
            let coords = value
                .get("coordinates")
                .ok_or_else(|| ShadowError::Geometry("Polygon without coordinates".into()))?;
            out.push(geojson_polygon(coords)?);
        }
        "MultiPolygon" => {
            for coords in json_array(value, "coordinates")? {
                out.push(geojson_polygon(coords)?);
            }
        }
        other => {
            return Err(ShadowError::Geometry(format!(
                "unsupported AOI geometry type '{other}'"
            )))
        }
    }
    Ok(())
}

fn json_array<'a>(value: &'a Value, key: &str) -> Result<&'a Vec<Value>> {
    value
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| ShadowError::Geometry(format!("GeoJSON member '{key}' must be an array")))
}

fn geojson_polygon(coords: &Value) -> Result<Polygon<f64>> {
    let rings = coords
        .as_array()
        .ok_or_else(|| ShadowError::Geometry("polygon coordinates must be an array".into()))?;
    let mut parsed = rings.iter().map(geojson_ring).collect::<Result<Vec<_>>>()?;
    if parsed.is_empty() {
        return Err(ShadowError::Geometry("polygon has no rings".into()));
    }
    let exterior = parsed.remove(0);
    Ok(Polygon::new(exterior, parsed))
}

fn geojson_ring(ring: &Value) -> Result<LineString<f64>> {
    let positions = ring
        .as_array()
        .ok_or_else(|| ShadowError::Geometry("ring must be an array of positions".into()))?;
    positions
        .iter()
        .map(|pos| match pos.as_array().map(Vec::as_slice) {
            Some([x, y, ..]) => match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => Ok((x, y)),
                _ => Err(ShadowError::Geometry("non-numeric position".into())),
            },
            _ => Err(ShadowError::Geometry("position needs at least two numbers".into())),
        })
        .collect::<Result<Vec<_>>>()
        .map(LineString::from)
}
