use std::collections::BTreeMap;
use std::fs;

use serde_json::Value;

use shadow_calendar::output::*;
use shadow_calendar::types::{
    AnimationDocument, AnimationMeta, DayBucket, HitRecord, SimulationResult, SunState,
    TimestepFrame, TurbineShadow,
};

fn hit(id: &str, az: f64, el: f64) -> HitRecord {
    HitRecord {
        turbine_id: id.to_string(),
        timestamp_local: "2025-06-21T07:15:00+02:00".to_string(),
        date: "2025-06-21".to_string(),
        time: "07:15".to_string(),
        sun_azimuth_deg: az,
        sun_elevation_deg: el,
    }
}

fn document() -> AnimationDocument {
    let mut timesteps = BTreeMap::new();
    timesteps.insert(
        "2025-06-21T07:15:00+02:00".to_string(),
        TimestepFrame {
            sun: SunState { azimuth_deg: 75.5, elevation_deg: 18.25 },
            turbines: vec![TurbineShadow {
                turbine_id: "T1".to_string(),
                center: [500_100.5, 4_649_790.25],
                major_m: 447.0,
                minor_m: 140.0,
                rotation_deg: 165.5,
                intersects_aoi: true,
            }],
        },
    );
    let mut days = BTreeMap::new();
    days.insert("2025-06-21".to_string(), DayBucket { timesteps, has_hit: true });
    AnimationDocument {
        meta: AnimationMeta {
            year: 2025,
            min_solar_elevation_deg: 0.0,
            project_epsg: 32633,
        },
        days,
    }
}

// ── Hit log ──

#[test]
fn test_header_only_when_empty() {
    let csv = hit_log_csv(&[]).unwrap();
    assert_eq!(csv, format!("{}\n", HIT_LOG_HEADER.join(",")));
}

#[test]
fn test_rows_in_insertion_order() {
    let hits = vec![hit("T2", 75.12345, 18.5), hit("T1", 75.12345, 18.5)];
    let csv = hit_log_csv(&hits).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "turbine_id,timestamp_local,date,time,sun_azimuth_deg,sun_elevation_deg"
    );
    assert_eq!(lines[1], "T2,2025-06-21T07:15:00+02:00,2025-06-21,07:15,75.12345,18.5");
    assert!(lines[2].starts_with("T1,"));
}

#[test]
fn test_hit_log_reads_back() {
    let hits = vec![hit("T1", 100.0, 10.00001), hit("T2", 359.99999, 0.5)];
    let csv = hit_log_csv(&hits).unwrap();
    let mut reader = csv::Reader::from_reader(csv.as_bytes());
    let back: Vec<HitRecord> = reader.deserialize().collect::<Result<_, _>>().unwrap();
    assert_eq!(back, hits);
}

// ── Animation document ──

#[test]
fn test_animation_document_shape() {
    let json: Value = serde_json::from_str(&animation_json(&document()).unwrap()).unwrap();
    assert_eq!(json["meta"]["year"], 2025);
    assert_eq!(json["meta"]["min_solar_elevation_deg"], 0.0);
    assert_eq!(json["meta"]["project_epsg"], 32633);

    let day = &json["days"]["2025-06-21"];
    assert_eq!(day["has_hit"], true);
    let frame = &day["timesteps"]["2025-06-21T07:15:00+02:00"];
    assert_eq!(frame["sun"]["azimuth_deg"], 75.5);
    assert_eq!(frame["sun"]["elevation_deg"], 18.25);
    let t = &frame["turbines"][0];
    assert_eq!(t["turbine_id"], "T1");
    assert_eq!(t["center"][0], 500_100.5);
    assert_eq!(t["center"][1], 4_649_790.25);
    assert_eq!(t["major_m"], 447.0);
    assert_eq!(t["minor_m"], 140.0);
    assert_eq!(t["rotation_deg"], 165.5);
    assert_eq!(t["intersects_aoi"], true);
}

#[test]
fn test_animation_roundtrips_through_serde() {
    let doc = document();
    let back: AnimationDocument = serde_json::from_str(&animation_json(&doc).unwrap()).unwrap();
    assert_eq!(back, doc);
}

// ── Files ──

#[test]
fn test_write_outputs_creates_both_files() {
    let dir = tempfile::tempdir().unwrap();
    let outputs = dir.path().join("outputs");
    let result = SimulationResult {
        hits: vec![hit("T1", 75.5, 18.25)],
        animation: document(),
        computed_days: vec!["2025-06-21".to_string()],
        rows: 1,
    };
    let written = write_outputs(&outputs, &result).unwrap();
    assert_eq!(written.csv_path, outputs.join(HIT_LOG_FILE));
    assert_eq!(written.animation_data_path, outputs.join(ANIMATION_FILE));
    assert_eq!(written.computed_days, result.computed_days);
    assert_eq!(written.rows, 1);

    let csv = fs::read_to_string(&written.csv_path).unwrap();
    assert_eq!(csv, hit_log_csv(&result.hits).unwrap());
    let json = fs::read_to_string(&written.animation_data_path).unwrap();
    assert_eq!(json, animation_json(&result.animation).unwrap());
}

#[test]
fn test_unwritable_output_dir_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    fs::write(&blocker, b"x").unwrap();
    let result = SimulationResult {
        hits: vec![],
        animation: document(),
        computed_days: vec![],
        rows: 0,
    };
    let err = write_outputs(&blocker.join("outputs"), &result).unwrap_err();
    assert!(matches!(err, shadow_calendar::ShadowError::Io(_)));
}
