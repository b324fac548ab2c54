use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::types::{AnimationDocument, CalendarOutputs, HitRecord, SimulationResult};

pub const HIT_LOG_FILE: &str = "shadow_calendar.csv";
pub const ANIMATION_FILE: &str = "animation_data.json";
pub const HIT_LOG_HEADER: [&str; 6] = [
    "turbine_id",
    "timestamp_local",
    "date",
    "time",
    "sun_azimuth_deg",
    "sun_elevation_deg",
];

/// Header is written up front so an empty log still carries its columns.
pub fn write_hit_log<W: Write>(writer: W, hits: &[HitRecord]) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(HIT_LOG_HEADER)?;
    for hit in hits {
        csv.serialize(hit)?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_animation<W: Write>(writer: W, document: &AnimationDocument) -> Result<()> {
    serde_json::to_writer(writer, document)?;
    Ok(())
}

pub fn hit_log_csv(hits: &[HitRecord]) -> Result<String> {
    let mut buf = Vec::new();
    write_hit_log(&mut buf, hits)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn animation_json(document: &AnimationDocument) -> Result<String> {
    Ok(serde_json::to_string(document)?)
}

pub fn write_outputs(outputs_dir: &Path, result: &SimulationResult) -> Result<CalendarOutputs> {
    fs::create_dir_all(outputs_dir)?;
    let csv_path = outputs_dir.join(HIT_LOG_FILE);
    let animation_data_path = outputs_dir.join(ANIMATION_FILE);

    let mut csv_file = BufWriter::new(File::create(&csv_path)?);
    write_hit_log(&mut csv_file, &result.hits)?;
    csv_file.flush()?;

    let mut anim_file = BufWriter::new(File::create(&animation_data_path)?);
    write_animation(&mut anim_file, &result.animation)?;
    anim_file.flush()?;

    info!(
        csv = %csv_path.display(),
        animation = %animation_data_path.display(),
        rows = result.rows,
        "wrote shadow calendar outputs"
    );

    Ok(CalendarOutputs {
        csv_path,
        animation_data_path,
        computed_days: result.computed_days.clone(),
        rows: result.rows,
    })
}
