use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Utc};

use crate::config::{RunRequest, DEFAULT_TIMEZONE, DEFAULT_YEAR};
use crate::error::Result;
use crate::types::Turbine;

pub const DEMO_EPSG: u32 = 32633;
pub const DEMO_STEM: &str = "aoi_demo";
pub const DEMO_AOI_MIN: (f64, f64) = (500_000.0, 4_649_700.0);
pub const DEMO_AOI_MAX: (f64, f64) = (501_100.0, 4_650_400.0);

const UTM_33N_WKT: &str = concat!(
    r#"PROJCS["WGS 84 / UTM zone 33N",GEOGCS["WGS 84",DATUM["WGS_1984","#,
    r#"SPHEROID["WGS 84",6378137,298.257223563]],PRIMEM["Greenwich",0],"#,
    r#"UNIT["degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],"#,
    r#"PARAMETER["latitude_of_origin",0],PARAMETER["central_meridian",15],"#,
    r#"PARAMETER["scale_factor",0.9996],PARAMETER["false_easting",500000],"#,
    r#"PARAMETER["false_northing",0],UNIT["metre",1]]"#
);

pub fn demo_turbines() -> Vec<Turbine> {
    vec![
        Turbine::new("T1", 500_200.0, 4_649_800.0, 110.0, 140.0),
        Turbine::new("T2", 500_450.0, 4_649_850.0, 100.0, 130.0),
    ]
}

/// Clockwise, as shapefile shells are.
pub fn demo_ring() -> Vec<(f64, f64)> {
    let (x0, y0) = DEMO_AOI_MIN;
    let (x1, y1) = DEMO_AOI_MAX;
    vec![(x0, y0), (x0, y1), (x1, y1), (x1, y0), (x0, y0)]
}

/// Writes the demo AOI rectangle as a single-record polygon shapefile (.shp/.shx/.dbf/.prj).
pub fn write_demo_shapefile(out_dir: &Path, stem: &str) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)?;
    let pts = demo_ring();
    let (xmin, ymin) = DEMO_AOI_MIN;
    let (xmax, ymax) = DEMO_AOI_MAX;
    let bbox = [xmin, ymin, xmax, ymax];

    let mut content = Vec::new();
    content.extend(5i32.to_le_bytes());
    bbox.iter().for_each(|v| content.extend(v.to_le_bytes()));
    content.extend(1i32.to_le_bytes());
    content.extend((pts.len() as i32).to_le_bytes());
    content.extend(0i32.to_le_bytes());
    for (x, y) in &pts {
        content.extend(x.to_le_bytes());
        content.extend(y.to_le_bytes());
    }
    let content_words = (content.len() / 2) as i32;

    let header = |file_words: i32| {
        let mut h = Vec::with_capacity(100);
        h.extend(9994i32.to_be_bytes());
        h.extend([0u8; 20]);
        h.extend(file_words.to_be_bytes());
        h.extend(1000i32.to_le_bytes());
        h.extend(5i32.to_le_bytes());
        bbox.iter().for_each(|v| h.extend(v.to_le_bytes()));
        h.extend([0u8; 32]);
        h
    };

    let mut shp = header(50 + 4 + content_words);
    shp.extend(1i32.to_be_bytes());
    shp.extend(content_words.to_be_bytes());
    shp.extend(&content);
    let shp_path = out_dir.join(format!("{stem}.shp"));
    fs::write(&shp_path, shp)?;

    let mut shx = header(50 + 4);
    shx.extend(50i32.to_be_bytes());
    shx.extend(content_words.to_be_bytes());
    fs::write(out_dir.join(format!("{stem}.shx")), shx)?;

    let today = Utc::now().date_naive();
    let mut dbf = vec![
        3u8,
        (today.year() - 1900).clamp(0, 255) as u8,
        today.month() as u8,
        today.day() as u8,
    ];
    dbf.extend(1u32.to_le_bytes());
    dbf.extend(65u16.to_le_bytes());
    dbf.extend(6u16.to_le_bytes());
    dbf.extend([0u8; 20]);
    dbf.extend(*b"ID\0\0\0\0\0\0\0\0\0");
    dbf.push(b'N');
    dbf.extend([0u8; 4]);
    dbf.extend([5u8, 0u8]);
    dbf.extend([0u8; 14]);
    dbf.push(b'\r');
    dbf.extend(b"     1");
    fs::write(out_dir.join(format!("{stem}.dbf")), dbf)?;

    fs::write(out_dir.join(format!("{stem}.prj")), UTM_33N_WKT)?;
    Ok(shp_path)
}

pub fn demo_request(project_dir: &Path) -> Result<RunRequest> {
    let aoi_path = write_demo_shapefile(project_dir, DEMO_STEM)?;
    Ok(RunRequest {
        project_dir: project_dir.to_path_buf(),
        aoi_path,
        project_epsg: DEMO_EPSG,
        min_solar_elevation_deg: 0.0,
        year: DEFAULT_YEAR,
        timezone: DEFAULT_TIMEZONE.to_string(),
        turbines: demo_turbines(),
    })
}
