use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use shadow_calendar::{demo, parse_timezone, JobStatus, JobStore, RunRequest};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shadow-calendar", version, about = "Wind turbine shadow calendar over an area of interest")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a calendar from a JSON or TOML run request
    Run {
        #[arg(long)]
        request: PathBuf,
        #[arg(long)]
        min_elevation: Option<f64>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        timezone: Option<String>,
    },
    /// Generate the demo AOI and run the two-turbine fixture
    Demo {
        #[arg(long, default_value = "demo")]
        out: PathBuf,
        #[arg(long)]
        year: Option<i32>,
    },
}

fn build_request(command: Command) -> Result<RunRequest> {
    match command {
        Command::Run {
            request,
            min_elevation,
            year,
            timezone,
        } => {
            let mut req = RunRequest::from_path(&request)
                .with_context(|| format!("reading run request '{}'", request.display()))?;
            if let Some(min) = min_elevation {
                req.min_solar_elevation_deg = min;
            }
            if let Some(year) = year {
                req.year = year;
            }
            if let Some(tz) = timezone {
                parse_timezone(&tz)?;
                req.timezone = tz;
            }
            Ok(req)
        }
        Command::Demo { out, year } => {
            let mut req = demo::demo_request(&out)
                .with_context(|| format!("writing demo AOI under '{}'", out.display()))?;
            if let Some(year) = year {
                req.year = year;
            }
            Ok(req)
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let request = build_request(cli.command)?;
    info!(
        aoi = %request.aoi_path.display(),
        turbines = request.turbines.len(),
        year = request.year,
        "submitting calendar run"
    );

    let store = JobStore::new();
    let id = store.submit(request)?;
    let snapshot = store.wait(id).context("job disappeared from the store")?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    if snapshot.status == JobStatus::Error {
        bail!(
            "calendar run failed: {}",
            snapshot.error.unwrap_or_else(|| "unknown error".into())
        );
    }
    Ok(())
}
