use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::thread;

use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::{RunRequest, MAX_TURBINES};
use crate::engine::{run_calendar, Progress};
use crate::error::{self, ShadowError};
use crate::types::CalendarOutputs;

pub type JobId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Done,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSnapshot {
    pub id: JobId,
    pub status: JobStatus,
    pub progress_pct: u8,
    pub progress_message: String,
    pub logs: Vec<String>,
    pub outputs: Option<CalendarOutputs>,
    pub error: Option<String>,
    pub computed_days: Vec<String>,
}

impl JobSnapshot {
    fn queued(id: JobId) -> Self {
        Self {
            id,
            status: JobStatus::Running,
            progress_pct: 0,
            progress_message: "Queued".to_string(),
            logs: Vec::new(),
            outputs: None,
            error: None,
            computed_days: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Csv,
    Animation,
}

impl FromStr for OutputKind {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(OutputKind::Csv),
            "animation" => Ok(OutputKind::Animation),
            other => Err(JobError::BadKind(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error("job not found")]
    NotFound(JobId),

    #[error("kind must be csv|animation, got '{0}'")]
    BadKind(String),

    #[error("file missing")]
    FileMissing,

    #[error("run rejected: {0}")]
    Rejected(#[from] ShadowError),
}

#[derive(Default)]
struct Inner {
    jobs: Mutex<HashMap<JobId, JobSnapshot>>,
    finished: Condvar,
}

/// Thread-safe registry of calendar runs; each submitted run executes on its own worker thread.
#[derive(Clone, Default)]
pub struct JobStore {
    inner: Arc<Inner>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&self, request: RunRequest) -> Result<JobId, JobError> {
        self.submit_with(request, run_calendar)
    }

    /// Like [`JobStore::submit`] but executes `runner` in place of the full calendar pipeline.
    pub fn submit_with<F>(&self, request: RunRequest, runner: F) -> Result<JobId, JobError>
    where
        F: FnOnce(&RunRequest, Progress<'_>) -> error::Result<CalendarOutputs> + Send + 'static,
    {
        if request.turbines.len() > MAX_TURBINES {
            return Err(ShadowError::Data(format!("max {MAX_TURBINES} turbines")).into());
        }
        let id = Uuid::new_v4();
        self.inner.jobs.lock().insert(id, JobSnapshot::queued(id));

        let store = self.clone();
        let spawned = thread::Builder::new()
            .name(format!("shadow-job-{id}"))
            .spawn(move || store.execute(id, request, runner));
        if let Err(e) = spawned {
            self.inner.jobs.lock().remove(&id);
            return Err(ShadowError::Io(e).into());
        }
        info!(%id, "calendar job submitted");
        Ok(id)
    }

    fn update(&self, id: JobId, f: impl FnOnce(&mut JobSnapshot)) {
        if let Some(job) = self.inner.jobs.lock().get_mut(&id) {
            f(job);
        }
    }

    fn execute<F>(&self, id: JobId, request: RunRequest, runner: F)
    where
        F: FnOnce(&RunRequest, Progress<'_>) -> error::Result<CalendarOutputs>,
    {
        let mut on_progress = |pct: u8, message: &str| {
            self.update(id, |job| {
                job.progress_pct = pct;
                job.progress_message = message.to_string();
                job.logs.push(message.to_string());
            });
        };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            runner(&request, Some(&mut on_progress)).map_err(|e| e.to_string())
        }))
        .unwrap_or_else(|payload| Err(format!("calendar run panicked: {}", panic_message(&*payload))));

        match &outcome {
            Ok(out) => info!(%id, rows = out.rows, "calendar job done"),
            Err(e) => error!(%id, error = %e, "calendar job failed"),
        }
        self.update(id, move |job| match outcome {
            Ok(out) => {
                job.status = JobStatus::Done;
                job.computed_days = out.computed_days.clone();
                job.outputs = Some(out);
            }
            Err(e) => {
                job.status = JobStatus::Error;
                job.logs.push(e.clone());
                job.error = Some(e);
            }
        });
        self.inner.finished.notify_all();
    }

    pub fn status(&self, id: JobId) -> Option<JobSnapshot> {
        self.inner.jobs.lock().get(&id).cloned()
    }

    /// Blocks until the job is no longer running.
    pub fn wait(&self, id: JobId) -> Option<JobSnapshot> {
        let mut jobs = self.inner.jobs.lock();
        loop {
            let status = jobs.get(&id)?.status;
            if status != JobStatus::Running {
                return jobs.get(&id).cloned();
            }
            self.inner.finished.wait(&mut jobs);
        }
    }

    pub fn output_path(&self, id: JobId, kind: &str) -> Result<PathBuf, JobError> {
        let job = self.status(id).ok_or(JobError::NotFound(id))?;
        let kind: OutputKind = kind.parse()?;
        let outputs = job.outputs.ok_or(JobError::FileMissing)?;
        let path = match kind {
            OutputKind::Csv => outputs.csv_path,
            OutputKind::Animation => outputs.animation_data_path,
        };
        if path.exists() {
            Ok(path)
        } else {
            Err(JobError::FileMissing)
        }
    }

    pub fn len(&self) -> usize {
        self.inner.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
