use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{Result, ShadowError};

pub const STEP_MINUTES: i64 = 15;

pub fn local_new_year(year: i32, tz: Tz) -> Result<DateTime<Tz>> {
    // zones that jumped over midnight on Jan 1 fall back to the first valid hour
    (0..3)
        .find_map(|hour| tz.with_ymd_and_hms(year, 1, 1, hour, 0, 0).earliest())
        .ok_or_else(|| {
            ShadowError::Configuration(format!("no local midnight for {year}-01-01 in {}", tz.name()))
        })
}

pub fn iso_timestamp(ts: &DateTime<Tz>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

pub fn date_key(ts: &DateTime<Tz>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

pub fn time_of_day(ts: &DateTime<Tz>) -> String {
    ts.format("%H:%M").to_string()
}

/// Fixed-cadence local instants from Jan 1 of `year` (inclusive) to Jan 1 of the next year (exclusive).
///
/// Steps are taken in absolute time, so a daylight-saving change shifts the
/// wall-clock labels but never drops or repeats an instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationClock {
    pub year: i32,
    pub timezone: Tz,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Duration,
}

impl SimulationClock {
    pub fn new(year: i32, timezone: Tz) -> Result<Self> {
        Self::with_step_minutes(year, timezone, STEP_MINUTES)
    }

    pub fn with_step_minutes(year: i32, timezone: Tz, step_minutes: i64) -> Result<Self> {
        if step_minutes <= 0 {
            return Err(ShadowError::Configuration(format!(
                "timestep must be positive, got {step_minutes} minutes"
            )));
        }
        let start = local_new_year(year, timezone)?.with_timezone(&Utc);
        let end = local_new_year(year + 1, timezone)?.with_timezone(&Utc);
        Ok(Self {
            year,
            timezone,
            start,
            end,
            step: Duration::minutes(step_minutes),
        })
    }

    pub fn start(&self) -> DateTime<Tz> {
        self.start.with_timezone(&self.timezone)
    }

    pub fn end(&self) -> DateTime<Tz> {
        self.end.with_timezone(&self.timezone)
    }

    pub fn total_steps(&self) -> usize {
        let span = (self.end - self.start).num_seconds();
        let step = self.step.num_seconds();
        (span / step).max(0) as usize
    }

    pub fn iter(&self) -> ClockIter {
        ClockIter {
            next: self.start,
            end: self.end,
            step: self.step,
            timezone: self.timezone,
        }
    }
}

impl IntoIterator for &SimulationClock {
    type Item = DateTime<Tz>;
    type IntoIter = ClockIter;

    fn into_iter(self) -> ClockIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct ClockIter {
    next: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Duration,
    timezone: Tz,
}

impl Iterator for ClockIter {
    type Item = DateTime<Tz>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let current = self.next;
        self.next = current + self.step;
        Some(current.with_timezone(&self.timezone))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.next).num_seconds().max(0);
        let step = self.step.num_seconds();
        let n = ((remaining + step - 1) / step) as usize;
        (n, Some(n))
    }
}
