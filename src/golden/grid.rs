//! Deterministic time grids.
//!
//! The reference datasets sample a fixed interval of UTC days around a reference date:
//!
//! ```text
//! start = max(reference − 365·years_range days, earliest)
//! end   = min(reference + 365·years_range days, latest)
//! grid  = start, start + step, start + 2·step, ...  while ≤ end
//! ```
//!
//! Days are counted in 86400 s (no leap seconds), as civil date arithmetic does.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    constants::JulianDate,
    skycheck_errors::SkycheckError,
    time::{calendar_to_jd_utc, TimeScales},
};

/// A UTC calendar date at midnight, written `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl CalendarDate {
    pub const fn new(year: i32, month: u8, day: u8) -> Self {
        CalendarDate { year, month, day }
    }

    /// UTC Julian Date of midnight.
    pub fn jd_utc(&self) -> JulianDate {
        calendar_to_jd_utc(self.year, self.month, self.day, 0, 0, 0)
    }
}

impl FromStr for CalendarDate {
    type Err = SkycheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SkycheckError::InvalidTimeFormat(format!("expected YYYY-MM-DD, got '{s}'"));
        let mut parts = s.trim().splitn(3, '-');
        let (Some(y), Some(m), Some(d)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u8 = m.parse().map_err(|_| invalid())?;
        let day: u8 = d.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(invalid());
        }
        Ok(CalendarDate { year, month, day })
    }
}

impl TryFrom<String> for CalendarDate {
    type Error = SkycheckError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CalendarDate> for String {
    fn from(date: CalendarDate) -> Self {
        date.to_string()
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// `[grid]` section of the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    pub reference: CalendarDate,
    pub years_range: u32,
    pub step_days: f64,
    pub earliest: CalendarDate,
    pub latest: CalendarDate,
    /// Number of instants handed to one worker between cancellation checks.
    pub chunk_size: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            reference: CalendarDate::new(2025, 1, 1),
            years_range: 200,
            step_days: 30.0,
            earliest: CalendarDate::new(1850, 1, 1),
            latest: CalendarDate::new(2149, 12, 31),
            chunk_size: 256,
        }
    }
}

/// UTC Julian Dates of the sampled instants, increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    jd_utc: Vec<JulianDate>,
}

impl TimeGrid {
    /// Build the grid described by a [`GridConfig`].
    ///
    /// Return
    /// ----------
    /// * [`SkycheckError::InvalidStep`] for a non-positive step,
    ///   [`SkycheckError::InvalidRange`] when the clamp window leaves nothing to sample.
    pub fn from_config(config: &GridConfig) -> Result<Self, SkycheckError> {
        let reference = config.reference.jd_utc();
        let half_span = 365.0 * config.years_range as f64;
        let start = (reference - half_span).max(config.earliest.jd_utc());
        let end = (reference + half_span).min(config.latest.jd_utc());
        TimeGrid::uniform(start, end, config.step_days)
    }

    /// `start, start + step, ...` up to and including `end`.
    pub fn uniform(start: JulianDate, end: JulianDate, step: f64) -> Result<Self, SkycheckError> {
        if !(step > 0.0) {
            return Err(SkycheckError::InvalidStep(step));
        }
        if !(start <= end) {
            return Err(SkycheckError::InvalidRange { start, end });
        }
        let n = ((end - start) / step + 1e-9).floor() as usize + 1;
        Ok(TimeGrid {
            jd_utc: (0..n).map(|i| start + i as f64 * step).collect(),
        })
    }

    pub fn from_jds(jd_utc: Vec<JulianDate>) -> Self {
        TimeGrid { jd_utc }
    }

    pub fn len(&self) -> usize {
        self.jd_utc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jd_utc.is_empty()
    }

    pub fn jd_utc(&self) -> &[JulianDate] {
        &self.jd_utc
    }

    /// Drop the instants whose TDB falls outside `coverage`.
    ///
    /// Return
    /// ----------
    /// * The trimmed grid, or [`SkycheckError::OutOfRangeTime`] for the first instant when
    ///   no instant is left.
    /// * Any time-table error raised while converting an instant to TDB (only possible
    ///   under [`TablePolicy::Strict`](crate::time::TablePolicy::Strict)).
    pub fn clamp_to_coverage(
        self,
        coverage: (JulianDate, JulianDate),
        scales: &TimeScales,
    ) -> Result<Self, SkycheckError> {
        let (lo, hi) = coverage;
        let total = self.jd_utc.len();
        let first = self.jd_utc.first().copied();
        let mut kept = Vec::with_capacity(total);
        for jd in self.jd_utc {
            if (lo..=hi).contains(&scales.instant(jd)?.tdb()) {
                kept.push(jd);
            }
        }

        if kept.is_empty() {
            return Err(SkycheckError::OutOfRangeTime {
                jd: first.unwrap_or(f64::NAN),
                start: lo,
                end: hi,
                source_name: "ephemeris",
            });
        }
        if kept.len() < total {
            warn!(
                dropped = total - kept.len(),
                "time grid trimmed to the ephemeris coverage"
            );
        }
        Ok(TimeGrid { jd_utc: kept })
    }
}
