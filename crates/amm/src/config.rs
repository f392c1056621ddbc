use bevy::prelude::*;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::capture::SeasonalDriver;
use crate::error::ConfigError;
use crate::flow::OutputDetail;

/// Default calculation step: one hour.
pub const DEFAULT_STEP_SECONDS: i64 = 3600;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Run-wide settings, fixed when a run starts.
///
/// The simulation window is `[start, end)`. Step `n` covers
/// `[start + n * step, start + (n + 1) * step)`; the last step may run past
/// `end` when the window is not a whole number of steps.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmmConfig {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Calculation step length in seconds.
    pub step_seconds: i64,
    /// Single global factor applied to `captured depth * area`.
    pub unit_conversion: f64,
    /// Results before this much simulated time has elapsed are flagged as
    /// warm-up (see `FlowSeries::valid_from`).
    #[serde(default)]
    pub warm_up_seconds: i64,
    #[serde(default)]
    pub seasons: SeasonalDriver,
    #[serde(default)]
    pub detail: OutputDetail,
}

impl Default for AmmConfig {
    fn default() -> Self {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        Self {
            start,
            end: start + Duration::days(1),
            step_seconds: DEFAULT_STEP_SECONDS,
            unit_conversion: 1.0,
            warm_up_seconds: 0,
            seasons: SeasonalDriver::default(),
            detail: OutputDetail::default(),
        }
    }
}

impl AmmConfig {
    /// Set the simulation window and step length.
    pub fn with_window(mut self, start: NaiveDateTime, end: NaiveDateTime, step: Duration) -> Self {
        self.start = start;
        self.end = end;
        self.step_seconds = step.num_seconds();
        self
    }

    pub fn with_unit_conversion(mut self, factor: f64) -> Self {
        self.unit_conversion = factor;
        self
    }

    pub fn with_warm_up(mut self, warm_up: Duration) -> Self {
        self.warm_up_seconds = warm_up.num_seconds();
        self
    }

    pub fn with_seasons(mut self, seasons: SeasonalDriver) -> Self {
        self.seasons = seasons;
        self
    }

    pub fn with_detail(mut self, detail: OutputDetail) -> Self {
        self.detail = detail;
        self
    }

    /// Parse a configuration from JSON, then validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: AmmConfig = serde_json::from_str(json)
            .map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every setting before a run begins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.step_seconds <= 0 {
            return Err(ConfigError::NonPositiveStep {
                seconds: self.step_seconds,
            });
        }
        if self.end <= self.start {
            return Err(ConfigError::EmptyWindow);
        }
        let window_seconds = self.window_seconds();
        if self.step_seconds > window_seconds {
            return Err(ConfigError::StepExceedsWindow {
                step_seconds: self.step_seconds,
                window_seconds,
            });
        }
        if !self.unit_conversion.is_finite() || self.unit_conversion <= 0.0 {
            return Err(ConfigError::InvalidConversion(self.unit_conversion));
        }
        if self.warm_up_seconds < 0 {
            return Err(ConfigError::NegativeWarmUp {
                seconds: self.warm_up_seconds,
            });
        }
        self.seasons.validate()
    }

    pub fn step(&self) -> Duration {
        Duration::seconds(self.step_seconds)
    }

    pub fn step_hours(&self) -> f64 {
        self.step_seconds as f64 / SECONDS_PER_HOUR
    }

    fn window_seconds(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }

    /// Number of calculation steps covering `[start, end)`.
    pub fn step_count(&self) -> usize {
        steps_covering(self.window_seconds(), self.step_seconds)
    }

    /// Timestamp at which step `index` begins.
    pub fn step_start(&self, index: usize) -> NaiveDateTime {
        self.start + Duration::seconds(self.step_seconds * index as i64)
    }

    /// First index of a `steps`-long series of `step_seconds` steps whose
    /// results count as valid after warm-up. Saturates at `steps`.
    pub fn warm_up_steps(&self, step_seconds: i64, steps: usize) -> usize {
        steps_covering(self.warm_up_seconds, step_seconds).min(steps)
    }
}

/// Whole steps needed to cover `seconds`, rounding up. Zero when either
/// argument is not positive.
fn steps_covering(seconds: i64, step_seconds: i64) -> usize {
    if seconds <= 0 || step_seconds <= 0 {
        return 0;
    }
    let steps = (seconds as u64).div_ceil(step_seconds as u64);
    usize::try_from(steps).unwrap_or(usize::MAX)
}
