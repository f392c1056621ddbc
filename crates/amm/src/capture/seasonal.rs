use std::f64::consts::TAU;

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SeriesError};
use crate::rainfall::{interpolate, sample_to_grid, validate_instantaneous, Observation};

/// Mean Gregorian year length in days. Seasonal phase is measured against
/// this so the cycle never restarts at a calendar boundary.
pub const MEAN_YEAR_DAYS: f64 = 365.2425;

/// Unix timestamp of 2000-01-01T00:00:00, the phase origin.
const PHASE_EPOCH_SECONDS: i64 = 946_684_800;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Logistic slope numerator: places the cold and hot reference temperatures
/// at 11/12 and 1/12 of the sigmoid.
const SIGMOID_SLOPE: f64 = 4.7964;

/// The sigmoid is stretched by this much so the reference temperatures land
/// exactly on 1 and 0 after rescaling.
const SIGMOID_STRETCH: f64 = 1.2;

/// Cumulative days before each month in a common year.
const MONTH_OFFSETS: [u32; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];
const MONTH_LENGTHS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Per-catchment seasonal calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonalCoefficients {
    /// Season multiplier at the peak of the cold season, in [0, 1].
    pub cold_factor: f64,
    /// Season multiplier at the peak of the hot season, in [0, 1].
    pub hot_factor: f64,
    /// Day of year (1-based, may be fractional) of peak cold-season response.
    /// Only used by [`SeasonalDriver::Calendar`].
    pub coldest_day: f64,
}

impl SeasonalCoefficients {
    /// Blend hot and cold factors by `coldness` in [0, 1].
    #[inline]
    pub fn factor(&self, coldness: f64) -> f64 {
        self.hot_factor + (self.cold_factor - self.hot_factor) * coldness
    }
}

/// Monthly normal temperatures plus the two reference temperatures that
/// anchor the hot and cold ends of the seasonal response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSeasons {
    /// Average temperature for January through December, anchored mid-month.
    pub monthly_normals: [f64; 12],
    /// At or below this temperature the cold factor applies in full.
    pub cold_temp: f64,
    /// At or above this temperature the hot factor applies in full.
    pub hot_temp: f64,
}

impl TemperatureSeasons {
    /// Temperature on a date, linearly interpolated between mid-month
    /// normals. December wraps to January so there is no seam at New Year.
    pub fn temperature_at(&self, when: NaiveDateTime) -> f64 {
        let year = when.year();
        let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
        let year_len = if leap { 366.0 } else { 365.0 };
        let day = when.ordinal0() as f64 + when.num_seconds_from_midnight() as f64 / SECONDS_PER_DAY;

        let mut mids = [0.0_f64; 12];
        for (m, mid) in mids.iter_mut().enumerate() {
            let extra = if leap && m >= 2 { 1 } else { 0 };
            let len = MONTH_LENGTHS[m] + if leap && m == 1 { 1 } else { 0 };
            *mid = (MONTH_OFFSETS[m] + extra) as f64 + len as f64 / 2.0;
        }

        let normals = &self.monthly_normals;
        let (x0, y0, x1, y1) = if day < mids[0] {
            (mids[11] - year_len, normals[11], mids[0], normals[0])
        } else if day >= mids[11] {
            (mids[11], normals[11], mids[0] + year_len, normals[0])
        } else {
            let m = mids.iter().rposition(|&mid| mid <= day).unwrap_or(0);
            (mids[m], normals[m], mids[m + 1], normals[m + 1])
        };
        y0 + (y1 - y0) * (day - x0) / (x1 - x0)
    }

    /// Coldness in [0, 1] for a temperature: 1 at or below `cold_temp`,
    /// 0 at or above `hot_temp`, logistic in between.
    pub fn coldness_at_temperature(&self, temp: f64) -> f64 {
        sigmoid_coldness(temp, self.cold_temp, self.hot_temp)
    }
}

/// Observed air temperatures, e.g. a historical gauge record, with the same
/// reference temperatures as [`TemperatureSeasons`]. Readings are
/// instantaneous and interpolated linearly between observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedTemperatures {
    pub observations: Vec<Observation>,
    pub cold_temp: f64,
    pub hot_temp: f64,
}

impl ObservedTemperatures {
    pub fn new(cold_temp: f64, hot_temp: f64) -> Self {
        Self {
            observations: Vec::new(),
            cold_temp,
            hot_temp,
        }
    }

    /// Builder-style append.
    pub fn with(mut self, timestamp: NaiveDateTime, temp: f64) -> Self {
        self.observations.push(Observation {
            timestamp,
            value: temp,
        });
        self
    }

    /// Temperature at `when`. `None` outside the record.
    pub fn temperature_at(&self, when: NaiveDateTime) -> Option<f64> {
        interpolate(&self.observations, when)
    }

    pub fn coldness_at_temperature(&self, temp: f64) -> f64 {
        sigmoid_coldness(temp, self.cold_temp, self.hot_temp)
    }

    /// Temperatures at the start of each of `steps` steps. Fails unless the
    /// record spans the whole grid.
    pub fn conform_to_grid(
        &self,
        start: NaiveDateTime,
        step_seconds: i64,
        steps: usize,
    ) -> Result<Vec<f64>, SeriesError> {
        sample_to_grid(&self.observations, start, step_seconds, steps)
    }
}

fn sigmoid_coldness(temp: f64, cold_temp: f64, hot_temp: f64) -> f64 {
    let midpoint = (cold_temp + hot_temp) / 2.0;
    let slope = SIGMOID_SLOPE / (cold_temp - hot_temp);
    let sigmoid = 1.0 / (1.0 + (-slope * (temp - midpoint)).exp());
    (SIGMOID_STRETCH * sigmoid - (SIGMOID_STRETCH - 1.0) / 2.0).clamp(0.0, 1.0)
}

fn check_references(cold_temp: f64, hot_temp: f64) -> Result<(), ConfigError> {
    if !cold_temp.is_finite() || !hot_temp.is_finite() {
        return Err(ConfigError::InvalidTemperatureDriver(
            "reference temperatures must be finite".to_string(),
        ));
    }
    if cold_temp >= hot_temp {
        return Err(ConfigError::InvalidTemperatureDriver(format!(
            "cold reference {cold_temp} must be below hot reference {hot_temp}"
        )));
    }
    Ok(())
}

/// What drives the cold/hot seasonal swing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum SeasonalDriver {
    /// Cosine of the date, peaking on each catchment's `coldest_day`.
    #[default]
    Calendar,
    /// Logistic response to interpolated monthly normal temperatures.
    Temperature(TemperatureSeasons),
    /// Logistic response to an observed temperature record. The record must
    /// span the whole run.
    TemperatureSeries(ObservedTemperatures),
}

impl SeasonalDriver {
    /// Coldness in [0, 1] for a catchment at an instant. NaN when an
    /// observed temperature record does not reach `when`.
    pub fn coldness(&self, when: NaiveDateTime, coeffs: &SeasonalCoefficients) -> f64 {
        match self {
            SeasonalDriver::Calendar => calendar_coldness(when, coeffs.coldest_day),
            SeasonalDriver::Temperature(seasons) => {
                seasons.coldness_at_temperature(seasons.temperature_at(when))
            }
            SeasonalDriver::TemperatureSeries(observed) => observed
                .temperature_at(when)
                .map_or(f64::NAN, |temp| observed.coldness_at_temperature(temp)),
        }
    }

    /// Make sure the driver has a value for every step of a grid.
    pub fn check_coverage(
        &self,
        start: NaiveDateTime,
        step_seconds: i64,
        steps: usize,
    ) -> Result<(), SeriesError> {
        match self {
            SeasonalDriver::TemperatureSeries(observed) => observed
                .conform_to_grid(start, step_seconds, steps)
                .map(|_| ()),
            SeasonalDriver::Calendar | SeasonalDriver::Temperature(_) => Ok(()),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        match self {
            SeasonalDriver::Calendar => Ok(()),
            SeasonalDriver::Temperature(seasons) => {
                if let Some(month) = seasons.monthly_normals.iter().position(|t| !t.is_finite()) {
                    return Err(ConfigError::InvalidTemperatureDriver(format!(
                        "normal temperature for month {} is not finite",
                        month + 1
                    )));
                }
                check_references(seasons.cold_temp, seasons.hot_temp)
            }
            SeasonalDriver::TemperatureSeries(observed) => {
                check_references(observed.cold_temp, observed.hot_temp)?;
                validate_instantaneous(&observed.observations).map_err(|e| {
                    ConfigError::InvalidTemperatureDriver(format!("temperature record: {e}"))
                })
            }
        }
    }
}

/// Continuous days since the phase epoch.
fn days_since_epoch(when: NaiveDateTime) -> f64 {
    (when.and_utc().timestamp() - PHASE_EPOCH_SECONDS) as f64 / SECONDS_PER_DAY
}

/// `0.5 * (1 + cos(phase))`, 1 on `coldest_day` and 0 half a year later.
pub(crate) fn calendar_coldness(when: NaiveDateTime, coldest_day: f64) -> f64 {
    let phase = TAU * (days_since_epoch(when) - (coldest_day - 1.0)) / MEAN_YEAR_DAYS;
    (0.5 * (1.0 + phase.cos())).clamp(0.0, 1.0)
}
