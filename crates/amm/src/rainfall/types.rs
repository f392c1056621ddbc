use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::SeriesError;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// How a gauge reports its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RainFormat {
    /// Depth that fell during `[t, t + recording_interval)`.
    #[default]
    Volume,
    /// Depth per hour over `[t, t + recording_interval)`.
    Intensity,
    /// Running total at instant `t`.
    Cumulative,
}

/// One gauge reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// Gauge record exactly as the host's time-series store supplies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRainfall {
    pub format: RainFormat,
    /// Gauge recording interval in seconds; each volume or intensity reading
    /// spans this long unless the next reading starts sooner.
    pub recording_interval_seconds: i64,
    pub observations: Vec<Observation>,
}

impl RawRainfall {
    pub fn new(format: RainFormat, recording_interval: Duration) -> Self {
        Self {
            format,
            recording_interval_seconds: recording_interval.num_seconds(),
            observations: Vec::new(),
        }
    }

    /// Builder-style append.
    pub fn with(mut self, timestamp: NaiveDateTime, value: f64) -> Self {
        self.push(timestamp, value);
        self
    }

    pub fn push(&mut self, timestamp: NaiveDateTime, value: f64) {
        self.observations.push(Observation { timestamp, value });
    }

    /// Reject empty, unordered, negative or non-finite records.
    pub fn validate(&self) -> Result<(), SeriesError> {
        if self.observations.is_empty() {
            return Err(SeriesError::Empty);
        }
        if self.recording_interval_seconds <= 0 {
            return Err(SeriesError::InvalidInterval {
                seconds: self.recording_interval_seconds,
            });
        }
        let mut previous: Option<&Observation> = None;
        for (index, obs) in self.observations.iter().enumerate() {
            if !obs.value.is_finite() || obs.value < 0.0 {
                return Err(SeriesError::InvalidValue {
                    index,
                    value: obs.value,
                });
            }
            if let Some(prev) = previous {
                if obs.timestamp <= prev.timestamp {
                    return Err(SeriesError::NonMonotonic { index });
                }
                if self.format == RainFormat::Cumulative && obs.value < prev.value {
                    return Err(SeriesError::CumulativeDecrease {
                        index,
                        previous: prev.value,
                        value: obs.value,
                    });
                }
            }
            previous = Some(obs);
        }
        Ok(())
    }
}

/// Uniform-step rainfall depths. Step `i` covers
/// `[start + i * step, start + (i + 1) * step)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainfallSeries {
    start: NaiveDateTime,
    step_seconds: i64,
    depths: Vec<f64>,
}

impl RainfallSeries {
    /// Wrap depths that are already on a uniform grid.
    pub fn from_depths(
        start: NaiveDateTime,
        step: Duration,
        depths: Vec<f64>,
    ) -> Result<Self, SeriesError> {
        if depths.is_empty() {
            return Err(SeriesError::Empty);
        }
        let step_seconds = step.num_seconds();
        if step_seconds <= 0 {
            return Err(SeriesError::InvalidInterval {
                seconds: step_seconds,
            });
        }
        if let Some(index) = depths.iter().position(|d| !d.is_finite() || *d < 0.0) {
            return Err(SeriesError::InvalidValue {
                index,
                value: depths[index],
            });
        }
        Ok(Self {
            start,
            step_seconds,
            depths,
        })
    }

    pub(crate) fn from_parts(start: NaiveDateTime, step_seconds: i64, depths: Vec<f64>) -> Self {
        Self {
            start,
            step_seconds,
            depths,
        }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn step_seconds(&self) -> i64 {
        self.step_seconds
    }

    pub fn step_hours(&self) -> f64 {
        self.step_seconds as f64 / SECONDS_PER_HOUR
    }

    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    pub fn depths(&self) -> &[f64] {
        &self.depths
    }

    /// Start of step `index`.
    pub fn timestamp(&self, index: usize) -> NaiveDateTime {
        self.start + Duration::seconds(self.step_seconds * index as i64)
    }

    /// Total depth over the whole series.
    pub fn total(&self) -> f64 {
        self.depths.iter().sum()
    }

    /// `(step start, depth)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.depths
            .iter()
            .enumerate()
            .map(|(i, &d)| (self.timestamp(i), d))
    }
}
