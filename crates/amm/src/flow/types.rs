use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::tracker::StepOutcome;

/// How much of a run is kept in each delivered series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputDetail {
    /// Flow values only.
    #[default]
    FlowOnly,
    /// Flow plus a [`StepRecord`] per step.
    Full,
}

/// Per-step diagnostics kept under [`OutputDetail::Full`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub rainfall: f64,
    pub fraction: f64,
    pub captured: f64,
    pub moisture: f64,
}

impl From<&StepOutcome> for StepRecord {
    fn from(o: &StepOutcome) -> Self {
        Self {
            rainfall: o.rainfall,
            fraction: o.fraction,
            captured: o.captured,
            moisture: o.moisture,
        }
    }
}

/// Infiltration inflow of one catchment, aligned 1:1 with the rainfall grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowSeries {
    pub catchment: String,
    pub outlet: Option<String>,
    pub start: NaiveDateTime,
    pub step_seconds: i64,
    /// Flow for each step, in host units.
    pub values: Vec<f64>,
    /// Index of the first step past warm-up.
    pub valid_from: usize,
    /// Moisture state after the last step.
    pub terminal_moisture: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Vec<StepRecord>>,
}

impl FlowSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn timestamp(&self, index: usize) -> NaiveDateTime {
        self.start + Duration::seconds(self.step_seconds * index as i64)
    }

    /// Values after warm-up.
    pub fn valid_values(&self) -> &[f64] {
        &self.values[self.valid_from.min(self.values.len())..]
    }

    /// Sum of all step values.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Time at which the first valid step begins.
    pub fn valid_start(&self) -> NaiveDateTime {
        self.timestamp(self.valid_from)
    }
}
