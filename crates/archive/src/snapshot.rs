//! Bitcode-encodable mirror of a run report.

use bitcode::{Decode, Encode};
use chrono::{DateTime, NaiveDateTime};

use amm::flow::{FlowSeries, StepRecord};
use amm::RunReport;

use crate::error::ArchiveError;

/// Bumped when the snapshot layout changes.
pub const SNAPSHOT_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct SeriesRecord {
    pub catchment: String,
    pub outlet: Option<String>,
    /// Unix seconds of the first step.
    pub start: i64,
    /// Sub-second part of the first step.
    pub start_nanos: u32,
    pub step_seconds: i64,
    pub values: Vec<f64>,
    pub valid_from: u32,
    pub terminal_moisture: f64,
    /// `[rainfall, fraction, captured, moisture]` per step.
    pub detail: Option<Vec<[f64; 4]>>,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct FailureRecord {
    pub catchment: String,
    pub step: u64,
    pub quantity: String,
    pub value: f64,
}

/// Everything kept from one run.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct RunArchive {
    pub version: u32,
    pub series: Vec<SeriesRecord>,
    pub failures: Vec<FailureRecord>,
    /// Rejected attribute records, as their error messages.
    pub rejected: Vec<String>,
}

impl SeriesRecord {
    pub fn from_series(series: &FlowSeries) -> Result<Self, ArchiveError> {
        let start = series.start.and_utc();
        let valid_from =
            u32::try_from(series.valid_from).map_err(|_| ArchiveError::FieldOverflow {
                field: "valid_from",
                value: series.valid_from as u64,
            })?;
        Ok(Self {
            catchment: series.catchment.clone(),
            outlet: series.outlet.clone(),
            start: start.timestamp(),
            start_nanos: start.timestamp_subsec_nanos(),
            step_seconds: series.step_seconds,
            values: series.values.clone(),
            valid_from,
            terminal_moisture: series.terminal_moisture,
            detail: series.detail.as_ref().map(|steps| {
                steps
                    .iter()
                    .map(|s| [s.rainfall, s.fraction, s.captured, s.moisture])
                    .collect()
            }),
        })
    }

    pub fn to_series(&self) -> Result<FlowSeries, ArchiveError> {
        Ok(FlowSeries {
            catchment: self.catchment.clone(),
            outlet: self.outlet.clone(),
            start: from_unix(self.start, self.start_nanos)?,
            step_seconds: self.step_seconds,
            values: self.values.clone(),
            valid_from: self.valid_from as usize,
            terminal_moisture: self.terminal_moisture,
            detail: self.detail.as_ref().map(|steps| {
                steps
                    .iter()
                    .map(|&[rainfall, fraction, captured, moisture]| StepRecord {
                        rainfall,
                        fraction,
                        captured,
                        moisture,
                    })
                    .collect()
            }),
        })
    }
}

fn from_unix(secs: i64, nanos: u32) -> Result<NaiveDateTime, ArchiveError> {
    DateTime::from_timestamp(secs, nanos)
        .map(|dt| dt.naive_utc())
        .ok_or(ArchiveError::InvalidTimestamp(secs))
}

impl RunArchive {
    pub fn from_report(report: &RunReport) -> Result<Self, ArchiveError> {
        Ok(Self {
            version: SNAPSHOT_VERSION,
            series: report
                .delivered
                .iter()
                .map(SeriesRecord::from_series)
                .collect::<Result<_, _>>()?,
            failures: report
                .failures
                .iter()
                .map(|f| FailureRecord {
                    catchment: f.catchment.clone(),
                    step: f.step as u64,
                    quantity: f.quantity.to_string(),
                    value: f.value,
                })
                .collect(),
            rejected: report.rejected.iter().map(|r| r.to_string()).collect(),
        })
    }

    /// Rebuild the delivered flow series.
    pub fn flow_series(&self) -> Result<Vec<FlowSeries>, ArchiveError> {
        self.series.iter().map(SeriesRecord::to_series).collect()
    }
}
