//! Batch runner: every registered catchment over one rainfall series.
//!
//! Catchments whose calibration and initial state match exactly ("twins")
//! share one moisture run; each twin's flow is then scaled by its own area.
//! Distinct runs are spread across the compute task pool. Steps within a
//! run are always sequential.

use std::collections::BTreeMap;

use bevy::prelude::*;
use bevy::tasks::{ComputeTaskPool, TaskPool};

use crate::config::AmmConfig;
use crate::error::{AmmError, EngineError, ValidationError};
use crate::flow::{captured_run, flow_from_run, FlowSeries, InflowSink, OutletInflows};
use crate::rainfall::{conform, RainfallSeries, RawRainfall};
use crate::registry::{Catchment, CatchmentRegistry, TwinKey};

/// Outcome of one batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Completed series, sorted by catchment key.
    pub delivered: Vec<FlowSeries>,
    /// Catchments whose run aborted, sorted by catchment key.
    pub failures: Vec<EngineError>,
    /// Records the registry turned away before the run.
    pub rejected: Vec<ValidationError>,
    /// Moisture runs actually stepped (after twin sharing).
    pub moisture_runs: usize,
}

impl RunReport {
    /// True when every registered catchment delivered a series.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.rejected.is_empty()
    }

    pub fn series(&self, catchment: &str) -> Option<&FlowSeries> {
        self.delivered
            .binary_search_by(|s| s.catchment.as_str().cmp(catchment))
            .ok()
            .map(|i| &self.delivered[i])
    }

    /// Hand every delivered series to `sink`, in key order.
    pub fn deliver_to<S: InflowSink + ?Sized>(&self, sink: &mut S) {
        for series in &self.delivered {
            sink.deliver(series.clone());
        }
    }

    pub fn outlet_inflows(&self) -> OutletInflows {
        OutletInflows::from_series(&self.delivered)
    }
}

/// Validate `config`, conform `raw` to its grid, and run the batch.
///
/// A configuration, rainfall or temperature-record problem aborts the whole
/// run; engine failures only abort the catchment they occur in.
pub fn run(
    registry: &CatchmentRegistry,
    raw: &RawRainfall,
    config: &AmmConfig,
) -> Result<RunReport, AmmError> {
    config.validate()?;
    let rainfall = conform(raw, config)?;
    config
        .seasons
        .check_coverage(rainfall.start(), rainfall.step_seconds(), rainfall.len())?;
    Ok(run_batch(registry, &rainfall, config))
}

/// Run every catchment in `registry` over an already conformed series.
pub fn run_batch(
    registry: &CatchmentRegistry,
    rainfall: &RainfallSeries,
    config: &AmmConfig,
) -> RunReport {
    #[cfg(feature = "trace")]
    let _span = bevy::log::info_span!("run_batch").entered();

    let dry_starts = dry_starts(registry);
    if dry_starts > 0 && config.warm_up_seconds <= 0 {
        warn!(
            "{} catchment(s) start dry with no warm-up period; early flows will be underestimated",
            dry_starts
        );
    }

    let groups = twin_groups(registry);
    for group in groups.iter().filter(|g| g.len() > 1) {
        debug!(
            "Catchment {} shares its moisture run with {} twin(s)",
            group[0].key,
            group.len() - 1
        );
    }

    let pool = ComputeTaskPool::get_or_init(TaskPool::default);
    let results = pool.scope(|scope| {
        for group in &groups {
            scope.spawn(async move { run_group(group, rainfall, config) });
        }
    });

    let mut report = RunReport {
        rejected: registry.rejected().to_vec(),
        moisture_runs: groups.len(),
        ..Default::default()
    };
    for result in results.into_iter().flatten() {
        match result {
            Ok(series) => report.delivered.push(series),
            Err(err) => {
                warn!("{}", err);
                report.failures.push(err);
            }
        }
    }
    report
        .delivered
        .sort_by(|a, b| a.catchment.cmp(&b.catchment));
    report.failures.sort_by(|a, b| a.catchment.cmp(&b.catchment));

    info!(
        "Moisture accounting finished: {} delivered, {} failed, {} rejected ({} runs over {} steps)",
        report.delivered.len(),
        report.failures.len(),
        report.rejected.len(),
        report.moisture_runs,
        rainfall.len()
    );
    report
}

/// Catchments whose storage starts empty, whether by default or explicitly.
fn dry_starts(registry: &CatchmentRegistry) -> usize {
    registry.iter().filter(|c| c.initial_state() == 0.0).count()
}

/// Catchments grouped by twin key, in key order.
fn twin_groups(registry: &CatchmentRegistry) -> Vec<Vec<&Catchment>> {
    let mut groups: BTreeMap<TwinKey, Vec<&Catchment>> = BTreeMap::new();
    for catchment in registry.iter() {
        groups.entry(catchment.twin_key()).or_default().push(catchment);
    }
    groups.into_values().collect()
}

fn run_group(
    group: &[&Catchment],
    rainfall: &RainfallSeries,
    config: &AmmConfig,
) -> Vec<Result<FlowSeries, EngineError>> {
    let Some(lead) = group.first() else {
        return Vec::new();
    };
    match captured_run(lead, rainfall, &config.seasons) {
        Ok(run) => group
            .iter()
            .map(|c| flow_from_run(c, &run, rainfall, config))
            .collect(),
        Err(err) => group
            .iter()
            .map(|c| {
                Err(EngineError {
                    catchment: c.key.clone(),
                    ..err.clone()
                })
            })
            .collect(),
    }
}
