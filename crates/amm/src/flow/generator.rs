use crate::capture::SeasonalDriver;
use crate::config::AmmConfig;
use crate::error::EngineError;
use crate::rainfall::RainfallSeries;
use crate::registry::Catchment;
use crate::tracker::{MoistureTracker, StepOutcome};

use super::types::{FlowSeries, OutputDetail, StepRecord};

/// Moisture run of one calibration over a rainfall series. Independent of
/// area, so twins can share it.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRun {
    pub outcomes: Vec<StepOutcome>,
    pub terminal_moisture: f64,
}

/// Step `catchment`'s moisture state through every rainfall step.
pub fn captured_run(
    catchment: &Catchment,
    rainfall: &RainfallSeries,
    seasons: &SeasonalDriver,
) -> Result<CapturedRun, EngineError> {
    let curve = catchment.calibration.curve;
    let mut tracker = MoistureTracker::new(
        catchment.calibration,
        catchment.initial_state(),
        rainfall.step_hours(),
    );
    let mut outcomes = Vec::with_capacity(rainfall.len());
    for (step, (when, rain)) in rainfall.iter().enumerate() {
        let coldness = seasons.coldness(when, &curve.seasonal);
        let outcome = tracker
            .step(rain, coldness)
            .map_err(|fault| fault.at(&catchment.key, step))?;
        outcomes.push(outcome);
    }
    Ok(CapturedRun {
        outcomes,
        terminal_moisture: tracker.state(),
    })
}

/// Scale a captured run by `catchment`'s area into a flow series.
pub fn flow_from_run(
    catchment: &Catchment,
    run: &CapturedRun,
    rainfall: &RainfallSeries,
    config: &AmmConfig,
) -> Result<FlowSeries, EngineError> {
    let scale = catchment.area * config.unit_conversion;
    let mut values = Vec::with_capacity(run.outcomes.len());
    for (step, outcome) in run.outcomes.iter().enumerate() {
        let flow = outcome.captured * scale;
        if !flow.is_finite() {
            return Err(EngineError {
                catchment: catchment.key.clone(),
                step,
                quantity: "flow",
                value: flow,
            });
        }
        values.push(flow);
    }

    let detail = match config.detail {
        OutputDetail::FlowOnly => None,
        OutputDetail::Full => Some(run.outcomes.iter().map(StepRecord::from).collect()),
    };

    Ok(FlowSeries {
        catchment: catchment.key.clone(),
        outlet: catchment.outlet.clone(),
        start: rainfall.start(),
        step_seconds: rainfall.step_seconds(),
        valid_from: config.warm_up_steps(rainfall.step_seconds(), rainfall.len()),
        terminal_moisture: run.terminal_moisture,
        values,
        detail,
    })
}

/// Run one catchment end to end. Nothing is returned unless every step
/// succeeds.
pub fn generate(
    catchment: &Catchment,
    rainfall: &RainfallSeries,
    config: &AmmConfig,
) -> Result<FlowSeries, EngineError> {
    let run = captured_run(catchment, rainfall, &config.seasons)?;
    flow_from_run(catchment, &run, rainfall, config)
}
