//! Bevy integration: resources, events and the system that runs a batch
//! when the host asks for one.

use bevy::prelude::*;

use crate::config::AmmConfig;
use crate::error::{AmmError, EngineError};
use crate::flow::FlowSeries;
use crate::rainfall::RawRainfall;
use crate::registry::CatchmentRegistry;
use crate::run::{run, RunReport};

/// Rainfall record the next run will use.
#[derive(Resource, Debug, Clone, Default)]
pub struct RainfallInput {
    pub raw: Option<RawRainfall>,
}

/// Result of the most recent run request.
#[derive(Resource, Debug, Clone, Default)]
pub struct LastRunReport {
    pub report: Option<RunReport>,
    /// Set when the whole run was refused (bad config or rainfall).
    pub error: Option<AmmError>,
    /// Requests processed since startup.
    pub runs: u32,
}

/// Ask for a batch run with the current resources.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RunRequested;

/// A catchment finished and its series is ready for the host.
#[derive(Event, Debug, Clone)]
pub struct FlowSeriesReady {
    pub series: FlowSeries,
}

/// A catchment's run aborted part-way.
#[derive(Event, Debug, Clone)]
pub struct CatchmentFailed {
    pub error: EngineError,
}

/// Run every registered catchment once per batch of `RunRequested` events.
pub fn run_moisture_accounting(
    mut requests: EventReader<RunRequested>,
    config: Res<AmmConfig>,
    registry: Res<CatchmentRegistry>,
    rainfall: Res<RainfallInput>,
    mut last: ResMut<LastRunReport>,
    mut ready: EventWriter<FlowSeriesReady>,
    mut failed: EventWriter<CatchmentFailed>,
) {
    if requests.read().count() == 0 {
        return;
    }
    last.runs += 1;

    let Some(raw) = rainfall.raw.as_ref() else {
        warn!("Moisture accounting requested with no rainfall record loaded");
        last.report = None;
        last.error = None;
        return;
    };

    match run(&registry, raw, &config) {
        Ok(report) => {
            for series in &report.delivered {
                ready.send(FlowSeriesReady {
                    series: series.clone(),
                });
            }
            for error in &report.failures {
                failed.send(CatchmentFailed {
                    error: error.clone(),
                });
            }
            last.report = Some(report);
            last.error = None;
        }
        Err(err) => {
            warn!("Moisture accounting run aborted: {}", err);
            last.report = None;
            last.error = Some(err);
        }
    }
}

pub struct AmmPlugin;

impl Plugin for AmmPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AmmConfig>()
            .init_resource::<CatchmentRegistry>()
            .init_resource::<RainfallInput>()
            .init_resource::<LastRunReport>()
            .add_event::<RunRequested>()
            .add_event::<FlowSeriesReady>()
            .add_event::<CatchmentFailed>()
            .add_systems(Update, run_moisture_accounting);
    }
}
