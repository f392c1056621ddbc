//! # TestRun: headless harness for the AMM plugin
//!
//! Wraps `bevy::app::App` + `MinimalPlugins` + `AmmPlugin` so tests and
//! benches can drive whole runs through the event interface without a host.

use bevy::app::App;
use bevy::prelude::*;

use crate::config::AmmConfig;
use crate::error::{AmmError, EngineError};
use crate::flow::FlowSeries;
use crate::plugin::{
    AmmPlugin, CatchmentFailed, FlowSeriesReady, LastRunReport, RainfallInput, RunRequested,
};
use crate::rainfall::RawRainfall;
use crate::registry::{AttributeRecord, CatchmentRegistry};
use crate::run::RunReport;

/// Everything the plugin sent since the harness was built.
#[derive(Resource, Debug, Default)]
struct Received {
    ready: Vec<FlowSeries>,
    failed: Vec<EngineError>,
}

fn collect_events(
    mut ready: EventReader<FlowSeriesReady>,
    mut failed: EventReader<CatchmentFailed>,
    mut received: ResMut<Received>,
) {
    received.ready.extend(ready.read().map(|e| e.series.clone()));
    received.failed.extend(failed.read().map(|e| e.error.clone()));
}

/// A headless Bevy App running `AmmPlugin`.
pub struct TestRun {
    app: App,
}

impl Default for TestRun {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRun {
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(AmmPlugin);
        app.init_resource::<Received>();
        app.add_systems(PostUpdate, collect_events);
        app.update();
        Self { app }
    }

    // -----------------------------------------------------------------------
    // Setup
    // -----------------------------------------------------------------------

    pub fn with_config(mut self, config: AmmConfig) -> Self {
        self.app.insert_resource(config);
        self
    }

    /// Replace the registry with one loaded from `records`.
    pub fn with_records(mut self, records: &[AttributeRecord]) -> Self {
        self.app.insert_resource(CatchmentRegistry::load(records));
        self
    }

    pub fn with_rainfall(mut self, raw: RawRainfall) -> Self {
        self.app.insert_resource(RainfallInput { raw: Some(raw) });
        self
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    /// Send `RunRequested` and run one frame.
    pub fn request_run(&mut self) {
        self.app.world_mut().send_event(RunRequested);
        self.app.update();
    }

    /// Run one frame without a request.
    pub fn idle(&mut self) {
        self.app.update();
    }

    /// Forget events collected so far.
    pub fn clear_received(&mut self) {
        let mut received = self.app.world_mut().resource_mut::<Received>();
        received.ready.clear();
        received.failed.clear();
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn resource<R: Resource>(&self) -> &R {
        self.app.world().resource::<R>()
    }

    pub fn report(&self) -> Option<&RunReport> {
        self.resource::<LastRunReport>().report.as_ref()
    }

    pub fn run_error(&self) -> Option<&AmmError> {
        self.resource::<LastRunReport>().error.as_ref()
    }

    pub fn runs(&self) -> u32 {
        self.resource::<LastRunReport>().runs
    }

    /// Series delivered through `FlowSeriesReady`, in arrival order.
    pub fn delivered(&self) -> &[FlowSeries] {
        &self.resource::<Received>().ready
    }

    /// Failures reported through `CatchmentFailed`, in arrival order.
    pub fn failures(&self) -> &[EngineError] {
        &self.resource::<Received>().failed
    }
}
