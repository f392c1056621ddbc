//! Flow response: converts captured depths into per-catchment inflow series
//! and hands them to the host.

mod generator;
mod sink;
#[cfg(test)]
mod tests;
mod types;

pub use generator::{captured_run, flow_from_run, generate, CapturedRun};
pub use sink::{InflowSink, OutletInflows};
pub use types::{FlowSeries, OutputDetail, StepRecord};
