//! Antecedent moisture accounting (AMM) for rainfall-derived infiltration
//! and inflow.
//!
//! Each catchment carries one moisture state that rises with captured rain
//! and recedes between storms. The share of rainfall that becomes
//! infiltration depends on that state and on the season, so the same storm
//! produces more inflow when it falls on wet winter ground than on dry
//! summer ground.
//!
//! The usual path is [`registry::CatchmentRegistry::load`] for the
//! catchments, [`rainfall::conform`] for the gauge record, then
//! [`run::run_batch`]. Bevy hosts add [`plugin::AmmPlugin`] and send
//! [`plugin::RunRequested`] instead.

pub mod capture;
pub mod config;
pub mod error;
pub mod flow;
pub mod plugin;
pub mod rainfall;
pub mod registry;
pub mod run;
pub mod tracker;

#[cfg(test)]
mod integration_tests;
#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use config::AmmConfig;
pub use error::{AmmError, ConfigError, EngineError, SeriesError, ValidationError};
pub use flow::{FlowSeries, InflowSink, OutletInflows, OutputDetail};
pub use plugin::AmmPlugin;
pub use rainfall::{RainFormat, RainfallSeries, RawRainfall};
pub use registry::{AttributeRecord, Catchment, CatchmentRegistry};
pub use run::{run, run_batch, RunReport};
