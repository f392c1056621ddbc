//! Time-series adapter: conforms raw gauge records to the calculation grid.
//!
//! Raw records may be irregular, may skip dry intervals entirely, and may be
//! stored as volumes, intensities or running totals. The adapter spreads
//! each observation's depth uniformly over the time it covers and collects
//! the share that falls inside every calculation step. Nothing is invented
//! for gaps: time not covered by an observation receives zero rainfall.
//!
//! Instantaneous records such as air temperature are sampled instead, by
//! linear interpolation at each step start.

mod resample;
#[cfg(test)]
mod tests;
mod types;

pub(crate) use resample::validate_instantaneous;
pub use resample::{conform, conform_to_grid, interpolate, sample_to_grid};
pub use types::{Observation, RainFormat, RainfallSeries, RawRainfall};
