//! Parameter registry: turns raw attribute records into validated catchments.
//!
//! Attribute records come from the host's feature store (one record per
//! drawn catchment polygon). Every record is checked for completeness and
//! plausible ranges; records that fail are excluded from the run and
//! reported by name, never defaulted.

mod types;
mod validation;

pub use types::{
    records_from_json, AttributeRecord, AttributeSource, AttributeValue, Calibration, Catchment,
    CatchmentRegistry, TwinKey,
};
pub use validation::{attributes, validate_record};
