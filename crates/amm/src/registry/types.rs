use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::capture::CaptureCurve;
use crate::error::ValidationError;

use super::validation::validate_record;

/// One attribute value as an attribute table stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Number(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Text(v.to_string())
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

/// Raw, unvalidated attributes of one catchment feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeRecord {
    fields: BTreeMap<String, AttributeValue>,
}

impl AttributeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<AttributeValue>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        self.fields.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.fields.get(name)
    }
}

/// Read-only source of catchment attribute records.
pub trait AttributeSource {
    fn records(&self) -> &[AttributeRecord];
}

impl AttributeSource for [AttributeRecord] {
    fn records(&self) -> &[AttributeRecord] {
        self
    }
}

impl AttributeSource for Vec<AttributeRecord> {
    fn records(&self) -> &[AttributeRecord] {
        self
    }
}

/// Parse a JSON array of attribute objects, e.g. the `properties` of an
/// exported feature collection.
pub fn records_from_json(json: &str) -> Result<Vec<AttributeRecord>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Calibrated equation set of one catchment. Immutable during a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Upper bound of the moisture state.
    pub capacity: f64,
    /// Hours for the moisture state to halve without rain.
    pub recession_half_life_hours: f64,
    pub curve: CaptureCurve,
}

impl Calibration {
    /// Multiplicative recession applied to carried-over moisture per step.
    pub fn recession_factor(&self, step_hours: f64) -> f64 {
        0.5_f64.powf(step_hours / self.recession_half_life_hours)
    }
}

/// Bit-exact fingerprint of everything that drives a moisture run except
/// area. Catchments sharing a key produce identical captured depths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TwinKey([u64; 9]);

/// A validated catchment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catchment {
    /// Unique key (the feature's name).
    pub key: String,
    pub area: f64,
    /// Node receiving this catchment's flow, if the host assigned one.
    pub outlet: Option<String>,
    pub calibration: Calibration,
    /// Moisture at the start of the run. `None` starts dry.
    pub initial_moisture: Option<f64>,
}

impl Catchment {
    pub fn initial_state(&self) -> f64 {
        self.initial_moisture.unwrap_or(0.0)
    }

    pub fn twin_key(&self) -> TwinKey {
        let c = &self.calibration;
        let s = &c.curve.seasonal;
        TwinKey([
            c.capacity.to_bits(),
            c.recession_half_life_hours.to_bits(),
            c.curve.dry_capture.to_bits(),
            c.curve.wet_capture.to_bits(),
            s.cold_factor.to_bits(),
            s.hot_factor.to_bits(),
            s.coldest_day.to_bits(),
            self.initial_state().to_bits(),
            u64::from(self.initial_moisture.is_some()),
        ])
    }
}

/// Validated catchments keyed by name, plus the records that were turned away.
#[derive(Resource, Debug, Clone, Default)]
pub struct CatchmentRegistry {
    catchments: BTreeMap<String, Catchment>,
    rejected: Vec<ValidationError>,
}

impl CatchmentRegistry {
    /// Validate every record from `source`. Invalid and duplicate records
    /// are logged and kept in `rejected()`; the rest are registered.
    pub fn load<S: AttributeSource + ?Sized>(source: &S) -> Self {
        let mut registry = Self::default();
        for (index, record) in source.records().iter().enumerate() {
            let result = validate_record(index, record).and_then(|c| registry.insert(c));
            if let Err(err) = result {
                warn!("Excluding catchment record: {}", err);
                registry.rejected.push(err);
            }
        }
        info!(
            "Catchment registry loaded: {} valid, {} rejected",
            registry.catchments.len(),
            registry.rejected.len()
        );
        registry
    }

    /// Register an already-validated catchment. The first holder of a name
    /// keeps it.
    pub fn insert(&mut self, catchment: Catchment) -> Result<(), ValidationError> {
        if self.catchments.contains_key(&catchment.key) {
            return Err(ValidationError::DuplicateName {
                name: catchment.key,
            });
        }
        self.catchments.insert(catchment.key.clone(), catchment);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Catchment> {
        self.catchments.get(key)
    }

    /// Catchments in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Catchment> {
        self.catchments.values()
    }

    pub fn len(&self) -> usize {
        self.catchments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catchments.is_empty()
    }

    pub fn rejected(&self) -> &[ValidationError] {
        &self.rejected
    }
}
