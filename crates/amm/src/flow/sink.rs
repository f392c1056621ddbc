use std::collections::BTreeMap;

use bevy::log::warn;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

use super::types::FlowSeries;

/// Receives finished flow series. Implemented by whatever the host uses to
/// feed its hydraulic model.
pub trait InflowSink {
    fn deliver(&mut self, series: FlowSeries);
}

impl InflowSink for Vec<FlowSeries> {
    fn deliver(&mut self, series: FlowSeries) {
        self.push(series);
    }
}

/// Inflow summed per outlet node. Series without an outlet are skipped.
///
/// Totals stay finite: a series that would push any step of its outlet's
/// sum to infinity is left out and recorded in [`OutletInflows::overflows`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutletInflows {
    totals: BTreeMap<String, Vec<f64>>,
    /// Catchments contributing to each outlet, in delivery order.
    contributors: BTreeMap<String, Vec<String>>,
    #[serde(skip)]
    overflows: Vec<EngineError>,
}

impl OutletInflows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_series<'a>(series: impl IntoIterator<Item = &'a FlowSeries>) -> Self {
        let mut inflows = Self::new();
        for s in series {
            inflows.add_or_record(s);
        }
        inflows
    }

    /// Add one series to its outlet's total. Fails without touching the
    /// total if any summed step would stop being finite.
    pub fn add(&mut self, series: &FlowSeries) -> Result<(), EngineError> {
        let Some(outlet) = &series.outlet else {
            return Ok(());
        };
        let current = self.totals.get(outlet).map(Vec::as_slice).unwrap_or(&[]);
        let len = current.len().max(series.values.len());
        let mut summed = Vec::with_capacity(len);
        for step in 0..len {
            let sum = current.get(step).copied().unwrap_or(0.0)
                + series.values.get(step).copied().unwrap_or(0.0);
            if !sum.is_finite() {
                return Err(EngineError {
                    catchment: series.catchment.clone(),
                    step,
                    quantity: "outlet inflow",
                    value: sum,
                });
            }
            summed.push(sum);
        }
        self.totals.insert(outlet.clone(), summed);
        self.contributors
            .entry(outlet.clone())
            .or_default()
            .push(series.catchment.clone());
        Ok(())
    }

    fn add_or_record(&mut self, series: &FlowSeries) {
        if let Err(err) = self.add(series) {
            warn!("Left out of outlet total: {}", err);
            self.overflows.push(err);
        }
    }

    /// Series left out because their outlet total would overflow.
    pub fn overflows(&self) -> &[EngineError] {
        &self.overflows
    }

    pub fn get(&self, outlet: &str) -> Option<&[f64]> {
        self.totals.get(outlet).map(Vec::as_slice)
    }

    pub fn contributors(&self, outlet: &str) -> &[String] {
        self.contributors
            .get(outlet)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Outlets in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.totals.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

impl InflowSink for OutletInflows {
    fn deliver(&mut self, series: FlowSeries) {
        self.add_or_record(&series);
    }
}
