//! Per-catchment moisture state machine.
//!
//! The tracker owns one scalar (the antecedent moisture) and a copy of the
//! catchment's calibration. Each call to [`MoistureTracker::step`] consumes
//! one step of rainfall: the capture fraction is taken from the state
//! entering the step, the carried-over state recedes, and the captured depth
//! is added, bounded to `[0, capacity]`.

use crate::error::EngineError;
use crate::registry::Calibration;

/// What happened during one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub rainfall: f64,
    /// Seasonal weight used for this step, in `[0, 1]`.
    pub coldness: f64,
    pub fraction: f64,
    /// Rainfall depth that became infiltration.
    pub captured: f64,
    /// State after the step.
    pub moisture: f64,
}

/// A non-finite intermediate. The caller knows which catchment and step it
/// was and turns it into an [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NonFinite {
    pub quantity: &'static str,
    pub value: f64,
}

impl NonFinite {
    pub fn at(self, catchment: &str, step: usize) -> EngineError {
        EngineError {
            catchment: catchment.to_string(),
            step,
            quantity: self.quantity,
            value: self.value,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MoistureTracker {
    calibration: Calibration,
    recession: f64,
    state: f64,
    steps: usize,
}

impl MoistureTracker {
    /// `step_hours` fixes the per-step recession for the whole run.
    pub fn new(calibration: Calibration, initial_state: f64, step_hours: f64) -> Self {
        Self {
            recession: calibration.recession_factor(step_hours),
            state: initial_state.clamp(0.0, calibration.capacity),
            calibration,
            steps: 0,
        }
    }

    pub fn state(&self) -> f64 {
        self.state
    }

    /// Steps taken so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Advance one step. On error the state is left untouched.
    pub fn step(&mut self, rainfall: f64, coldness: f64) -> Result<StepOutcome, NonFinite> {
        finite("rainfall", rainfall)?;
        finite("coldness", coldness)?;

        let capacity = self.calibration.capacity;
        let fraction = self.calibration.curve.fraction(self.state, capacity, coldness);
        let captured = finite("captured depth", rainfall * fraction)?;
        let decayed = self.state * self.recession;
        let moisture = finite("moisture", decayed + captured)?.clamp(0.0, capacity);

        self.state = moisture;
        self.steps += 1;
        Ok(StepOutcome {
            rainfall,
            coldness,
            fraction,
            captured,
            moisture,
        })
    }
}

fn finite(quantity: &'static str, value: f64) -> Result<f64, NonFinite> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(NonFinite { quantity, value })
    }
}
