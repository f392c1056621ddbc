use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::seasonal::{SeasonalCoefficients, SeasonalDriver};

/// Capture calibration for one catchment.
///
/// ```text
/// wetness  = clamp(moisture / capacity, 0, 1)
/// base     = dry_capture + (wet_capture - dry_capture) * wetness
/// fraction = clamp(base * seasonal.factor(coldness), 0, 1)
/// ```
///
/// With `wet_capture >= dry_capture` and non-negative seasonal factors the
/// fraction never decreases as moisture rises.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureCurve {
    /// Fraction captured when storage is empty.
    pub dry_capture: f64,
    /// Fraction captured when storage is full.
    pub wet_capture: f64,
    pub seasonal: SeasonalCoefficients,
}

impl CaptureCurve {
    /// Capture fraction for a moisture level and a precomputed coldness.
    #[inline]
    pub fn fraction(&self, moisture: f64, capacity: f64, coldness: f64) -> f64 {
        let wetness = (moisture / capacity).clamp(0.0, 1.0);
        let base = self.dry_capture + (self.wet_capture - self.dry_capture) * wetness;
        (base * self.seasonal.factor(coldness)).clamp(0.0, 1.0)
    }
}

/// Capture fraction at `when` for a catchment holding `moisture` out of
/// `capacity`. Pure: depends only on its arguments.
pub fn capture_fraction(
    moisture: f64,
    capacity: f64,
    when: NaiveDateTime,
    curve: &CaptureCurve,
    driver: &SeasonalDriver,
) -> f64 {
    let coldness = driver.coldness(when, &curve.seasonal);
    curve.fraction(moisture, capacity, coldness)
}
