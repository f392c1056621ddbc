//! Capture fraction: how much of each step's rainfall becomes I/I.
//!
//! The fraction rises with antecedent moisture (wetter storage captures more)
//! and swings smoothly through the year between a hot-season and a
//! cold-season response. The seasonal swing is driven by the calendar alone,
//! by interpolated monthly normal temperatures, or by an observed
//! temperature record.

mod fraction;
mod seasonal;

pub use fraction::{capture_fraction, CaptureCurve};
pub use seasonal::{
    ObservedTemperatures, SeasonalCoefficients, SeasonalDriver, TemperatureSeasons,
    MEAN_YEAR_DAYS,
};
