use crate::capture::{CaptureCurve, SeasonalCoefficients};
use crate::error::ValidationError;

use super::types::{AttributeRecord, AttributeValue, Calibration, Catchment};

/// Attribute names understood by the registry.
pub mod attributes {
    pub const NAME: &str = "Name";
    pub const OUTLET: &str = "Outlet";
    pub const AREA: &str = "Area";
    pub const CAPACITY: &str = "Capacity";
    /// Hours.
    pub const RECESSION_HALF_LIFE: &str = "RecessionHalfLife";
    pub const DRY_CAPTURE: &str = "DryCapture";
    pub const WET_CAPTURE: &str = "WetCapture";
    pub const COLD_FACTOR: &str = "ColdFactor";
    pub const HOT_FACTOR: &str = "HotFactor";
    pub const COLDEST_DAY: &str = "ColdestDay";
    pub const INITIAL_MOISTURE: &str = "InitialMoisture";
}

use attributes::*;

/// Validate one attribute record into a typed catchment.
///
/// `index` labels the record in errors when it has no usable name.
pub fn validate_record(index: usize, record: &AttributeRecord) -> Result<Catchment, ValidationError> {
    let label = text(record, NAME).unwrap_or_else(|| format!("#{index}"));
    let key = text(record, NAME).ok_or_else(|| ValidationError::MissingAttribute {
        record: label.clone(),
        attribute: NAME,
    })?;

    let reader = Reader {
        record,
        label: &label,
    };

    let area = reader.required(AREA)?;
    reader.check(AREA, area, area > 0.0, "> 0")?;

    let capacity = reader.required(CAPACITY)?;
    reader.check(CAPACITY, capacity, capacity > 0.0, "> 0")?;

    let half_life = reader.required(RECESSION_HALF_LIFE)?;
    reader.check(RECESSION_HALF_LIFE, half_life, half_life > 0.0, "> 0 hours")?;

    let dry = reader.fraction(DRY_CAPTURE)?;
    let wet = reader.fraction(WET_CAPTURE)?;
    reader.check(WET_CAPTURE, wet, wet >= dry, "within [DryCapture, 1]")?;

    let cold_factor = reader.fraction(COLD_FACTOR)?;
    let hot_factor = reader.fraction(HOT_FACTOR)?;

    let coldest_day = reader.required(COLDEST_DAY)?;
    reader.check(
        COLDEST_DAY,
        coldest_day,
        (1.0..=366.0).contains(&coldest_day),
        "within [1, 366]",
    )?;

    let initial_moisture = reader.optional(INITIAL_MOISTURE)?;
    if let Some(m) = initial_moisture {
        reader.check(
            INITIAL_MOISTURE,
            m,
            (0.0..=capacity).contains(&m),
            "within [0, Capacity]",
        )?;
    }

    Ok(Catchment {
        key,
        area,
        outlet: text(record, OUTLET),
        calibration: Calibration {
            capacity,
            recession_half_life_hours: half_life,
            curve: CaptureCurve {
                dry_capture: dry,
                wet_capture: wet,
                seasonal: SeasonalCoefficients {
                    cold_factor,
                    hot_factor,
                    coldest_day,
                },
            },
        },
        initial_moisture,
    })
}

/// Non-blank text value; numbers are accepted and formatted.
fn text(record: &AttributeRecord, name: &str) -> Option<String> {
    match record.get(name)? {
        AttributeValue::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        AttributeValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

struct Reader<'a> {
    record: &'a AttributeRecord,
    label: &'a str,
}

impl Reader<'_> {
    fn optional(&self, attribute: &'static str) -> Result<Option<f64>, ValidationError> {
        let value = match self.record.get(attribute) {
            None => return Ok(None),
            Some(AttributeValue::Number(n)) => *n,
            Some(AttributeValue::Text(s)) if s.trim().is_empty() => return Ok(None),
            Some(AttributeValue::Text(s)) => {
                s.trim()
                    .parse::<f64>()
                    .map_err(|_| ValidationError::NotNumeric {
                        record: self.label.to_string(),
                        attribute,
                        value: s.clone(),
                    })?
            }
            Some(AttributeValue::Bool(b)) => {
                return Err(ValidationError::NotNumeric {
                    record: self.label.to_string(),
                    attribute,
                    value: b.to_string(),
                })
            }
        };
        self.check(attribute, value, value.is_finite(), "a finite number")?;
        Ok(Some(value))
    }

    fn required(&self, attribute: &'static str) -> Result<f64, ValidationError> {
        self.optional(attribute)?
            .ok_or_else(|| ValidationError::MissingAttribute {
                record: self.label.to_string(),
                attribute,
            })
    }

    fn fraction(&self, attribute: &'static str) -> Result<f64, ValidationError> {
        let value = self.required(attribute)?;
        self.check(attribute, value, (0.0..=1.0).contains(&value), "within [0, 1]")?;
        Ok(value)
    }

    fn check(
        &self,
        attribute: &'static str,
        value: f64,
        ok: bool,
        expected: &'static str,
    ) -> Result<(), ValidationError> {
        if ok {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                record: self.label.to_string(),
                attribute,
                value,
                expected,
            })
        }
    }
}
