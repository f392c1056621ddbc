// ---------------------------------------------------------------------------
// Error taxonomy for AMM runs
// ---------------------------------------------------------------------------
//
// ValidationError  bad catchment attributes, excludes one catchment
// SeriesError      malformed rainfall or temperature record, aborts the whole run
// EngineError      non-finite value while stepping, aborts one catchment
// ConfigError      unusable run configuration, nothing runs
//
// None of these are retried: they are all data-quality problems.

use std::fmt;

use chrono::NaiveDateTime;

/// A catchment attribute record failed validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required attribute is absent or blank.
    MissingAttribute {
        record: String,
        attribute: &'static str,
    },
    /// An attribute that must be numeric could not be read as a number.
    NotNumeric {
        record: String,
        attribute: &'static str,
        value: String,
    },
    /// A numeric attribute is non-finite or outside its plausible range.
    OutOfRange {
        record: String,
        attribute: &'static str,
        value: f64,
        expected: &'static str,
    },
    /// Another record already uses this catchment name.
    DuplicateName { name: String },
}

impl ValidationError {
    /// Name (or `#index` placeholder) of the record that was rejected.
    pub fn record(&self) -> &str {
        match self {
            ValidationError::MissingAttribute { record, .. }
            | ValidationError::NotNumeric { record, .. }
            | ValidationError::OutOfRange { record, .. } => record,
            ValidationError::DuplicateName { name } => name,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingAttribute { record, attribute } => {
                write!(f, "Catchment {record}: missing attribute {attribute}")
            }
            ValidationError::NotNumeric {
                record,
                attribute,
                value,
            } => write!(
                f,
                "Catchment {record}: attribute {attribute} is not a number ({value:?})"
            ),
            ValidationError::OutOfRange {
                record,
                attribute,
                value,
                expected,
            } => write!(
                f,
                "Catchment {record}: attribute {attribute} = {value} is out of range (expected {expected})"
            ),
            ValidationError::DuplicateName { name } => {
                write!(f, "Catchment {name}: name is already in use")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// A time-series record cannot be conformed to the simulation grid.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesError {
    /// No observations at all.
    Empty,
    /// Observation `index` is not later than the one before it.
    NonMonotonic { index: usize },
    /// Observation `index` is negative or non-finite.
    InvalidValue { index: usize, value: f64 },
    /// A cumulative record went down at observation `index`.
    CumulativeDecrease {
        index: usize,
        previous: f64,
        value: f64,
    },
    /// The gauge recording interval must be positive.
    InvalidInterval { seconds: i64 },
    /// The record lies entirely outside the simulation window.
    NoOverlap,
    /// An instantaneous record (temperatures) does not span every step.
    PartialCoverage {
        covered_from: NaiveDateTime,
        covered_to: NaiveDateTime,
    },
}

impl fmt::Display for SeriesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesError::Empty => write!(f, "Time-series record is empty"),
            SeriesError::NonMonotonic { index } => write!(
                f,
                "Observation {index} is not later than the previous observation"
            ),
            SeriesError::InvalidValue { index, value } => {
                write!(f, "Observation {index} has invalid value {value}")
            }
            SeriesError::CumulativeDecrease {
                index,
                previous,
                value,
            } => write!(
                f,
                "Cumulative rainfall decreases at observation {index} ({previous} -> {value})"
            ),
            SeriesError::InvalidInterval { seconds } => {
                write!(f, "Rain gauge recording interval must be positive, got {seconds}s")
            }
            SeriesError::NoOverlap => {
                write!(f, "Rainfall record does not overlap the simulation period")
            }
            SeriesError::PartialCoverage {
                covered_from,
                covered_to,
            } => write!(
                f,
                "Record covers {covered_from} to {covered_to}, not the whole simulation period"
            ),
        }
    }
}

impl std::error::Error for SeriesError {}

/// Stepping produced a value the engine cannot continue from.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineError {
    /// Key of the catchment whose run aborted.
    pub catchment: String,
    /// Zero-based step index at which the value appeared.
    pub step: usize,
    /// Which quantity went bad (`"rainfall"`, `"capture fraction"`, ...).
    pub quantity: &'static str,
    pub value: f64,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Catchment {} aborted at step {}: {} is {}",
            self.catchment, self.step, self.quantity, self.value
        )
    }
}

impl std::error::Error for EngineError {}

/// The run configuration is unusable.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Step length is zero or negative.
    NonPositiveStep { seconds: i64 },
    /// End timestamp is not after start timestamp.
    EmptyWindow,
    /// One step is longer than the whole window.
    StepExceedsWindow { step_seconds: i64, window_seconds: i64 },
    /// Unit conversion constant is non-finite or not positive.
    InvalidConversion(f64),
    /// Warm-up duration is negative.
    NegativeWarmUp { seconds: i64 },
    /// Temperature-driven seasons are misconfigured.
    InvalidTemperatureDriver(String),
    /// The configuration document could not be parsed.
    Malformed(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositiveStep { seconds } => {
                write!(f, "Time step must be positive, got {seconds}s")
            }
            ConfigError::EmptyWindow => write!(f, "Simulation end must be after start"),
            ConfigError::StepExceedsWindow {
                step_seconds,
                window_seconds,
            } => write!(
                f,
                "Time step of {step_seconds}s is longer than the {window_seconds}s simulation window"
            ),
            ConfigError::InvalidConversion(v) => {
                write!(f, "Unit conversion constant must be positive and finite, got {v}")
            }
            ConfigError::NegativeWarmUp { seconds } => {
                write!(f, "Warm-up must not be negative, got {seconds}s")
            }
            ConfigError::InvalidTemperatureDriver(msg) => {
                write!(f, "Temperature season driver: {msg}")
            }
            ConfigError::Malformed(msg) => write!(f, "Malformed configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Any error an AMM run can surface.
#[derive(Debug, Clone, PartialEq)]
pub enum AmmError {
    Config(ConfigError),
    Validation(ValidationError),
    Series(SeriesError),
    Engine(EngineError),
}

impl fmt::Display for AmmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmmError::Config(e) => write!(f, "Configuration error: {e}"),
            AmmError::Validation(e) => write!(f, "Validation error: {e}"),
            AmmError::Series(e) => write!(f, "Rainfall series error: {e}"),
            AmmError::Engine(e) => write!(f, "Engine error: {e}"),
        }
    }
}

impl std::error::Error for AmmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AmmError::Config(e) => Some(e),
            AmmError::Validation(e) => Some(e),
            AmmError::Series(e) => Some(e),
            AmmError::Engine(e) => Some(e),
        }
    }
}

impl From<ConfigError> for AmmError {
    fn from(e: ConfigError) -> Self {
        AmmError::Config(e)
    }
}

impl From<ValidationError> for AmmError {
    fn from(e: ValidationError) -> Self {
        AmmError::Validation(e)
    }
}

impl From<SeriesError> for AmmError {
    fn from(e: SeriesError) -> Self {
        AmmError::Series(e)
    }
}

impl From<EngineError> for AmmError {
    fn from(e: EngineError) -> Self {
        AmmError::Engine(e)
    }
}
