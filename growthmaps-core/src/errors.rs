use crate::timespan::Timestamp;
use crate::units::{ConversionError, ParseError};
use thiserror::Error;

/// Error type for invalid configuration, data and run control.
///
/// Configuration errors are raised before any data is read.
/// Data integrity errors abort a run; no partial output is ever returned.
#[derive(Error, Debug)]
pub enum GrowthMapError {
    #[error("{0}")]
    Error(String),
    #[error("Invalid timespan: {0}")]
    InvalidTimespan(String),
    #[error("Model '{0}' has no layers")]
    EmptyModel(String),
    #[error("No models were supplied")]
    NoModels,
    #[error("Model '{0}' was supplied more than once")]
    DuplicateModel(String),
    #[error("Could not parse unit '{unit}': {source}")]
    UnitParse {
        unit: String,
        #[source]
        source: ParseError,
    },
    #[error("Layer '{key}' cannot convert values from '{from}' to '{to}': {source}")]
    IncompatibleUnits {
        key: String,
        from: String,
        to: String,
        #[source]
        source: ConversionError,
    },
    #[error("Invalid parameters for {model}: {reason}")]
    InvalidParameters { model: String, reason: String },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("The data source contains no stacks")]
    EmptySource,
    #[error("Data source timestamps are not sorted at index {index} ({timestamp})")]
    UnsortedSource { index: usize, timestamp: Timestamp },
    #[error("Stack at {timestamp} has no layer '{key}'")]
    MissingKey { key: String, timestamp: Timestamp },
    #[error(
        "Layer '{key}' at {timestamp} has shape {found:?}, expected {expected:?} to match the buffer"
    )]
    ShapeMismatch {
        key: String,
        timestamp: Timestamp,
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("Stack has no layer '{0}'")]
    KeyNotInStack(String),
    #[error("Layer '{key}' has shape {found:?}, expected {expected:?}")]
    StackShape {
        key: String,
        expected: (usize, usize),
        found: (usize, usize),
    },
    /// `timestamp` is the last timestep processed, or the end of the last period
    /// processed when that period had no timesteps.
    #[error("Run cancelled at {timestamp}")]
    Cancelled { timestamp: Timestamp },
}

/// Convenience type for `Result<T, GrowthMapError>`.
pub type GrowthMapResult<T> = Result<T, GrowthMapError>;

impl From<toml::de::Error> for GrowthMapError {
    fn from(e: toml::de::Error) -> Self {
        GrowthMapError::Config(e.to_string())
    }
}
