//! Error handling and error types for the party prediction pipeline.
//!
//! Every fallible operation in the crate returns [`Result`], whose error is
//! [`PipelineError`]. The prediction boundary additionally wraps failures into
//! [`PredictionError`] so front-ends always receive a value, never a panic.

use std::io;
use thiserror::Error;

/// Main error type for the pipeline.
///
/// This enum covers dataset loading, encoding, training, artifact persistence
/// and prediction failures.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A categorical value was never observed while fitting its codec
    #[error("Unknown category '{value}' for column '{column}'")]
    UnknownCategory {
        /// Column whose codec was consulted
        column: String,
        /// The unseen value
        value: String,
    },

    /// A code outside `0..cardinality` was decoded
    #[error("Code {index} is out of range for column '{column}' with {cardinality} categories")]
    OutOfRange {
        /// Column whose codec was consulted
        column: String,
        /// The offending code
        index: usize,
        /// Number of categories of the codec
        cardinality: usize,
    },

    /// Training schema and the current dataset or query disagree
    #[error("Schema mismatch: {message}")]
    SchemaMismatch {
        /// What disagrees
        message: String,
    },

    /// A persisted codec or model is missing or corrupt
    #[error("Failed to load artifact '{name}': {message}. Retrain the model to regenerate it")]
    ArtifactLoad {
        /// Logical artifact name
        name: String,
        /// Why loading failed
        message: String,
    },

    /// Configuration and validation errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Dataset content errors
    #[error("Dataset error: {message}")]
    Dataset {
        /// Error message
        message: String,
    },

    /// Data loading and parsing errors
    #[error("Data loading error: {message}")]
    DataLoading {
        /// Error message
        message: String,
    },

    /// Training-related errors
    #[error("Training error: {message}")]
    Training {
        /// Error message
        message: String,
    },

    /// Serialization errors not covered by a more specific variant
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message
        message: String,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Rejected value
        value: String,
        /// Why the value is invalid
        reason: String,
    },

    /// File I/O errors
    #[error("I/O error: {source}")]
    IO {
        /// Underlying error
        #[from]
        source: io::Error,
    },

    /// CSV parsing errors
    #[error("CSV parsing error: {source}")]
    Csv {
        /// Underlying error
        #[from]
        source: csv::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {source}")]
    Json {
        /// Underlying error
        #[from]
        source: serde_json::Error,
    },

    /// Bincode serialization errors
    #[error("Bincode error: {source}")]
    Bincode {
        /// Underlying error
        #[from]
        source: bincode::Error,
    },
}

/// Type alias for Results using PipelineError
pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    /// Create an unknown category error
    pub fn unknown_category<C: Into<String>, V: Into<String>>(column: C, value: V) -> Self {
        PipelineError::UnknownCategory {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Create an out of range error
    pub fn out_of_range<C: Into<String>>(column: C, index: usize, cardinality: usize) -> Self {
        PipelineError::OutOfRange {
            column: column.into(),
            index,
            cardinality,
        }
    }

    /// Create a schema mismatch error
    pub fn schema_mismatch<S: Into<String>>(message: S) -> Self {
        PipelineError::SchemaMismatch {
            message: message.into(),
        }
    }

    /// Create an artifact load error
    pub fn artifact_load<N: Into<String>, M: Into<String>>(name: N, message: M) -> Self {
        PipelineError::ArtifactLoad {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        PipelineError::Config {
            message: message.into(),
        }
    }

    /// Create a dataset error
    pub fn dataset<S: Into<String>>(message: S) -> Self {
        PipelineError::Dataset {
            message: message.into(),
        }
    }

    /// Create a data loading error
    pub fn data_loading<S: Into<String>>(message: S) -> Self {
        PipelineError::DataLoading {
            message: message.into(),
        }
    }

    /// Create a training error
    pub fn training<S: Into<String>>(message: S) -> Self {
        PipelineError::Training {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        PipelineError::Serialization {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        PipelineError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error is recoverable without operator intervention
    pub fn is_recoverable(&self) -> bool {
        match self {
            PipelineError::UnknownCategory { .. } => true,
            PipelineError::OutOfRange { .. } => false,
            PipelineError::SchemaMismatch { .. } => false,
            PipelineError::ArtifactLoad { .. } => false,
            PipelineError::Config { .. } => false,
            PipelineError::Dataset { .. } => false,
            PipelineError::DataLoading { .. } => false,
            PipelineError::Training { .. } => false,
            PipelineError::Serialization { .. } => false,
            PipelineError::InvalidParameter { .. } => true,
            PipelineError::IO { .. } => false,
            PipelineError::Csv { .. } => false,
            PipelineError::Json { .. } => false,
            PipelineError::Bincode { .. } => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            PipelineError::UnknownCategory { .. } => "unknown_category",
            PipelineError::OutOfRange { .. } => "out_of_range",
            PipelineError::SchemaMismatch { .. } => "schema_mismatch",
            PipelineError::ArtifactLoad { .. } => "artifact_load",
            PipelineError::Config { .. } => "config",
            PipelineError::Dataset { .. } => "dataset",
            PipelineError::DataLoading { .. } => "data_loading",
            PipelineError::Training { .. } => "training",
            PipelineError::Serialization { .. } => "serialization",
            PipelineError::InvalidParameter { .. } => "invalid_parameter",
            PipelineError::IO { .. } => "io",
            PipelineError::Csv { .. } => "csv",
            PipelineError::Json { .. } => "json",
            PipelineError::Bincode { .. } => "bincode",
        }
    }
}

/// Failure returned across the prediction boundary.
///
/// Carries the underlying [`PipelineError`] so callers can render a message
/// or branch on the kind of failure.
#[derive(Error, Debug)]
#[error("Prediction failed: {source}")]
pub struct PredictionError {
    #[source]
    source: PipelineError,
}

impl PredictionError {
    /// Wrap an underlying pipeline error
    pub fn new(source: PipelineError) -> Self {
        PredictionError { source }
    }

    /// The underlying cause
    pub fn cause(&self) -> &PipelineError {
        &self.source
    }

    /// Consume the wrapper and return the underlying cause
    pub fn into_cause(self) -> PipelineError {
        self.source
    }

    /// Category of the underlying cause
    pub fn category(&self) -> &'static str {
        self.source.category()
    }

    /// True when the query referenced a category never seen in training
    pub fn is_unknown_category(&self) -> bool {
        matches!(self.source, PipelineError::UnknownCategory { .. })
    }

    /// True when a persisted artifact could not be loaded
    pub fn is_artifact_load(&self) -> bool {
        matches!(self.source, PipelineError::ArtifactLoad { .. })
    }

    /// True when the training schema and the dataset disagree
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self.source, PipelineError::SchemaMismatch { .. })
    }
}

impl From<PipelineError> for PredictionError {
    fn from(err: PipelineError) -> Self {
        PredictionError::new(err)
    }
}

/// Build a [`PipelineError::Config`] from a message or a format string.
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::core::error::PipelineError::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::PipelineError::config(format!($fmt, $($arg)*))
    };
}

/// Build a [`PipelineError::Dataset`] from a message or a format string.
#[macro_export]
macro_rules! dataset_error {
    ($msg:expr) => {
        $crate::core::error::PipelineError::dataset($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::PipelineError::dataset(format!($fmt, $($arg)*))
    };
}

/// Build a [`PipelineError::Training`] from a message or a format string.
#[macro_export]
macro_rules! training_error {
    ($msg:expr) => {
        $crate::core::error::PipelineError::training($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::PipelineError::training(format!($fmt, $($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = PipelineError::config("test configuration error");
        assert_eq!(err.category(), "config");
        assert!(!err.is_recoverable());

        let err = PipelineError::unknown_category("state", "Atlantis");
        assert_eq!(err.category(), "unknown_category");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_error_macros() {
        let err = config_error!("test error");
        assert!(matches!(err, PipelineError::Config { .. }));

        let err = dataset_error!("bad row {}", 42);
        assert!(matches!(err, PipelineError::Dataset { .. }));
        assert!(err.to_string().contains("bad row 42"));

        let err = training_error!("only {} class", 1);
        assert!(matches!(err, PipelineError::Training { .. }));
    }

    #[test]
    fn test_artifact_load_message_mentions_retrain() {
        let err = PipelineError::artifact_load("party_prediction_model", "file not found");
        let message = err.to_string();
        assert!(message.contains("party_prediction_model"));
        assert!(message.contains("Retrain"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_out_of_range_display() {
        let err = PipelineError::out_of_range("party", 7, 3);
        assert_eq!(
            err.to_string(),
            "Code 7 is out of range for column 'party' with 3 categories"
        );
    }

    #[test]
    fn test_prediction_error_wraps_cause() {
        let err: PredictionError = PipelineError::unknown_category("state", "Narnia").into();
        assert!(err.is_unknown_category());
        assert!(!err.is_artifact_load());
        assert_eq!(err.category(), "unknown_category");
        assert!(err.to_string().starts_with("Prediction failed"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: PipelineError = io_err.into();
        assert!(matches!(err, PipelineError::IO { .. }));
        assert_eq!(err.category(), "io");
    }
}
