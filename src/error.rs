//! Error taxonomy for the monitoring loop

use thiserror::Error;

/// Errors raised by the generate → score → present pipeline.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Model not ready: fit the anomaly model before scoring")]
    ModelNotReady,

    #[error("Transaction generation failed: {0}")]
    GenerationFailure(String),

    #[error("Presentation failed: {0}")]
    PresentationFailure(String),

    #[error("Invalid model input: expected {expected} features, got {got}")]
    InvalidModelInput { expected: usize, got: usize },

    #[error("Insufficient training data: required {required}, got {got}")]
    InsufficientTrainingData { required: usize, got: usize },

    #[error("Invalid configuration: {field} - {reason}")]
    InvalidConfig { field: String, reason: String },
}

impl MonitorError {
    /// Whether the error ends the whole run rather than a single tick.
    ///
    /// Without a transaction source there is no stream left to monitor.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MonitorError::GenerationFailure(_))
    }

    pub(crate) fn invalid_config(field: &str, reason: impl Into<String>) -> Self {
        MonitorError::InvalidConfig {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, MonitorError>;
