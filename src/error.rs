//! Error types for the model card pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, CardError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum CardError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Plot error: {0}")]
    PlotError(String),

    #[error("Template error: {0}")]
    TemplateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<polars::error::PolarsError> for CardError {
    fn from(err: polars::error::PolarsError) -> Self {
        CardError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for CardError {
    fn from(err: serde_json::Error) -> Self {
        CardError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for CardError {
    fn from(err: ndarray::ShapeError) -> Self {
        CardError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

impl From<image::ImageError> for CardError {
    fn from(err: image::ImageError) -> Self {
        CardError::PlotError(err.to_string())
    }
}

impl From<base64::DecodeError> for CardError {
    fn from(err: base64::DecodeError) -> Self {
        CardError::SerializationError(err.to_string())
    }
}

impl From<minijinja::Error> for CardError {
    fn from(err: minijinja::Error) -> Self {
        CardError::TemplateError(err.to_string())
    }
}
