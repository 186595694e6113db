//! Error types for devignette-estimate

use thiserror::Error;

/// Errors raised by the vignetting estimators
#[derive(Debug, Error)]
pub enum EstimateError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] devignette_core::Error),

    /// The normal equations of the radial fit could not be inverted
    #[error("singular system in radial fit ({size}x{size})")]
    SingularSystem { size: usize },

    /// Options that cannot produce a terminating search
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Image shape not supported by the estimator
    #[error("unsupported image: {0}")]
    UnsupportedImage(String),

    /// Malformed Radial Table text
    #[error("radial table line {line}: {message}")]
    TableFormat { line: usize, message: String },

    /// IO error while reading or writing a table
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for estimation operations
pub type EstimateResult<T> = Result<T, EstimateError>;
