//! Error types for the price_forecast crate

use thiserror::Error;

/// Custom error types for the price_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Non-positive price fed to the log transform
    #[error("Domain error: {0}")]
    DomainError(String),

    /// Too few rows to produce a full feature row or a non-empty split
    #[error("Insufficient data: {0}")]
    InsufficientDataError(String),

    /// Model estimation did not converge or was ill-posed
    #[error("Fit error: {0}")]
    FitError(String),

    /// Regressor row count does not match the forecast horizon
    #[error("Shape mismatch: {0}")]
    ShapeMismatchError(String),

    /// Not enough historical rows to synthesize a future regressor frame
    #[error("Insufficient history: {0}")]
    InsufficientHistoryError(String),

    /// Caller-supplied date range violates ordering or bounds rules
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error related to data loading or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV operations
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from model artifact serialization
    #[error("Serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
