//! Error types for Phenomind Analytics
//!
//! The analytics core is infallible on typed input; these errors only arise at
//! the JSON boundary (request parsing, configuration loading, encoding).

use thiserror::Error;

/// Errors that can occur while preparing or encoding an analytics computation
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
