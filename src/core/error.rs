//! Engine error taxonomy
//!
//! All variants describe caller input problems. They are deterministic for a
//! given input and are never retried internally; each carries the parameter
//! name so the caller can tell which chart or study failed.

use thiserror::Error;

/// Errors produced by the SPC engine
#[derive(Debug, Error)]
pub enum SpcError {
    #[error("Invalid grouping for '{parameter}': {message}")]
    InvalidGrouping { parameter: String, message: String },

    #[error("Insufficient data for '{parameter}': {available} subgroups available, {required} required")]
    InsufficientData {
        parameter: String,
        available: usize,
        required: usize,
    },

    #[error("Invalid specification for '{parameter}': {message}")]
    InvalidSpecification { parameter: String, message: String },

    #[error("Zero variance for '{parameter}': capability indices are undefined")]
    ZeroVariance { parameter: String },

    #[error("Invalid control limits for '{parameter}': {message}")]
    InvalidLimits { parameter: String, message: String },
}

impl SpcError {
    /// The parameter the failed calculation was for
    pub fn parameter(&self) -> &str {
        match self {
            SpcError::InvalidGrouping { parameter, .. } => parameter,
            SpcError::InsufficientData { parameter, .. } => parameter,
            SpcError::InvalidSpecification { parameter, .. } => parameter,
            SpcError::ZeroVariance { parameter } => parameter,
            SpcError::InvalidLimits { parameter, .. } => parameter,
        }
    }
}
