//! Error types for the CAM tools crate.
//!
//! This module provides structured error types for G-code generation
//! and generator parameter validation.

use std::io;
use thiserror::Error;

/// Errors that can occur while generating machine G-code.
#[derive(Error, Debug)]
pub enum CamToolError {
    /// A parameter validation error occurred.
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    /// The pattern uses more colours than the pause protocol can address.
    #[error("Pattern has {count} colours, at most {max} are supported")]
    TooManyColors { count: u32, max: u32 },

    /// Writing an instruction line failed.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// Errors related to generator parameter validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A value that must be strictly positive is not.
    #[error("Parameter '{name}' must be positive, got {value}")]
    NotPositive { name: String, value: f64 },

    /// A value is NaN or infinite.
    #[error("Parameter '{name}' must be finite")]
    NotFinite { name: String },

    /// A parameter value is invalid.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },
}

impl ParameterError {
    pub(crate) fn not_positive(name: &str, value: f64) -> Self {
        ParameterError::NotPositive {
            name: name.to_string(),
            value,
        }
    }
}

/// Result type alias for CAM tool operations.
pub type CamToolResult<T> = Result<T, CamToolError>;

/// Result type alias for parameter validation.
pub type ParameterResult<T> = Result<T, ParameterError>;
