//! Error handling for StitchKit
//!
//! Provides the error types shared by every layer of the toolkit:
//! - G-Code errors (instruction parsing)
//! - Source errors (reading stitch patterns)
//!
//! All error types use `thiserror` for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

/// G-Code error type
///
/// Represents errors related to parsing a single instruction line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GcodeError {
    /// The line carries no recognisable command word
    #[error("Invalid syntax: {reason}")]
    InvalidSyntax {
        /// The reason for the syntax error.
        reason: String,
    },

    /// The line is empty once comments are removed
    #[error("Empty command")]
    Empty,

    /// A required parameter is absent or not numeric
    #[error("Missing parameter '{param}'")]
    MissingParameter {
        /// The parameter letter.
        param: char,
    },
}

/// Stitch source error type
///
/// Raised when a stitch pattern cannot be read or is internally inconsistent.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The pattern file could not be read
    #[error("Failed to read pattern {path}: {source}")]
    Read {
        /// Path of the pattern file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The pattern document is not valid JSON or has the wrong shape
    #[error("Malformed pattern: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Stitch indices must strictly increase
    #[error("Stitch index {index} does not follow index {previous}")]
    OutOfOrder {
        /// Offending index.
        index: u64,
        /// Index of the preceding stitch.
        previous: u64,
    },

    /// A coordinate is NaN or infinite
    #[error("Stitch {index} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Index of the offending stitch.
        index: u64,
    },
}
