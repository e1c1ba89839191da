//! Error types for Activity Baseline.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Remediation suggestions for humans
//!
//! Consistency findings are deliberately NOT errors: the validator returns
//! them as data and the caller decides whether to proceed. Errors here are
//! reserved for conditions that are fatal to the operation raising them
//! (malformed input records, degenerate sample pools, I/O failures).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for Activity Baseline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Input-file loading errors (events file, statistics file).
    Load,
    /// Statistical engine precondition and arithmetic errors.
    Engine,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Load => write!(f, "load"),
            ErrorCategory::Engine => write!(f, "engine"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for Activity Baseline.
#[derive(Error, Debug)]
pub enum Error {
    // Load errors (10-19)
    #[error("malformed record in {file} line {line}: {reason}")]
    MalformedRecord {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("{file}: declared {declared} records, found {found}")]
    RecordCountMismatch {
        file: String,
        declared: usize,
        found: usize,
    },

    // Engine errors (30-39)
    #[error("insufficient sample size: {n} (need at least {min})")]
    InsufficientSampleSize { n: usize, min: usize },

    #[error("{pool} sample pool has zero variance across {n} draws")]
    ZeroVariancePool { pool: String, n: usize },

    #[error("event {name} missing from statistics source")]
    MissingEventInStatistics { name: String },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Load errors
    /// - 30-39: Engine errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::MalformedRecord { .. } => 10,
            Error::RecordCountMismatch { .. } => 11,
            Error::InsufficientSampleSize { .. } => 30,
            Error::ZeroVariancePool { .. } => 31,
            Error::MissingEventInStatistics { .. } => 32,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::MalformedRecord { .. } | Error::RecordCountMismatch { .. } => {
                ErrorCategory::Load
            }

            Error::InsufficientSampleSize { .. }
            | Error::ZeroVariancePool { .. }
            | Error::MissingEventInStatistics { .. } => ErrorCategory::Engine,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::MalformedRecord { .. } => "Malformed Input Record",
            Error::RecordCountMismatch { .. } => "Record Count Mismatch",
            Error::InsufficientSampleSize { .. } => "Insufficient Sample Size",
            Error::ZeroVariancePool { .. } => "Degenerate Sample Pool",
            Error::MissingEventInStatistics { .. } => "Missing Event Statistics",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Serialization Error",
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::MalformedRecord { .. } => {
                "Check the named line. Required numeric fields (weight, mean, std dev) are never defaulted; only min/max may be left empty."
            }
            Error::RecordCountMismatch { .. } => {
                "The first line of the file declares how many records follow. Fix the count or the record list."
            }
            Error::InsufficientSampleSize { .. } => {
                "Variance is undefined for fewer than 2 samples. Run with --days 2 or more."
            }
            Error::ZeroVariancePool { .. } => {
                "Every raw draw came out identical, so z-score normalization is impossible. Re-run with a different seed."
            }
            Error::MissingEventInStatistics { .. } => {
                "The event appears in one source but not the other. Run 'ab-core validate' to list the full mismatch."
            }
            Error::Io(_) => {
                "Check that input files exist and the output directory is writable."
            }
            Error::Json(_) => "Report this as a bug; engine records should always serialize.",
        }
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = Error::MalformedRecord {
            file: "events.txt".into(),
            line: 3,
            reason: "expected 5 fields, found 4".into(),
        };
        assert_eq!(err.code(), 10);
        assert_eq!(Error::InsufficientSampleSize { n: 1, min: 2 }.code(), 30);
        assert_eq!(
            Error::ZeroVariancePool {
                pool: "continuous".into(),
                n: 5
            }
            .code(),
            31
        );
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            Error::RecordCountMismatch {
                file: "stats.txt".into(),
                declared: 9,
                found: 7
            }
            .category(),
            ErrorCategory::Load
        );
        assert_eq!(
            Error::InsufficientSampleSize { n: 1, min: 2 }.category(),
            ErrorCategory::Engine
        );
        assert_eq!(
            Error::Io(std::io::Error::other("disk on fire")).category(),
            ErrorCategory::Io
        );
    }

    #[test]
    fn test_error_message_names_the_event() {
        let err = Error::MissingEventInStatistics {
            name: "Emails sent".into(),
        };
        assert!(err.to_string().contains("Emails sent"));
    }

    #[test]
    fn test_format_error_human() {
        let err = Error::InsufficientSampleSize { n: 1, min: 2 };
        let formatted = format_error_human(&err, false);

        assert!(formatted.contains("Insufficient Sample Size"));
        assert!(formatted.contains("insufficient sample size: 1"));
        assert!(formatted.contains("--days 2"));
    }

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Load.to_string(), "load");
        assert_eq!(ErrorCategory::Engine.to_string(), "engine");
        assert_eq!(ErrorCategory::Io.to_string(), "io");
    }
}
