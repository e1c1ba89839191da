//! Exit codes for the ab-core CLI.
//!
//! Exit codes communicate operation outcome without requiring output
//! parsing, and are a stable contract for automation.
//!
//! Ranges:
//! - 0-6: Success/operational outcomes
//! - 10-19: User/environment errors (recoverable by user action)
//! - 20-29: Internal errors (bugs, should be reported)

/// Exit codes for ab-core operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success: consistent inputs / clean run, no day flagged
    Clean = 0,

    /// Run completed and at least one day was flagged
    DaysFlagged = 1,

    /// Validator returned consistency findings
    Inconsistent = 2,

    // User / environment errors
    /// Invalid arguments
    ArgsError = 10,

    /// Input file malformed or truncated
    LoadError = 11,

    /// Engine precondition failed (sample size, degenerate pool)
    EngineError = 12,

    // Internal errors
    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates a completed run (codes 0-2).
    pub fn is_success(self) -> bool {
        matches!(
            self,
            ExitCode::Clean | ExitCode::DaysFlagged | ExitCode::Inconsistent
        )
    }

    /// Map an engine error to its exit code.
    pub fn from_error(err: &ab_common::Error) -> Self {
        match err.category() {
            ab_common::ErrorCategory::Load => ExitCode::LoadError,
            ab_common::ErrorCategory::Engine => ExitCode::EngineError,
            ab_common::ErrorCategory::Io => ExitCode::IoError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ExitCode::Clean.as_i32(), 0);
        assert_eq!(ExitCode::DaysFlagged.as_i32(), 1);
        assert_eq!(ExitCode::Inconsistent.as_i32(), 2);
        assert_eq!(ExitCode::LoadError.as_i32(), 11);
    }

    #[test]
    fn completed_runs_count_as_success() {
        assert!(ExitCode::Clean.is_success());
        assert!(ExitCode::DaysFlagged.is_success());
        assert!(!ExitCode::LoadError.is_success());
    }

    #[test]
    fn error_categories_map_to_codes() {
        let err = ab_common::Error::InsufficientSampleSize { n: 1, min: 2 };
        assert_eq!(ExitCode::from_error(&err), ExitCode::EngineError);
    }
}
