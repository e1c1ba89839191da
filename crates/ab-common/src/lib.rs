//! Activity Baseline common types, identifiers, and errors.
//!
//! This crate provides foundational types shared across ab-core modules:
//! - Run identity for naming report artifacts
//! - Common error types with stable codes
//! - Output format specifications

pub mod error;
pub mod id;
pub mod output;

pub use error::{Error, ErrorCategory, Result};
pub use id::RunId;
pub use output::OutputFormat;
