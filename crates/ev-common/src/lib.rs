//! enverify common types and errors.
//!
//! This crate provides foundational types shared across the enverify crates:
//! - The unified error type with stable codes and categories
//! - Missing-value records produced by environment lookups
//! - Output format specifications for the CLI

pub mod error;
pub mod missing;
pub mod output;

pub use error::{format_error_human, Error, ErrorCategory, Result, StructuredError, TransformError};
pub use missing::{missing_value_messages, MissingValue};
pub use output::OutputFormat;
