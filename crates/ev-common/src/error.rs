//! Error types for enverify.
//!
//! Every failure carries:
//! - A stable numeric code for machine parsing
//! - A category for grouping
//! - A recoverability hint
//! - A remediation suggestion for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Configuration Incomplete
//!   Reason: Missing configuration values: environment value DB_HOST is missing from config object at db.host
//!   Fix: Export the listed variables, or pass them with --env-file / --set.
//! ```
//!
//! # Agent-Facing Output
//!
//! ```json
//! {
//!   "code": 20,
//!   "category": "resolution",
//!   "message": "Missing configuration values: ...",
//!   "recoverable": true,
//!   "context": { "missing_values": [{ "path": "db.host", "envKey": "DB_HOST" }] }
//! }
//! ```
//!
//! Missing environment values are never errors on their own: they are collected as
//! [`MissingValue`] records and only become [`Error::ConfigurationIncomplete`] when a
//! caller asks for a strict resolution.

use crate::missing::{missing_value_messages, MissingValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for enverify operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error raised by a caller-supplied transform function.
pub type TransformError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed templates or unknown directives.
    Template,
    /// Environment values that could not be resolved.
    Resolution,
    /// Failures raised by transform functions.
    Transform,
    /// Environment sources (env files, inline assignments).
    Source,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Template => write!(f, "template"),
            ErrorCategory::Resolution => write!(f, "resolution"),
            ErrorCategory::Transform => write!(f, "transform"),
            ErrorCategory::Source => write!(f, "source"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for enverify.
#[derive(Error, Debug)]
pub enum Error {
    // Template errors (10-19)
    #[error("invalid template at {path}: {reason}")]
    InvalidTemplate { path: String, reason: String },

    #[error("unknown transform '{name}' at {path}")]
    UnknownTransform { path: String, name: String },

    // Resolution errors (20-29)
    #[error("Missing configuration values: {}", missing_value_messages(.missing).join("\n"))]
    ConfigurationIncomplete { missing: Vec<MissingValue> },

    // Transform errors (30-39)
    #[error("transform of {env_key} at {path} failed: {source}")]
    TransformFailed {
        path: String,
        env_key: String,
        #[source]
        source: TransformError,
    },

    // Source errors (40-49)
    #[error("invalid env file {path}: {reason}")]
    EnvFile { path: String, reason: String },

    /// Carries a description of the problem, never the argument itself.
    #[error("invalid assignment ({0}): expected KEY=VALUE")]
    InvalidAssignment(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a `TransformFailed` error for the leaf at `path`.
    pub fn transform_failed(
        path: impl Into<String>,
        env_key: impl Into<String>,
        source: impl Into<TransformError>,
    ) -> Self {
        Error::TransformFailed {
            path: path.into(),
            env_key: env_key.into(),
            source: source.into(),
        }
    }

    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Template errors
    /// - 20-29: Resolution errors
    /// - 30-39: Transform errors
    /// - 40-49: Source errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidTemplate { .. } => 10,
            Error::UnknownTransform { .. } => 11,
            Error::ConfigurationIncomplete { .. } => 20,
            Error::TransformFailed { .. } => 30,
            Error::EnvFile { .. } => 40,
            Error::InvalidAssignment(_) => 41,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidTemplate { .. } | Error::UnknownTransform { .. } => {
                ErrorCategory::Template
            }
            Error::ConfigurationIncomplete { .. } => ErrorCategory::Resolution,
            Error::TransformFailed { .. } => ErrorCategory::Transform,
            Error::EnvFile { .. } | Error::InvalidAssignment(_) => ErrorCategory::Source,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable without code changes.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::InvalidTemplate { .. } => false,
            Error::UnknownTransform { .. } => false,
            // Fixed by supplying the missing variables
            Error::ConfigurationIncomplete { .. } => true,
            // Fixed by supplying a parseable value
            Error::TransformFailed { .. } => true,
            Error::EnvFile { .. } => true,
            Error::InvalidAssignment(_) => true,
            Error::Io(_) => true,
            Error::Json(_) => false,
        }
    }

    /// Returns the missing values carried by a `ConfigurationIncomplete` error.
    pub fn missing_values(&self) -> &[MissingValue] {
        match self {
            Error::ConfigurationIncomplete { missing } => missing,
            _ => &[],
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::InvalidTemplate { .. } => "Invalid Template",
            Error::UnknownTransform { .. } => "Unknown Transform",
            Error::ConfigurationIncomplete { .. } => "Configuration Incomplete",
            Error::TransformFailed { .. } => "Transform Failed",
            Error::EnvFile { .. } => "Invalid Env File",
            Error::InvalidAssignment(_) => "Invalid Assignment",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::InvalidTemplate { .. } => {
                "Leaves must be strings, {\"$secret\": ..}, {\"$insert\": ..} or {\"$env\": .., \"$as\": ..}."
            }
            Error::UnknownTransform { .. } => {
                "Use one of the built-in transforms: bool, int, float, csv, json, string."
            }
            Error::ConfigurationIncomplete { .. } => {
                "Export the listed variables, or pass them with --env-file / --set."
            }
            Error::TransformFailed { .. } => {
                "The variable is set but its value could not be converted. Check its format."
            }
            Error::EnvFile { .. } => "Env files take one KEY=VALUE assignment per line.",
            Error::InvalidAssignment(_) => "Pass inline values as --set KEY=VALUE.",
            Error::Io(_) => "Check that the file exists and is readable.",
            Error::Json(_) => {
                "Invalid JSON in template. Check syntax with 'jq . <file>'."
            }
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Additional structured context (e.g., path, env key).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::InvalidTemplate { path, .. } | Error::UnknownTransform { path, .. } => {
                context.insert("path".to_string(), serde_json::json!(path));
            }
            Error::ConfigurationIncomplete { missing } => {
                context.insert("missing_values".to_string(), serde_json::json!(missing));
            }
            Error::TransformFailed { path, env_key, .. } => {
                context.insert("path".to_string(), serde_json::json!(path));
                context.insert("env_key".to_string(), serde_json::json!(env_key));
            }
            Error::EnvFile { path, .. } => {
                context.insert("file".to_string(), serde_json::json!(path));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl StructuredError {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }

    /// Serialize to pretty JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
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
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incomplete() -> Error {
        Error::ConfigurationIncomplete {
            missing: vec![
                MissingValue::new("db.host", "DB_HOST"),
                MissingValue::new("db.port", "DB_PORT"),
            ],
        }
    }

    #[test]
    fn test_error_code() {
        assert_eq!(incomplete().code(), 20);
        assert_eq!(
            Error::transform_failed("a", "A", "boom").code(),
            30
        );
        assert_eq!(Error::InvalidAssignment("x".into()).code(), 41);
    }

    #[test]
    fn test_error_category() {
        assert_eq!(incomplete().category(), ErrorCategory::Resolution);
        assert_eq!(
            Error::UnknownTransform {
                path: "a".into(),
                name: "hex".into()
            }
            .category(),
            ErrorCategory::Template
        );
    }

    #[test]
    fn test_incomplete_message_joins_lines() {
        assert_eq!(
            incomplete().to_string(),
            "Missing configuration values: \
             environment value DB_HOST is missing from config object at db.host\n\
             environment value DB_PORT is missing from config object at db.port"
        );
    }

    #[test]
    fn test_missing_values_accessor() {
        assert_eq!(incomplete().missing_values().len(), 2);
        assert!(Error::InvalidAssignment("x".into()).missing_values().is_empty());
    }

    #[test]
    fn test_transform_failed_keeps_source() {
        let err = Error::transform_failed("port", "PORT", "not a number");
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("not a number"));
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_structured_error_json() {
        let structured = StructuredError::from(&incomplete());
        let json = structured.to_json();

        assert!(json.contains(r#""code":20"#));
        assert!(json.contains(r#""category":"resolution""#));
        assert!(json.contains(r#""recoverable":true"#));
        assert!(json.contains(r#""envKey":"DB_PORT""#));
    }

    #[test]
    fn test_format_error_human() {
        let formatted = format_error_human(&incomplete(), false);

        assert!(formatted.contains("Configuration Incomplete"));
        assert!(formatted.contains("DB_HOST"));
        assert!(formatted.contains("--env-file"));
        assert!(!formatted.contains("\x1b["));
    }
}
