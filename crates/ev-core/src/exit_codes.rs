//! Exit codes for the enverify CLI.
//!
//! Exit codes communicate the outcome without requiring output parsing, so
//! CI jobs can gate on `enverify check` directly.
//!
//! Exit code ranges:
//! - 0-1: Operational outcomes (complete / incomplete configuration)
//! - 10-19: User errors (fixable by editing inputs)
//! - 20-29: Internal errors

use ev_common::Error;

/// Exit codes for enverify operations.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    // ========================================================================
    // Operational Outcomes (0-1)
    // ========================================================================
    /// Every referenced variable resolved
    Clean = 0,

    /// At least one referenced variable is missing
    Incomplete = 1,

    // ========================================================================
    // User Errors (10-19)
    // ========================================================================
    /// Invalid arguments
    ArgsError = 10,

    /// Template could not be parsed
    TemplateError = 11,

    /// Env file could not be read or parsed
    EnvFileError = 12,

    /// A transform rejected its input
    TransformError = 13,

    // ========================================================================
    // Internal Errors (20-29)
    // ========================================================================
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

    /// Exit code for an incomplete or complete resolution.
    pub fn for_completeness(complete: bool) -> Self {
        if complete {
            ExitCode::Clean
        } else {
            ExitCode::Incomplete
        }
    }

    /// Check if this exit code is a user error (codes 10-19).
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    /// Check if this exit code indicates any error requiring attention.
    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }

    /// Get the code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::Incomplete => "ERR_INCOMPLETE",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::TemplateError => "ERR_TEMPLATE",
            ExitCode::EnvFileError => "ERR_ENV_FILE",
            ExitCode::TransformError => "ERR_TRANSFORM",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::InvalidTemplate { .. } | Error::UnknownTransform { .. } | Error::Json(_) => {
                ExitCode::TemplateError
            }
            Error::ConfigurationIncomplete { .. } => ExitCode::Incomplete,
            Error::TransformFailed { .. } => ExitCode::TransformError,
            Error::EnvFile { .. } => ExitCode::EnvFileError,
            Error::InvalidAssignment(_) => ExitCode::ArgsError,
            Error::Io(_) => ExitCode::IoError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ev_common::MissingValue;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Clean.as_i32(), 0);
        assert_eq!(ExitCode::Incomplete.as_i32(), 1);
        assert_eq!(ExitCode::ArgsError.as_i32(), 10);
        assert_eq!(ExitCode::TransformError.as_i32(), 13);
        assert_eq!(ExitCode::IoError.as_i32(), 21);
    }

    #[test]
    fn test_exit_code_categories() {
        assert!(!ExitCode::Incomplete.is_error());
        assert!(ExitCode::TemplateError.is_user_error());
        assert!(ExitCode::InternalError.is_error());
        assert!(!ExitCode::InternalError.is_user_error());
    }

    #[test]
    fn test_error_mapping() {
        let incomplete = Error::ConfigurationIncomplete {
            missing: vec![MissingValue::new("a", "A")],
        };
        assert_eq!(ExitCode::from(&incomplete), ExitCode::Incomplete);
        assert_eq!(
            ExitCode::from(&Error::transform_failed("port", "PORT", "bad")),
            ExitCode::TransformError
        );
        assert_eq!(
            ExitCode::from(&Error::InvalidAssignment("X".into())),
            ExitCode::ArgsError
        );
        assert_eq!(
            ExitCode::from(&Error::EnvFile {
                path: ".env".into(),
                reason: "unreadable".into()
            }),
            ExitCode::EnvFileError
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ExitCode::Incomplete.to_string(), "ERR_INCOMPLETE (1)");
    }
}
