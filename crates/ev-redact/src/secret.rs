//! The secret handle type.

use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, Serializer};

/// Text emitted in place of a secret under any implicit conversion.
pub const SECRET_PLACEHOLDER: &str = "[secret]";

/// A resolved value that never appears in formatted or serialized output.
///
/// A secret may be absent when its environment variable was missing; the
/// handle still exists so the resolved tree keeps its shape, but
/// [`reveal`](Secret::reveal) returns `None`.
#[derive(Default)]
pub struct Secret {
    inner: Option<SecretString>,
}

impl Secret {
    /// Wrap a resolved value.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: Some(SecretString::from(value.into())),
        }
    }

    /// A secret whose value could not be resolved.
    pub fn absent() -> Self {
        Self { inner: None }
    }

    /// Wrap an optional value; `None` yields an absent secret.
    pub fn from_option(value: Option<String>) -> Self {
        value.map_or_else(Self::absent, Self::new)
    }

    /// Return the raw value.
    pub fn reveal(&self) -> Option<&str> {
        self.inner.as_ref().map(|s| s.expose_secret())
    }

    /// Whether a value was resolved.
    pub fn is_present(&self) -> bool {
        self.inner.is_some()
    }
}

impl Clone for Secret {
    fn clone(&self) -> Self {
        Self {
            inner: self
                .inner
                .as_ref()
                .map(|s| SecretString::from(s.expose_secret().to_owned())),
        }
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.reveal() == other.reveal()
    }
}

impl Eq for Secret {}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(SECRET_PLACEHOLDER)
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(SECRET_PLACEHOLDER)
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(SECRET_PLACEHOLDER)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reveal_returns_raw_value() {
        let secret = Secret::new("hunter2");
        assert_eq!(secret.reveal(), Some("hunter2"));
        assert!(secret.is_present());
    }

    #[test]
    fn test_display_and_debug_are_redacted() {
        let secret = Secret::new("hunter2");
        assert_eq!(format!("{secret}"), "[secret]");
        assert_eq!(format!("{secret:?}"), "[secret]");
        assert_eq!(format!("{secret:#?}"), "[secret]");
    }

    #[test]
    fn test_absent_secret() {
        let secret = Secret::absent();
        assert_eq!(secret.reveal(), None);
        assert!(!secret.is_present());
        assert_eq!(secret.to_string(), SECRET_PLACEHOLDER);
        assert_eq!(Secret::from_option(None), Secret::absent());
    }

    #[test]
    fn test_clone_keeps_value() {
        let secret = Secret::new("hunter2");
        let cloned = secret.clone();
        assert_eq!(cloned.reveal(), Some("hunter2"));
        assert_eq!(cloned, secret);
    }
}
