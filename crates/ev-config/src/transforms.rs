//! Built-in named transforms.
//!
//! Templates loaded from JSON cannot carry closures, so transforms there are
//! referenced by name and looked up in a [`TransformRegistry`]. Parse errors
//! never echo the input: the value being parsed may be sensitive.

use crate::template::{into_json_fn, Transform, TransformFn};
use ev_common::TransformError;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by the built-in transforms.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected a boolean (true/false, yes/no, on/off, 1/0)")]
    Bool,

    #[error("expected an integer")]
    Int,

    #[error("expected a number")]
    Float,

    #[error("expected JSON: {0}")]
    Json(String),
}

/// Parse a boolean flag, case-insensitively.
pub fn parse_bool(raw: &str) -> Result<bool, ParseError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ParseError::Bool),
    }
}

/// Parse a signed 64-bit integer.
pub fn parse_int(raw: &str) -> Result<i64, ParseError> {
    raw.trim().parse().map_err(|_| ParseError::Int)
}

/// Parse a finite floating point number.
pub fn parse_float(raw: &str) -> Result<f64, ParseError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ParseError::Float),
    }
}

/// Split a comma-separated list, trimming items and dropping empty ones.
pub fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a JSON document.
pub fn parse_json(raw: &str) -> Result<Value, ParseError> {
    // serde_json reports position only, never the offending text
    serde_json::from_str(raw).map_err(|e| ParseError::Json(e.to_string()))
}

/// Named transforms available to JSON templates.
#[derive(Clone)]
pub struct TransformRegistry {
    transforms: BTreeMap<String, Arc<TransformFn>>,
}

impl TransformRegistry {
    /// A registry with no transforms.
    pub fn empty() -> Self {
        Self {
            transforms: BTreeMap::new(),
        }
    }

    /// A registry holding the built-in transforms:
    /// `bool`, `int`, `float`, `csv`, `json` and `string`.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("bool", parse_bool);
        registry.register("int", parse_int);
        registry.register("float", parse_float);
        registry.register("csv", |raw: &str| Ok::<_, ParseError>(parse_csv(raw)));
        registry.register("json", parse_json);
        registry.register("string", |raw: &str| Ok::<_, ParseError>(raw.to_string()));
        registry
    }

    /// Register (or replace) a named transform.
    pub fn register<F, T, E>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
        T: Serialize + 'static,
        E: Into<TransformError> + 'static,
    {
        self.transforms.insert(name.into(), into_json_fn(f));
    }

    /// Build a transform entry reading `env_key` through the named transform.
    pub fn build(&self, name: &str, env_key: impl Into<String>) -> Option<Transform> {
        self.transforms
            .get(name)
            .map(|func| Transform::from_shared(env_key, Arc::clone(func)))
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.transforms.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.transforms.keys().map(String::as_str)
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Ok(true));
        assert_eq!(parse_bool(" YES "), Ok(true));
        assert_eq!(parse_bool("0"), Ok(false));
        assert_eq!(parse_bool("Off"), Ok(false));
        assert_eq!(parse_bool("maybe"), Err(ParseError::Bool));
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_int("-42"), Ok(-42));
        assert_eq!(parse_int("4.2"), Err(ParseError::Int));
        assert_eq!(parse_float("2.5"), Ok(2.5));
        assert_eq!(parse_float("NaN"), Err(ParseError::Float));
    }

    #[test]
    fn test_parse_csv() {
        assert_eq!(
            parse_csv("localhost, 127.0.0.1,,8.8.8.8 "),
            vec!["localhost", "127.0.0.1", "8.8.8.8"]
        );
        assert!(parse_csv("").is_empty());
    }

    #[test]
    fn test_parse_error_does_not_echo_input() {
        let err = parse_json("{\"token\": hunter2}").unwrap_err();
        assert!(!err.to_string().contains("hunter2"));
        assert!(!ParseError::Int.to_string().contains("hunter2"));
    }

    #[test]
    fn test_builtin_registry() {
        let registry = TransformRegistry::builtin();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["bool", "csv", "float", "int", "json", "string"]);

        let hosts = registry.build("csv", "HOSTS").unwrap();
        assert_eq!(hosts.env_key(), "HOSTS");
        assert_eq!(hosts.apply("a,b").unwrap(), json!(["a", "b"]));
        assert!(registry.build("hex", "X").is_none());
    }

    #[test]
    fn test_register_custom() {
        let mut registry = TransformRegistry::empty();
        registry.register("upper", |raw: &str| {
            Ok::<_, ParseError>(raw.to_uppercase())
        });
        assert!(registry.contains("upper"));
        let transform = registry.build("upper", "NAME").unwrap();
        assert_eq!(transform.apply("app").unwrap(), json!("APP"));
    }
}
