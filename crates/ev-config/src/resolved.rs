//! Resolved configuration trees.
//!
//! A [`ResolvedConfig`] has the same shape as the template it was produced
//! from: every key of every template node is present, with its leaf replaced by
//! a [`ResolvedValue`]. Serializing a resolved tree never exposes secrets.

use ev_redact::Secret;
use serde::ser::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::ops::Deref;

/// The resolved value of one template entry.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    /// The environment variable was absent or empty.
    Missing,
    /// The raw value of an environment reference.
    Text(String),
    /// A secret, possibly absent.
    Secret(Secret),
    /// An inserted literal or the output of a transform.
    Value(Value),
    /// A nested node.
    Node(ResolvedConfig),
}

impl ResolvedValue {
    /// Whether this leaf lacks a value. Absent secrets count as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            ResolvedValue::Missing => true,
            ResolvedValue::Secret(secret) => !secret.is_present(),
            _ => false,
        }
    }

    /// Text of an environment reference or a string literal.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ResolvedValue::Text(text) => Some(text),
            ResolvedValue::Value(Value::String(text)) => Some(text),
            _ => None,
        }
    }

    /// The secret handle, if this is a secret leaf.
    pub fn as_secret(&self) -> Option<&Secret> {
        match self {
            ResolvedValue::Secret(secret) => Some(secret),
            _ => None,
        }
    }

    /// The JSON value of an inserted or transformed leaf.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            ResolvedValue::Value(value) => Some(value),
            _ => None,
        }
    }

    /// The nested node, if any.
    pub fn as_node(&self) -> Option<&ResolvedConfig> {
        match self {
            ResolvedValue::Node(node) => Some(node),
            _ => None,
        }
    }
}

impl Serialize for ResolvedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ResolvedValue::Missing => serializer.serialize_none(),
            ResolvedValue::Text(text) => serializer.serialize_str(text),
            ResolvedValue::Secret(secret) => secret.serialize(serializer),
            ResolvedValue::Value(value) => value.serialize(serializer),
            ResolvedValue::Node(node) => node.serialize(serializer),
        }
    }
}

impl From<Secret> for ResolvedValue {
    fn from(secret: Secret) -> Self {
        ResolvedValue::Secret(secret)
    }
}

impl From<ResolvedConfig> for ResolvedValue {
    fn from(node: ResolvedConfig) -> Self {
        ResolvedValue::Node(node)
    }
}

/// A resolved template node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedConfig {
    entries: BTreeMap<String, ResolvedValue>,
}

impl ResolvedConfig {
    /// An empty node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: ResolvedValue) {
        self.entries.insert(key.into(), value);
    }

    /// The value under `key` in this node.
    pub fn get(&self, key: &str) -> Option<&ResolvedValue> {
        self.entries.get(key)
    }

    /// The value at a dot-joined path, e.g. `"db.credentials.password"`.
    ///
    /// Entries whose key contains `.` cannot be reached this way; use
    /// [`get`](Self::get) on each node instead.
    pub fn get_path(&self, path: &str) -> Option<&ResolvedValue> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = current.as_node()?.get(segment)?;
        }
        Some(current)
    }

    /// Keys of this node in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries in this node.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this node has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether no leaf anywhere below this node is missing.
    pub fn is_complete(&self) -> bool {
        self.entries.values().all(|value| match value {
            ResolvedValue::Node(node) => node.is_complete(),
            leaf => !leaf.is_missing(),
        })
    }

    /// Redacted JSON rendering of this node.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for ResolvedConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(&self.entries)
    }
}

/// A resolved configuration with no missing leaves.
///
/// Only produced by [`strict_verify`](crate::strict_verify) or
/// [`Resolution::into_verified`](crate::Resolution::into_verified), so every
/// environment reference has text and every secret has a value.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedConfig {
    config: ResolvedConfig,
}

impl VerifiedConfig {
    /// Wrap a config if it is complete.
    pub fn try_new(config: ResolvedConfig) -> Option<Self> {
        config.is_complete().then_some(Self { config })
    }

    /// Text at `path`.
    pub fn str_at(&self, path: &str) -> Option<&str> {
        self.config.get_path(path)?.as_str()
    }

    /// Secret at `path`.
    pub fn secret_at(&self, path: &str) -> Option<&Secret> {
        self.config.get_path(path)?.as_secret()
    }

    /// JSON value of an inserted or transformed leaf at `path`.
    pub fn value_at(&self, path: &str) -> Option<&Value> {
        self.config.get_path(path)?.as_value()
    }

    /// Unwrap into the underlying tree.
    pub fn into_inner(self) -> ResolvedConfig {
        self.config
    }
}

impl Deref for VerifiedConfig {
    type Target = ResolvedConfig;

    fn deref(&self) -> &ResolvedConfig {
        &self.config
    }
}

impl Serialize for VerifiedConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.config.serialize(serializer)
    }
}
