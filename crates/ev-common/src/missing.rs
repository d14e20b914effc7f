//! Missing-value records.
//!
//! A [`MissingValue`] is produced whenever an environment lookup finds no usable
//! value. The record is structured data; the human-readable message is only
//! formatted when a report is rendered.

use serde::{Deserialize, Serialize};

/// One failed environment lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingValue {
    /// Dot-joined template keys from the root to the failing leaf.
    pub path: String,
    /// Name of the environment variable that was absent or empty.
    pub env_key: String,
}

impl MissingValue {
    /// Create a record for `env_key` missing at `path`.
    pub fn new(path: impl Into<String>, env_key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            env_key: env_key.into(),
        }
    }

    /// Human-readable message for this record.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for MissingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "environment value {} is missing from config object at {}",
            self.env_key, self.path
        )
    }
}

/// Messages for a list of records, in the same order.
pub fn missing_value_messages(missing: &[MissingValue]) -> Vec<String> {
    missing.iter().map(MissingValue::message).collect()
}
