//! Public entry points.
//!
//! [`verify`] resolves everything it can and reports what it could not;
//! [`strict_verify`] turns any missing value into a single
//! [`Error::ConfigurationIncomplete`].

use crate::env::EnvSource;
use crate::resolved::{ResolvedConfig, VerifiedConfig};
use crate::template::Template;
use crate::walker::walk;
use ev_common::{missing_value_messages, Error, MissingValue, Result};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use tracing::debug;

/// Result of a permissive resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The resolved tree, with `Missing` where lookups failed.
    pub config: ResolvedConfig,
    /// Every failed lookup, in walk order.
    pub missing_values: Vec<MissingValue>,
}

impl Resolution {
    /// Whether every lookup succeeded.
    pub fn is_complete(&self) -> bool {
        self.missing_values.is_empty()
    }

    /// Human-readable messages, one per missing value, in the same order.
    pub fn missing_value_messages(&self) -> Vec<String> {
        missing_value_messages(&self.missing_values)
    }

    /// Convert into a verified config, failing if anything is missing.
    pub fn into_verified(self) -> Result<VerifiedConfig> {
        if !self.missing_values.is_empty() {
            return Err(Error::ConfigurationIncomplete {
                missing: self.missing_values,
            });
        }
        VerifiedConfig::try_new(self.config).ok_or_else(|| Error::ConfigurationIncomplete {
            missing: Vec::new(),
        })
    }
}

impl Serialize for Resolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Resolution", 3)?;
        state.serialize_field("config", &self.config)?;
        state.serialize_field("missingValues", &self.missing_values)?;
        state.serialize_field("missingValueMessages", &self.missing_value_messages())?;
        state.end()
    }
}

/// Resolve a template, collecting every missing value.
///
/// Only a failing transform returns `Err`; missing variables are reported in
/// [`Resolution::missing_values`].
pub fn verify<E: EnvSource + ?Sized>(template: &Template, env: &E) -> Result<Resolution> {
    let resolution = walk(template, env, "")?;
    debug!(
        keys = resolution.config.len(),
        missing = resolution.missing_values.len(),
        "template resolved"
    );
    Ok(resolution)
}

/// Resolve a template, failing unless every value is present.
pub fn strict_verify<E: EnvSource + ?Sized>(template: &Template, env: &E) -> Result<VerifiedConfig> {
    verify(template, env)?.into_verified()
}
