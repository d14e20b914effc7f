//! Leaf resolvers.
//!
//! One resolver per leaf kind. Each takes a [`Lookup`] already bound to the
//! leaf's path and returns an [`Outcome`]: the resolved value plus any missing
//! value records. Only a failing transform turns into an `Err`.

use crate::env::EnvSource;
use crate::resolved::ResolvedValue;
use crate::template::Transform;
use ev_common::{Error, MissingValue, Result};
use ev_redact::Secret;
use serde_json::Value;
use tracing::debug;

/// A resolved leaf and the lookups that failed while resolving it.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub value: ResolvedValue,
    pub missing: Vec<MissingValue>,
}

impl Outcome {
    /// A leaf resolved without failures.
    pub fn resolved(value: ResolvedValue) -> Self {
        Self {
            value,
            missing: Vec::new(),
        }
    }

    /// A leaf whose lookup failed.
    pub fn missing(value: ResolvedValue, record: MissingValue) -> Self {
        Self {
            value,
            missing: vec![record],
        }
    }
}

/// Environment lookup bound to the path of the leaf being resolved.
pub struct Lookup<'a, E: EnvSource + ?Sized> {
    env: &'a E,
    path: &'a str,
}

impl<'a, E: EnvSource + ?Sized> Lookup<'a, E> {
    pub fn new(env: &'a E, path: &'a str) -> Self {
        Self { env, path }
    }

    /// Path of the leaf this lookup reports against.
    pub fn path(&self) -> &str {
        self.path
    }

    /// The non-empty value of `env_key`, or a record of its absence.
    pub fn get(&self, env_key: &str) -> std::result::Result<&'a str, MissingValue> {
        match self.env.var(env_key) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => {
                debug!(path = %self.path, env_key = %env_key, "environment value missing");
                Err(MissingValue::new(self.path, env_key))
            }
        }
    }
}

/// Resolve a plain environment reference.
pub fn resolve_env_ref<E: EnvSource + ?Sized>(lookup: &Lookup<'_, E>, env_key: &str) -> Outcome {
    match lookup.get(env_key) {
        Ok(value) => Outcome::resolved(ResolvedValue::Text(value.to_string())),
        Err(record) => Outcome::missing(ResolvedValue::Missing, record),
    }
}

/// Resolve a transformed reference.
///
/// The transform only runs on a present value. An error from the transform
/// aborts resolution and is returned with the leaf's path.
pub fn resolve_transform<E: EnvSource + ?Sized>(
    lookup: &Lookup<'_, E>,
    transform: &Transform,
) -> Result<Outcome> {
    match lookup.get(transform.env_key()) {
        Ok(raw) => {
            let value = transform
                .apply(raw)
                .map_err(|source| Error::transform_failed(lookup.path(), transform.env_key(), source))?;
            Ok(Outcome::resolved(ResolvedValue::Value(value)))
        }
        Err(record) => Ok(Outcome::missing(ResolvedValue::Missing, record)),
    }
}

/// Resolve an inserted literal.
pub fn resolve_insert(value: &Value) -> Outcome {
    Outcome::resolved(ResolvedValue::Value(value.clone()))
}

/// Resolve a secret reference.
///
/// A missing variable still yields a (absent) secret handle.
pub fn resolve_secret<E: EnvSource + ?Sized>(lookup: &Lookup<'_, E>, env_key: &str) -> Outcome {
    match lookup.get(env_key) {
        Ok(value) => Outcome::resolved(Secret::new(value).into()),
        Err(record) => Outcome::missing(Secret::absent().into(), record),
    }
}
