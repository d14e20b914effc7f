//! Environment mappings.
//!
//! Resolution reads variables through the [`EnvSource`] trait so any in-memory
//! map can serve as the environment. [`Env`] is the owned, layered mapping used
//! by the CLI; plain `HashMap`/`BTreeMap` values work as well.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

/// Read-only access to environment variables.
pub trait EnvSource {
    /// The raw value of `key`, if the variable is defined.
    ///
    /// Empty values are returned as-is; the resolvers decide that an empty
    /// string counts as missing.
    fn var(&self, key: &str) -> Option<&str>;
}

/// A value stored in an environment map.
///
/// Implemented for owned and borrowed strings and their `Option` forms, so maps
/// that model "defined but unset" (`Option<String>`) can be used directly.
pub trait EnvValue {
    /// The value as text, or `None` when unset.
    fn as_env_str(&self) -> Option<&str>;
}

impl EnvValue for String {
    fn as_env_str(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl EnvValue for &str {
    fn as_env_str(&self) -> Option<&str> {
        Some(*self)
    }
}

impl EnvValue for Option<String> {
    fn as_env_str(&self) -> Option<&str> {
        self.as_deref()
    }
}

impl EnvValue for Option<&str> {
    fn as_env_str(&self) -> Option<&str> {
        *self
    }
}

impl<K, V, S> EnvSource for HashMap<K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: EnvValue,
    S: BuildHasher,
{
    fn var(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(EnvValue::as_env_str)
    }
}

impl<K, V> EnvSource for BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: EnvValue,
{
    fn var(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(EnvValue::as_env_str)
    }
}

impl<T: EnvSource + ?Sized> EnvSource for &T {
    fn var(&self, key: &str) -> Option<&str> {
        (**self).var(key)
    }
}

/// An owned environment mapping.
///
/// Layers merge left to right: a variable set by a later layer replaces the
/// value from an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Env {
    vars: BTreeMap<String, String>,
}

impl Env {
    /// An empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an environment from key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs.into_iter().collect()
    }

    /// Build an environment from ordered layers, later layers winning.
    pub fn layered<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = Env>,
    {
        let mut env = Env::new();
        for layer in layers {
            env.merge(layer);
        }
        env
    }

    /// Set a variable, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.vars.insert(key.into(), value.into())
    }

    /// Remove a variable, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }

    /// Overlay `other` on top of this environment.
    pub fn merge(&mut self, other: Env) {
        self.vars.extend(other.vars);
    }

    /// Whether `key` is defined (even if empty).
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Number of defined variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether no variables are defined.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate variables in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl EnvSource for Env {
    fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Env {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Env {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.vars
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_from_pairs() {
        let env = Env::from_pairs([("A", "1"), ("B", "2")]);
        assert_eq!(env.var("A"), Some("1"));
        assert_eq!(env.var("C"), None);
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn test_layered_later_wins() {
        let base = Env::from_pairs([("A", "base"), ("B", "base")]);
        let overlay = Env::from_pairs([("B", "overlay"), ("C", "overlay")]);
        let env = Env::layered([base, overlay]);

        assert_eq!(env.var("A"), Some("base"));
        assert_eq!(env.var("B"), Some("overlay"));
        assert_eq!(env.var("C"), Some("overlay"));
    }

    #[test]
    fn test_empty_value_is_still_defined() {
        let mut env = Env::new();
        env.set("EMPTY", "");
        assert!(env.contains("EMPTY"));
        assert_eq!(env.var("EMPTY"), Some(""));
    }

    #[test]
    fn test_std_maps_are_sources() {
        let mut hash: HashMap<&str, &str> = HashMap::new();
        hash.insert("A", "1");
        assert_eq!(hash.var("A"), Some("1"));

        let mut tree: BTreeMap<String, Option<String>> = BTreeMap::new();
        tree.insert("SET".into(), Some("x".into()));
        tree.insert("UNSET".into(), None);
        assert_eq!(tree.var("SET"), Some("x"));
        assert_eq!(tree.var("UNSET"), None);
        assert_eq!(tree.var("ABSENT"), None);
    }

    #[test]
    fn test_iter_is_sorted() {
        let env = Env::from_pairs([("B", "2"), ("A", "1")]);
        let keys: Vec<_> = env.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["A", "B"]);
    }
}
