//! Configuration templates.
//!
//! A [`Template`] is a tree of string keys. Every value is an [`Entry`]: a leaf
//! directive describing how to produce one configuration value, or a nested
//! template. Templates are immutable inputs to resolution and can be shared
//! across threads.

use ev_common::TransformError;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Signature of a transform applied to a resolved environment value.
pub type TransformFn = dyn Fn(&str) -> Result<Value, TransformError> + Send + Sync;

/// Join a template path prefix and a key (`"db" + "host"` → `"db.host"`).
///
/// Keys are not escaped, so a key containing `.` yields an ambiguous path.
pub fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// An environment variable paired with a function that converts its value.
#[derive(Clone)]
pub struct Transform {
    env_key: String,
    func: Arc<TransformFn>,
}

impl Transform {
    /// Create a transform from a fallible conversion.
    ///
    /// The output is stored as JSON; a value that cannot be represented as
    /// JSON is reported as a transform failure.
    pub fn new<F, T, E>(env_key: impl Into<String>, f: F) -> Self
    where
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
        T: Serialize + 'static,
        E: Into<TransformError> + 'static,
    {
        Self::from_shared(env_key, into_json_fn(f))
    }

    /// Create a transform from a conversion that cannot fail.
    pub fn infallible<F, T>(env_key: impl Into<String>, f: F) -> Self
    where
        F: Fn(&str) -> T + Send + Sync + 'static,
        T: Serialize + 'static,
    {
        Self::new(env_key, move |raw: &str| Ok::<T, TransformError>(f(raw)))
    }

    /// Create a transform around an already shared function.
    pub fn from_shared(env_key: impl Into<String>, func: Arc<TransformFn>) -> Self {
        Self {
            env_key: env_key.into(),
            func,
        }
    }

    /// The environment variable this transform reads.
    pub fn env_key(&self) -> &str {
        &self.env_key
    }

    /// Apply the conversion to a resolved value.
    pub fn apply(&self, raw: &str) -> Result<Value, TransformError> {
        (self.func)(raw)
    }
}

impl std::fmt::Debug for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transform")
            .field("env_key", &self.env_key)
            .finish_non_exhaustive()
    }
}

pub(crate) fn into_json_fn<F, T, E>(f: F) -> Arc<TransformFn>
where
    F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    T: Serialize + 'static,
    E: Into<TransformError> + 'static,
{
    Arc::new(move |raw: &str| -> Result<Value, TransformError> {
        let output = f(raw).map_err(Into::<TransformError>::into)?;
        Ok(serde_json::to_value(output)?)
    })
}

/// Build a reusable transform factory.
///
/// The returned closure turns an environment variable name into a transform
/// entry sharing the same conversion, so one parser can be applied to many
/// variables:
///
/// ```
/// use ev_config::{transform_fn, Template};
///
/// let flag = transform_fn(|raw: &str| Ok::<_, std::convert::Infallible>(raw == "true"));
/// let template = Template::new()
///     .with("feature_a", flag("FEATURE_A"))
///     .with("feature_b", flag("FEATURE_B"));
/// assert_eq!(template.len(), 2);
/// ```
pub fn transform_fn<F, T, E>(f: F) -> impl Fn(&str) -> Entry
where
    F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    T: Serialize + 'static,
    E: Into<TransformError> + 'static,
{
    let func = into_json_fn(f);
    move |env_key: &str| Entry::Transform(Transform::from_shared(env_key, Arc::clone(&func)))
}

/// One value of a template node.
#[derive(Debug, Clone)]
pub enum Entry {
    /// Resolve by direct lookup of the named variable.
    EnvRef(String),
    /// Resolve the variable, then convert it.
    Transform(Transform),
    /// A literal value; needs no environment.
    Insert(Value),
    /// Resolve the variable and wrap it in a [`Secret`](ev_redact::Secret).
    Secret(String),
    /// A nested template.
    Nested(Template),
}

impl Entry {
    /// Reference an environment variable.
    pub fn env(env_key: impl Into<String>) -> Self {
        Entry::EnvRef(env_key.into())
    }

    /// Reference an environment variable whose value must stay redacted.
    pub fn secret(env_key: impl Into<String>) -> Self {
        Entry::Secret(env_key.into())
    }

    /// Insert a literal value.
    pub fn insert(value: impl Into<Value>) -> Self {
        Entry::Insert(value.into())
    }

    /// Reference an environment variable and convert its value.
    pub fn transform<F, T, E>(env_key: impl Into<String>, f: F) -> Self
    where
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
        T: Serialize + 'static,
        E: Into<TransformError> + 'static,
    {
        Entry::Transform(Transform::new(env_key, f))
    }

    /// The kind of this entry.
    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::EnvRef(_) => EntryKind::EnvRef,
            Entry::Transform(_) => EntryKind::Transform,
            Entry::Insert(_) => EntryKind::Insert,
            Entry::Secret(_) => EntryKind::Secret,
            Entry::Nested(_) => EntryKind::Nested,
        }
    }

    /// The environment variable a leaf reads, if any.
    pub fn env_key(&self) -> Option<&str> {
        match self {
            Entry::EnvRef(key) | Entry::Secret(key) => Some(key),
            Entry::Transform(transform) => Some(transform.env_key()),
            Entry::Insert(_) | Entry::Nested(_) => None,
        }
    }
}

impl From<&str> for Entry {
    fn from(env_key: &str) -> Self {
        Entry::EnvRef(env_key.to_string())
    }
}

impl From<String> for Entry {
    fn from(env_key: String) -> Self {
        Entry::EnvRef(env_key)
    }
}

impl From<Template> for Entry {
    fn from(template: Template) -> Self {
        Entry::Nested(template)
    }
}

impl From<Transform> for Entry {
    fn from(transform: Transform) -> Self {
        Entry::Transform(transform)
    }
}

/// Legacy `(env_key, function)` pairs become infallible transforms.
impl<F, T> From<(&str, F)> for Entry
where
    F: Fn(&str) -> T + Send + Sync + 'static,
    T: Serialize + 'static,
{
    fn from((env_key, f): (&str, F)) -> Self {
        Entry::Transform(Transform::infallible(env_key, f))
    }
}

/// Entry kinds, as reported by diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    EnvRef,
    Transform,
    Insert,
    Secret,
    Nested,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::EnvRef => write!(f, "env"),
            EntryKind::Transform => write!(f, "transform"),
            EntryKind::Insert => write!(f, "insert"),
            EntryKind::Secret => write!(f, "secret"),
            EntryKind::Nested => write!(f, "nested"),
        }
    }
}

/// An environment variable referenced somewhere in a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvKeyRef {
    /// Dot-joined path of the leaf.
    pub path: String,
    /// Variable name.
    pub env_key: String,
    /// Leaf kind.
    pub kind: EntryKind,
}

/// A node of a configuration template.
///
/// Keys are kept sorted, so every walk over the same template visits leaves in
/// the same order.
#[derive(Debug, Clone, Default)]
pub struct Template {
    entries: BTreeMap<String, Entry>,
}

impl Template {
    /// An empty template.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, replacing any existing entry under `key`.
    ///
    /// `key` should not contain `.`: paths in missing-value reports and
    /// [`ResolvedConfig::get_path`](crate::ResolvedConfig::get_path) are
    /// dot-joined. JSON templates reject such keys.
    pub fn with(mut self, key: impl Into<String>, entry: impl Into<Entry>) -> Self {
        self.entries.insert(key.into(), entry.into());
        self
    }

    /// Add an environment reference.
    pub fn env(self, key: impl Into<String>, env_key: impl Into<String>) -> Self {
        self.with(key, Entry::env(env_key))
    }

    /// Add a secret reference.
    pub fn secret(self, key: impl Into<String>, env_key: impl Into<String>) -> Self {
        self.with(key, Entry::secret(env_key))
    }

    /// Add a literal value.
    pub fn insert(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(key, Entry::insert(value))
    }

    /// Add a transformed environment reference.
    pub fn transform<F, T, E>(
        self,
        key: impl Into<String>,
        env_key: impl Into<String>,
        f: F,
    ) -> Self
    where
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
        T: Serialize + 'static,
        E: Into<TransformError> + 'static,
    {
        self.with(key, Entry::transform(env_key, f))
    }

    /// Add a nested template.
    pub fn nested(self, key: impl Into<String>, template: Template) -> Self {
        self.with(key, Entry::Nested(template))
    }

    /// Set an entry in place, returning the one it replaced.
    pub fn set(&mut self, key: impl Into<String>, entry: impl Into<Entry>) -> Option<Entry> {
        self.entries.insert(key.into(), entry.into())
    }

    /// The entry under `key`.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys of this node in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries in this node.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this node has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every environment variable the template reads, depth first.
    pub fn env_keys(&self) -> Vec<EnvKeyRef> {
        let mut refs = Vec::new();
        collect_env_keys(self, "", &mut refs);
        refs
    }
}

fn collect_env_keys(template: &Template, prefix: &str, refs: &mut Vec<EnvKeyRef>) {
    for (key, entry) in template.iter() {
        let path = join_path(prefix, key);
        match entry {
            Entry::Nested(child) => collect_env_keys(child, &path, refs),
            leaf => {
                if let Some(env_key) = leaf.env_key() {
                    refs.push(EnvKeyRef {
                        path,
                        env_key: env_key.to_string(),
                        kind: leaf.kind(),
                    });
                }
            }
        }
    }
}

impl<K: Into<String>, E: Into<Entry>> FromIterator<(K, E)> for Template {
    fn from_iter<I: IntoIterator<Item = (K, E)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, e)| (k.into(), e.into()))
                .collect(),
        }
    }
}
