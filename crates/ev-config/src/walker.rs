//! Recursive template walker.
//!
//! Visits each key of a node once, in key order. Leaves go to the matching
//! resolver; nested templates recurse with the key appended to the path. The
//! per-key results are merged into one node and one list of missing values.

use crate::env::EnvSource;
use crate::resolved::{ResolvedConfig, ResolvedValue};
use crate::resolvers::{
    resolve_env_ref, resolve_insert, resolve_secret, resolve_transform, Lookup, Outcome,
};
use crate::template::{join_path, Entry, Template};
use crate::verify::Resolution;
use ev_common::Result;
use tracing::trace;

/// Resolve `template` against `env`, reporting paths under `prefix`.
///
/// Missing values never stop the walk. A transform error does, and is
/// returned as-is.
pub fn walk<E: EnvSource + ?Sized>(template: &Template, env: &E, prefix: &str) -> Result<Resolution> {
    let mut config = ResolvedConfig::new();
    let mut missing_values = Vec::new();

    for (key, entry) in template.iter() {
        let path = join_path(prefix, key);
        let outcome = resolve_entry(entry, env, &path)?;

        trace!(
            path = %path,
            kind = %entry.kind(),
            missing = outcome.missing.len(),
            "resolved template entry"
        );

        config.insert(key, outcome.value);
        missing_values.extend(outcome.missing);
    }

    Ok(Resolution {
        config,
        missing_values,
    })
}

fn resolve_entry<E: EnvSource + ?Sized>(entry: &Entry, env: &E, path: &str) -> Result<Outcome> {
    let lookup = Lookup::new(env, path);
    let outcome = match entry {
        Entry::Secret(env_key) => resolve_secret(&lookup, env_key),
        Entry::Insert(value) => resolve_insert(value),
        Entry::Transform(transform) => resolve_transform(&lookup, transform)?,
        Entry::EnvRef(env_key) => resolve_env_ref(&lookup, env_key),
        Entry::Nested(child) => {
            let nested = walk(child, env, path)?;
            Outcome {
                value: ResolvedValue::Node(nested.config),
                missing: nested.missing_values,
            }
        }
    };
    Ok(outcome)
}
