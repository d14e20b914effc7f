//! JSON templates.
//!
//! Grammar for a template node (a JSON object):
//!
//! | JSON value                           | entry                         |
//! |--------------------------------------|-------------------------------|
//! | `"DB_HOST"`                          | environment reference         |
//! | `{"$secret": "DB_PASSWORD"}`         | secret reference              |
//! | `{"$insert": <any JSON>}`            | literal                       |
//! | `{"$env": "PORT", "$as": "int"}`     | transform via the registry    |
//! | `{"$env": "PORT"}`                   | environment reference         |
//! | `["PORT", "int"]`                    | transform tuple (legacy form) |
//! | any other object                     | nested template               |
//!
//! Objects either consist only of `$` directive keys or contain none.

use crate::template::{join_path, Entry, Template};
use crate::transforms::TransformRegistry;
use ev_common::{Error, Result};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

const SECRET: &str = "$secret";
const INSERT: &str = "$insert";
const ENV: &str = "$env";
const AS: &str = "$as";

/// Path used in errors about the template root.
const ROOT: &str = "$";

impl Template {
    /// Build a template from a JSON object.
    pub fn from_json(value: &Value, registry: &TransformRegistry) -> Result<Template> {
        match value {
            Value::Object(map) => {
                if is_directive(map) {
                    return Err(invalid(ROOT, "template root cannot be a directive"));
                }
                parse_node(map, "", registry)
            }
            _ => Err(invalid(ROOT, "template root must be a JSON object")),
        }
    }

    /// Build a template from JSON text.
    pub fn from_json_str(text: &str, registry: &TransformRegistry) -> Result<Template> {
        let value: Value = serde_json::from_str(text)?;
        Template::from_json(&value, registry)
    }
}

/// Load a JSON template from a file.
pub fn load_template(path: &Path, registry: &TransformRegistry) -> Result<Template> {
    let text = std::fs::read_to_string(path)?;
    let template = Template::from_json_str(&text, registry)?;
    debug!(path = %path.display(), keys = template.len(), "loaded template");
    Ok(template)
}

fn parse_node(map: &Map<String, Value>, prefix: &str, registry: &TransformRegistry) -> Result<Template> {
    let mut template = Template::new();
    for (key, value) in map {
        let path = join_path(prefix, key);
        // '.' separates path segments, a dotted key could not be addressed
        if key.contains('.') {
            return Err(invalid(&path, "keys cannot contain '.'"));
        }
        template.set(key.as_str(), parse_entry(value, &path, registry)?);
    }
    Ok(template)
}

fn parse_entry(value: &Value, path: &str, registry: &TransformRegistry) -> Result<Entry> {
    match value {
        Value::String(env_key) => Ok(Entry::env(env_key.as_str())),
        Value::Array(items) => match items.as_slice() {
            [Value::String(env_key), Value::String(name)] => transform_entry(env_key, name, path, registry),
            _ => Err(invalid(path, "arrays must be [\"ENV_KEY\", \"transform\"] pairs")),
        },
        Value::Object(map) if is_directive(map) => parse_directive(map, path, registry),
        Value::Object(map) => Ok(Entry::Nested(parse_node(map, path, registry)?)),
        Value::Null | Value::Bool(_) | Value::Number(_) => Err(invalid(
            path,
            "literal values must be wrapped as {\"$insert\": ...}",
        )),
    }
}

fn is_directive(map: &Map<String, Value>) -> bool {
    map.keys().any(|key| key.starts_with('$'))
}

fn parse_directive(map: &Map<String, Value>, path: &str, registry: &TransformRegistry) -> Result<Entry> {
    if let Some(key) = map.keys().find(|key| !key.starts_with('$')) {
        return Err(invalid(
            path,
            &format!("directive objects cannot contain config key '{key}'"),
        ));
    }

    if let Some(value) = map.get(INSERT) {
        expect_only(map, &[INSERT], path)?;
        return Ok(Entry::Insert(value.clone()));
    }

    if let Some(value) = map.get(SECRET) {
        expect_only(map, &[SECRET], path)?;
        return match value {
            Value::String(env_key) => Ok(Entry::secret(env_key.as_str())),
            _ => Err(invalid(path, "$secret must name an environment variable")),
        };
    }

    if let Some(value) = map.get(ENV) {
        expect_only(map, &[ENV, AS], path)?;
        let Value::String(env_key) = value else {
            return Err(invalid(path, "$env must name an environment variable"));
        };
        return match map.get(AS) {
            None => Ok(Entry::env(env_key.as_str())),
            Some(Value::String(name)) => transform_entry(env_key, name, path, registry),
            Some(_) => Err(invalid(path, "$as must name a transform")),
        };
    }

    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    Err(invalid(path, &format!("unknown directive {}", keys.join(", "))))
}

fn expect_only(map: &Map<String, Value>, allowed: &[&str], path: &str) -> Result<()> {
    match map.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(extra) => Err(invalid(path, &format!("unexpected directive key '{extra}'"))),
        None => Ok(()),
    }
}

fn transform_entry(env_key: &str, name: &str, path: &str, registry: &TransformRegistry) -> Result<Entry> {
    registry
        .build(name, env_key)
        .map(Entry::Transform)
        .ok_or_else(|| Error::UnknownTransform {
            path: path.to_string(),
            name: name.to_string(),
        })
}

fn invalid(path: &str, reason: &str) -> Error {
    Error::InvalidTemplate {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}
