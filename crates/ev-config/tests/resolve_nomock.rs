//! End-to-end resolution tests against in-memory environments.
//!
//! Covers flat and nested templates, missing-value reporting, transforms,
//! inserted literals, secrets and the strict entry point.

use ev_config::{
    strict_verify, transform_fn, verify, Entry, Env, Error, MissingValue, ResolvedValue, Secret,
    Template,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn missing_template() -> Template {
    Template::new()
        .env("1", "PRESENT")
        .env("2", "MISSING")
        .nested(
            "3",
            Template::new()
                .nested("6", Template::new().env("7", "MISSING"))
                .env("4", "MISSING")
                .env("5", "MISSING"),
        )
}

// ============================================================================
// Plain references
// ============================================================================

#[test]
fn flat_template_resolves_all_values() {
    let env = Env::from_pairs([("DB_HOST", "localhost:3000"), ("DB_NAME", "postgres")]);
    let template = Template::new().env("dbHost", "DB_HOST").env("dbName", "DB_NAME");

    let resolution = verify(&template, &env).unwrap();

    assert_eq!(
        resolution.config.to_json(),
        json!({ "dbHost": "localhost:3000", "dbName": "postgres" })
    );
    assert!(resolution.missing_values.is_empty());
    assert!(resolution.is_complete());
}

#[test]
fn nested_template_resolves_all_values() {
    let env = Env::from_pairs([("c", "C"), ("d", "D"), ("e", "E")]);
    let template = Template::new()
        .nested(
            "1",
            Template::new()
                .nested("2", Template::new().env("3", "c"))
                .env("4", "d"),
        )
        .env("5", "e");

    let resolution = verify(&template, &env).unwrap();

    assert_eq!(
        resolution.config.to_json(),
        json!({ "1": { "2": { "3": "C" }, "4": "D" }, "5": "E" })
    );
}

#[test]
fn std_hashmap_works_as_environment() {
    let mut env = HashMap::new();
    env.insert("HOST".to_string(), "example.org".to_string());
    let template = Template::new().env("host", "HOST");

    let resolution = verify(&template, &env).unwrap();
    assert_eq!(
        resolution.config.get("host").and_then(ResolvedValue::as_str),
        Some("example.org")
    );
}

// ============================================================================
// Missing values
// ============================================================================

#[test]
fn every_missing_value_is_reported_with_its_path() {
    let env = Env::from_pairs([("PRESENT", "present")]);
    let resolution = verify(&missing_template(), &env).unwrap();

    assert_eq!(resolution.missing_values.len(), 4);
    for path in ["2", "3.6.7", "3.4", "3.5"] {
        assert!(
            resolution
                .missing_values
                .contains(&MissingValue::new(path, "MISSING")),
            "no record for {path}"
        );
    }
    assert_eq!(resolution.missing_value_messages().len(), 4);
}

#[test]
fn missing_values_are_in_walk_order() {
    let env = Env::from_pairs([("PRESENT", "present")]);
    let resolution = verify(&missing_template(), &env).unwrap();

    let paths: Vec<_> = resolution
        .missing_values
        .iter()
        .map(|m| m.path.as_str())
        .collect();
    assert_eq!(paths, vec!["2", "3.4", "3.5", "3.6.7"]);
}

#[test]
fn missing_leaves_keep_their_keys() {
    let env = Env::from_pairs([("PRESENT", "present")]);
    let resolution = verify(&missing_template(), &env).unwrap();

    assert_eq!(
        resolution.config.to_json(),
        json!({
            "1": "present",
            "2": null,
            "3": { "4": null, "5": null, "6": { "7": null } }
        })
    );
}

#[test]
fn empty_string_counts_as_missing() {
    let env = Env::from_pairs([("EMPTY", "")]);
    let template = Template::new().env("a", "EMPTY").secret("b", "EMPTY");

    let resolution = verify(&template, &env).unwrap();

    assert_eq!(
        resolution.missing_values,
        vec![MissingValue::new("a", "EMPTY"), MissingValue::new("b", "EMPTY")]
    );
}

#[test]
fn resolution_serializes_with_messages() {
    let env = Env::new();
    let template = Template::new().nested("db", Template::new().env("host", "DB_HOST"));

    let json = serde_json::to_value(verify(&template, &env).unwrap()).unwrap();

    assert_eq!(
        json,
        json!({
            "config": { "db": { "host": null } },
            "missingValues": [{ "path": "db.host", "envKey": "DB_HOST" }],
            "missingValueMessages": [
                "environment value DB_HOST is missing from config object at db.host"
            ]
        })
    );
}

// ============================================================================
// Transforms
// ============================================================================

#[test]
fn transform_output_is_inserted() {
    let env = Env::from_pairs([("PRESENT", "present")]);
    let transformed = json!(["hi", { "there": ["this"] }, "is", "transformed"]);
    let expected = transformed.clone();
    let template = Template::new().with("present", ("PRESENT", move |_: &str| transformed.clone()));

    let resolution = verify(&template, &env).unwrap();

    assert_eq!(
        resolution.config.get("present").and_then(ResolvedValue::as_value),
        Some(&expected)
    );
}

#[test]
fn nested_transform_tuple_passes_value_through() {
    let env = Env::from_pairs([("PRESENT", "present")]);
    let template = Template::new().nested(
        "nested",
        Template::new().with("present", ("PRESENT", |raw: &str| raw.to_string())),
    );

    let resolution = verify(&template, &env).unwrap();

    assert_eq!(
        resolution
            .config
            .get_path("nested.present")
            .and_then(ResolvedValue::as_str),
        Some("present")
    );
}

#[test]
fn transform_is_not_called_for_missing_value() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let template = Template::new().with(
        "missing",
        ("MISSING", move |raw: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            raw.to_string()
        }),
    );

    let resolution = verify(&template, &Env::new()).unwrap();

    assert_eq!(resolution.missing_values.len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn transform_is_not_called_for_empty_value() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let template = Template::new().nested(
        "db",
        Template::new().with(
            "port",
            ("EMPTY", move |raw: &str| {
                counter.fetch_add(1, Ordering::SeqCst);
                raw.len()
            }),
        ),
    );

    let resolution = verify(&template, &Env::from_pairs([("EMPTY", "")])).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        resolution.missing_values,
        vec![MissingValue::new("db.port", "EMPTY")]
    );
}

#[test]
fn transform_factory_is_reusable() {
    let parse_flag = transform_fn(|raw: &str| Ok::<_, std::convert::Infallible>(raw == "true"));
    let template = Template::new().nested(
        "featureFlags",
        Template::new()
            .with("featureA", parse_flag("FEATURE_FLAG_A"))
            .with("featureB", parse_flag("FEATURE_FLAG_B"))
            .with("featureC", parse_flag("FEATURE_FLAG_C")),
    );
    let env = Env::from_pairs([
        ("FEATURE_FLAG_A", "false"),
        ("FEATURE_FLAG_B", "true"),
        ("FEATURE_FLAG_C", "false"),
    ]);

    let config = strict_verify(&template, &env).unwrap();

    assert_eq!(
        config.to_json(),
        json!({ "featureFlags": { "featureA": false, "featureB": true, "featureC": false } })
    );
}

#[test]
fn failing_transform_aborts_resolution() {
    let template = Template::new()
        .transform("port", "PORT", |raw: &str| raw.parse::<u16>())
        .env("zzz", "ALSO_MISSING");
    let env = Env::from_pairs([("PORT", "eighty")]);

    let err = verify(&template, &env).unwrap_err();

    match err {
        Error::TransformFailed { path, env_key, .. } => {
            assert_eq!(path, "port");
            assert_eq!(env_key, "PORT");
        }
        other => panic!("expected a transform failure, got {other}"),
    }
}

// ============================================================================
// Inserted values
// ============================================================================

#[test]
fn inserted_values_are_kept_verbatim() {
    let template = Template::new()
        .insert("nonEnvValue", "nonEnvValue")
        .nested("a", Template::new().insert("nonEnvValue", "nested"))
        .with("limits", Entry::insert(json!({ "max": 3 })));

    let resolution = verify(&template, &Env::new()).unwrap();

    assert!(resolution.missing_values.is_empty());
    assert_eq!(
        resolution.config.to_json(),
        json!({
            "a": { "nonEnvValue": "nested" },
            "limits": { "max": 3 },
            "nonEnvValue": "nonEnvValue"
        })
    );
}

// ============================================================================
// Secrets
// ============================================================================

#[test]
fn secret_is_revealed_explicitly_and_redacted_otherwise() {
    let env = Env::from_pairs([("PASSWORD", "p@ss")]);
    let template = Template::new().secret("password", "PASSWORD");

    let resolution = verify(&template, &env).unwrap();
    let password = resolution
        .config
        .get("password")
        .and_then(ResolvedValue::as_secret)
        .unwrap();

    assert_eq!(password.reveal(), Some("p@ss"));
    assert_eq!(password.to_string(), "[secret]");

    let serialized = serde_json::to_string(&resolution.config).unwrap();
    assert!(serialized.contains("[secret]"));
    assert!(!serialized.contains("p@ss"));
    assert!(!format!("{:?}", resolution.config).contains("p@ss"));
}

#[test]
fn many_nested_secrets_are_redacted() {
    let env = Env::from_pairs([("PASSWORD", "this is a password")]);
    let template = Template::new()
        .nested(
            "hasAPassword",
            Template::new()
                .secret("password", "PASSWORD")
                .secret("password2", "PASSWORD"),
        )
        .secret("password", "PASSWORD");

    let resolution = verify(&template, &env).unwrap();
    let serialized = serde_json::to_string(&resolution).unwrap();

    assert!(serialized.contains("[secret]"));
    assert!(!serialized.contains("this is a password"));
}

#[test]
fn missing_secret_is_absent_handle() {
    let template = Template::new().secret("password", "PASSWORD");
    let resolution = verify(&template, &Env::new()).unwrap();

    let value = resolution.config.get("password").unwrap();
    assert!(value.is_missing());
    assert_eq!(value.as_secret().and_then(Secret::reveal), None);
    assert_eq!(resolution.missing_values.len(), 1);
}

// ============================================================================
// Mixed features
// ============================================================================

#[test]
fn all_features_mix_across_nesting() {
    let env = Env::from_pairs([("PRESENT", "present"), ("SECRET", "somethingSecret")]);
    let mixed = Template::new()
        .env("present", "PRESENT")
        .with("transformed", ("PRESENT", |_: &str| "transformed"))
        .insert("inserted", "inserted")
        .secret("secret", "SECRET");
    let template = mixed
        .clone()
        .nested("mixed", mixed);

    let resolution = verify(&template, &env).unwrap();
    let json = resolution.config.to_json();

    let expected_leaves = json!({
        "present": "present",
        "transformed": "transformed",
        "inserted": "inserted",
        "secret": "[secret]"
    });
    let mut expected = expected_leaves.clone();
    expected["mixed"] = expected_leaves;

    assert_eq!(json, expected);
    assert!(!json.to_string().contains("somethingSecret"));
}

// ============================================================================
// Strict resolution
// ============================================================================

#[test]
fn strict_verify_fails_on_missing_values() {
    let env = Env::from_pairs([("a", "A")]);
    let template = Template::new()
        .env("1", "a")
        .env("2", "zz-top")
        .nested(
            "3",
            Template::new()
                .nested("6", Template::new().env("7", "IM_ALSO_MISSING"))
                .env("4", "IM_MISSING")
                .env("5", "ME_TOO"),
        );

    let err = strict_verify(&template, &env).unwrap_err();

    assert_eq!(err.missing_values().len(), 4);
    let message = err.to_string();
    assert!(message.starts_with("Missing configuration values: "));
    assert_eq!(message.lines().count(), 4);
    assert!(message.contains("environment value zz-top is missing from config object at 2"));
    assert!(message.contains("environment value IM_ALSO_MISSING is missing from config object at 3.6.7"));
}

#[test]
fn strict_verify_returns_complete_config() {
    let env = Env::from_pairs([("a", "A"), ("zz-top", "ZZ_TOP"), ("PW", "p@ss")]);
    let template = Template::new().env("1", "a").env("2", "zz-top").secret("pw", "PW");

    let config = strict_verify(&template, &env).unwrap();

    assert_eq!(config.str_at("1"), Some("A"));
    assert_eq!(config.str_at("2"), Some("ZZ_TOP"));
    assert_eq!(config.secret_at("pw").and_then(Secret::reveal), Some("p@ss"));
    assert_eq!(
        serde_json::to_value(&config).unwrap(),
        json!({ "1": "A", "2": "ZZ_TOP", "pw": "[secret]" })
    );
}

#[test]
fn resolution_does_not_touch_environment() {
    let env = Env::from_pairs([("A", "1")]);
    let before = env.clone();
    let template = Template::new().env("a", "A").env("b", "B");

    let _ = verify(&template, &env).unwrap();

    assert_eq!(env, before);
}
