//! enverify template resolution.
//!
//! This crate provides:
//! - The template model: nested maps whose leaves name environment variables
//!   or value-producing directives
//! - Environment lookup over any in-memory mapping
//! - One resolver per leaf kind and the recursive walker that drives them
//! - Permissive ([`verify`]) and strict ([`strict_verify`]) entry points
//! - Built-in named transforms and JSON template loading
//!
//! Resolution never reads the process environment on its own; callers pass the
//! mapping explicitly.
//!
//! # Example
//!
//! ```
//! use ev_config::{verify, Env, Template};
//!
//! let template = Template::new()
//!     .env("host", "DB_HOST")
//!     .secret("password", "DB_PASSWORD")
//!     .insert("pool", 8)
//!     .transform("port", "DB_PORT", |raw: &str| raw.parse::<u16>());
//!
//! let env = Env::from_pairs([("DB_HOST", "localhost"), ("DB_PORT", "5432")]);
//! let resolution = verify(&template, &env).unwrap();
//!
//! assert_eq!(resolution.config.get("host").and_then(|v| v.as_str()), Some("localhost"));
//! assert_eq!(resolution.missing_values.len(), 1);
//! assert_eq!(resolution.missing_values[0].env_key, "DB_PASSWORD");
//! ```

pub mod env;
pub mod json;
pub mod resolved;
pub mod resolvers;
pub mod template;
pub mod transforms;
pub mod verify;
pub mod walker;

pub use env::{Env, EnvSource, EnvValue};
pub use json::load_template;
pub use resolved::{ResolvedConfig, ResolvedValue, VerifiedConfig};
pub use resolvers::{Lookup, Outcome};
pub use template::{join_path, transform_fn, Entry, EntryKind, EnvKeyRef, Template, Transform};
pub use transforms::{ParseError, TransformRegistry};
pub use verify::{strict_verify, verify, Resolution};

pub use ev_common::{Error, MissingValue, Result};
pub use ev_redact::Secret;
