//! Environment sources for the CLI.
//!
//! Layers, lowest precedence first: the process environment, each env file
//! in order, then each `--set` assignment.
//!
//! Env files are read literally: `$NAME` and `${NAME}` are not expanded, so a
//! file never pulls values from the process environment or from another
//! layer. `\$` is read as `$`.

use ev_common::{Error, Result};
use ev_config::Env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where to gather environment variables from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOptions {
    pub include_process_env: bool,
    pub env_files: Vec<PathBuf>,
    pub assignments: Vec<String>,
}

/// Snapshot of the process environment.
///
/// Variables whose name or value is not valid UTF-8 are skipped.
pub fn process_env() -> Env {
    let mut skipped = 0usize;
    let env: Env = std::env::vars_os()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            _ => {
                skipped += 1;
                None
            }
        })
        .collect();
    if skipped > 0 {
        debug!(skipped, "skipped non-UTF-8 process environment variables");
    }
    env
}

/// Placeholder for `$` while dotenvy parses, which keeps it from expanding
/// variables against the process environment.
const DOLLAR: char = '\u{E000}';

/// Parse a dotenv file.
pub fn load_env_file(path: &Path) -> Result<Env> {
    let text =
        std::fs::read_to_string(path).map_err(|e| env_file_error(path, dotenvy::Error::Io(e)))?;
    let env = parse_env_text(&text).map_err(|e| env_file_error(path, e))?;
    debug!(path = %path.display(), vars = env.len(), "loaded env file");
    Ok(env)
}

fn parse_env_text(text: &str) -> std::result::Result<Env, dotenvy::Error> {
    let literal = text.replace("\\$", "$").replace('$', &DOLLAR.to_string());
    let mut env = Env::new();
    for item in dotenvy::from_read_iter(literal.as_bytes()) {
        let (key, value) = item?;
        env.set(key, value.replace(DOLLAR, "$"));
    }
    Ok(env)
}

/// Parse a `KEY=VALUE` assignment. The value may be empty or contain `=`.
pub fn parse_assignment(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        // the argument may be a secret typed without its key, never echo it
        Some(_) => Err(Error::InvalidAssignment("empty variable name".to_string())),
        None => Err(Error::InvalidAssignment("missing '='".to_string())),
    }
}

/// Build the layered environment described by `options`.
pub fn build_env(options: &EnvOptions) -> Result<Env> {
    let mut layers = Vec::with_capacity(options.env_files.len() + 2);

    if options.include_process_env {
        layers.push(process_env());
    }
    for path in &options.env_files {
        layers.push(load_env_file(path)?);
    }

    let mut overrides = Env::new();
    for raw in &options.assignments {
        let (key, value) = parse_assignment(raw)?;
        overrides.set(key, value);
    }
    layers.push(overrides);

    let env = Env::layered(layers);
    debug!(vars = env.len(), files = options.env_files.len(), "environment assembled");
    Ok(env)
}

fn env_file_error(path: &Path, err: dotenvy::Error) -> Error {
    let reason = match err {
        // the offending line may hold a secret; report its position only
        dotenvy::Error::LineParse(_, index) => format!("parse error at position {index}"),
        dotenvy::Error::Io(io) => io.to_string(),
        other => other.to_string(),
    };
    Error::EnvFile {
        path: path.display().to_string(),
        reason,
    }
}
