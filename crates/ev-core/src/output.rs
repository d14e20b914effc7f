//! Rendering command results.
//!
//! Every renderer returns `None` for [`OutputFormat::Exitcode`]; the caller
//! prints nothing and communicates through the exit code alone. Rendered
//! output never contains secret values.

use ev_common::{missing_value_messages, MissingValue, OutputFormat, Result};
use ev_config::{EnvKeyRef, Resolution};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

/// Completeness of a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Complete,
    Incomplete,
}

impl Status {
    pub fn of(missing: &[MissingValue]) -> Self {
        if missing.is_empty() {
            Status::Complete
        } else {
            Status::Incomplete
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Complete => write!(f, "complete"),
            Status::Incomplete => write!(f, "incomplete"),
        }
    }
}

#[derive(Serialize)]
struct ResolveReport<'a> {
    template: String,
    status: Status,
    #[serde(flatten)]
    resolution: &'a Resolution,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckReport<'a> {
    template: String,
    status: Status,
    missing_values: &'a [MissingValue],
    missing_value_messages: Vec<String>,
}

#[derive(Serialize)]
struct KeysReport<'a> {
    template: String,
    keys: &'a [EnvKeyRef],
}

/// Render the outcome of `enverify resolve`.
pub fn render_resolution(
    format: OutputFormat,
    template: &Path,
    resolution: &Resolution,
) -> Result<Option<String>> {
    let status = Status::of(&resolution.missing_values);
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&ResolveReport {
            template: template.display().to_string(),
            status,
            resolution,
        })?,
        OutputFormat::Md => {
            let mut out = String::new();
            let _ = writeln!(out, "# enverify resolve\n");
            let _ = writeln!(out, "- Template: `{}`", template.display());
            let _ = writeln!(out, "- Status: {status}\n");
            let _ = writeln!(out, "## Configuration\n");
            let _ = writeln!(out, "```json");
            let _ = writeln!(out, "{}", serde_json::to_string_pretty(&resolution.config)?);
            let _ = writeln!(out, "```");
            if !resolution.missing_values.is_empty() {
                out.push('\n');
                out.push_str(&missing_section(&resolution.missing_values));
            }
            out
        }
        OutputFormat::Summary => summary_line(&resolution.missing_values),
        OutputFormat::Exitcode => return Ok(None),
    };
    Ok(Some(rendered))
}

/// Render the outcome of `enverify check`.
pub fn render_check(format: OutputFormat, template: &Path, missing: &[MissingValue]) -> Result<Option<String>> {
    let status = Status::of(missing);
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&CheckReport {
            template: template.display().to_string(),
            status,
            missing_values: missing,
            missing_value_messages: missing_value_messages(missing),
        })?,
        OutputFormat::Md => {
            let mut out = String::new();
            let _ = writeln!(out, "# enverify check\n");
            let _ = writeln!(out, "- Template: `{}`", template.display());
            let _ = writeln!(out, "- Status: {status}");
            if !missing.is_empty() {
                out.push('\n');
                out.push_str(&missing_section(missing));
            }
            out
        }
        OutputFormat::Summary => summary_line(missing),
        OutputFormat::Exitcode => return Ok(None),
    };
    Ok(Some(rendered))
}

/// Render the outcome of `enverify keys`.
pub fn render_keys(format: OutputFormat, template: &Path, keys: &[EnvKeyRef]) -> Result<Option<String>> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&KeysReport {
            template: template.display().to_string(),
            keys,
        })?,
        OutputFormat::Md => {
            let mut out = String::new();
            let _ = writeln!(out, "# enverify keys\n");
            let _ = writeln!(out, "| Path | Variable | Kind |");
            let _ = writeln!(out, "|------|----------|------|");
            for key in keys {
                let _ = writeln!(out, "| `{}` | `{}` | {} |", key.path, key.env_key, key.kind);
            }
            out
        }
        OutputFormat::Summary => {
            let mut names: Vec<&str> = keys.iter().map(|k| k.env_key.as_str()).collect();
            names.sort_unstable();
            names.dedup();
            format!("{} variables: {}", names.len(), names.join(", "))
        }
        OutputFormat::Exitcode => return Ok(None),
    };
    Ok(Some(rendered))
}

fn missing_section(missing: &[MissingValue]) -> String {
    let mut out = String::from("## Missing values\n\n");
    for value in missing {
        let _ = writeln!(out, "- `{}` (from `{}`)", value.path, value.env_key);
    }
    out
}

fn summary_line(missing: &[MissingValue]) -> String {
    if missing.is_empty() {
        return "[complete] all environment values present".to_string();
    }
    let names: Vec<&str> = missing.iter().map(|m| m.env_key.as_str()).collect();
    format!("[incomplete] {} missing: {}", missing.len(), names.join(", "))
}
