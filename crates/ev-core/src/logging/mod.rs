//! Structured logging for the enverify CLI.
//!
//! Provides dual-mode logging:
//! - Human-readable console output for interactive use
//! - Machine-parseable JSON lines for CI pipelines
//!
//! stdout is reserved for command payloads; all log output goes to stderr.
//! Library crates only emit paths and variable names, never values.

pub mod config;

pub use config::{LogConfig, LogFormat, LogLevel};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the logging subsystem.
///
/// Call once at startup. A second call leaves the first subscriber in place.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_new(config.filter_directives())
        .unwrap_or_else(|_| EnvFilter::new(LogConfig::default().filter_directives()));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Human => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(config.ansi);
            if config.timestamps {
                registry.with(fmt_layer).try_init()
            } else {
                registry.with(fmt_layer.without_time()).try_init()
            }
        }
        LogFormat::Jsonl => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("logging already initialized");
    }
}
