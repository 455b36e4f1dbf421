//! Diagnostics logging through the `tracing` ecosystem.
//!
//! The crate's own bookkeeping (config loading, retry scheduling, status
//! loops) is reported with `tracing` macros. This module installs the
//! subscriber that renders them. Output goes to stderr so it never mixes
//! with the records the [`Logger`](crate::logger::Logger) writes to stdout.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::config::DiagnosticsConfig;
use crate::error::{Error, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global tracing subscriber.
///
/// Supports three output formats:
/// - `json`: Structured JSON lines.
/// - `compact`: Single-line human-readable output.
/// - `pretty` (default): Multi-line, colorized output for development.
///
/// Log levels are controlled via the `RUST_LOG` environment variable or
/// the provided `DiagnosticsConfig`.
pub fn init(config: &DiagnosticsConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let installed = match config.format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        "compact" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
    };

    installed.map_err(|e| Error::Config(format!("failed to install tracing subscriber: {}", e)))
}
