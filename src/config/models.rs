//! Configuration data structures for the packman utilities.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::error::{Error, Result};
use crate::logger::{parse_threshold, Logger, Sink, DEFAULT_SEPARATOR_WIDTH};
use crate::utils::retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The root configuration object.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Settings of the script-facing logger.
    #[serde(default)]
    pub logger: LoggerConfig,

    /// Defaults for retried operations.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Internal `tracing` diagnostics.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// Where logger records are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Stdout,
    Stderr,
}

/// Settings for the script-facing logger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Minimum severity, as a level name or a numeric rank.
    /// Default: `INFO`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Width of the `#` banners around multi-line messages.
    /// Default: `196`
    #[serde(default = "default_separator_width")]
    pub separator_width: usize,

    /// Output stream.
    /// Default: `stdout`
    #[serde(default)]
    pub sink: SinkKind,

    /// Also forward every emitted record to `tracing`.
    /// Default: `false`
    #[serde(default)]
    pub mirror_to_tracing: bool,
}

/// Settings for retried operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts before the last error is returned.
    /// Default: `3`
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause between attempts in milliseconds.
    /// Default: `1000`
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

/// Settings for internal diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// `tracing` filter directive, overridden by `RUST_LOG`.
    /// Default: `warn`
    #[serde(default = "default_diagnostics_level")]
    pub level: String,

    /// Output format (`pretty`, `json`, `compact`).
    /// Default: `pretty`
    #[serde(default = "default_diagnostics_format")]
    pub format: String,
}

impl LoggerConfig {
    /// Build a logger from these settings.
    pub fn build(&self) -> Result<Logger> {
        let threshold = parse_threshold(&self.level)?;
        let sink = match self.sink {
            SinkKind::Stdout => Sink::Stdout,
            SinkKind::Stderr => Sink::Stderr,
        };

        Ok(Logger::builder()
            .threshold(threshold)
            .separator_width(self.separator_width)
            .mirror_to_tracing(self.mirror_to_tracing)
            .sink(sink)
            .build())
    }
}

impl RetryConfig {
    pub fn policy(&self) -> Result<RetryPolicy> {
        Ok(RetryPolicy::new(self.max_attempts)?.with_delay(Duration::from_millis(self.delay_ms)))
    }
}

impl DiagnosticsConfig {
    pub fn validate(&self) -> Result<()> {
        match self.format.as_str() {
            "pretty" | "json" | "compact" => Ok(()),
            other => Err(Error::Config(format!("unknown diagnostics format: {}", other))),
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            separator_width: default_separator_width(),
            sink: SinkKind::default(),
            mirror_to_tracing: false,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            level: default_diagnostics_level(),
            format: default_diagnostics_format(),
        }
    }
}

// Helper functions for serde defaults
fn default_log_level() -> String {
    "INFO".to_string()
}

fn default_separator_width() -> usize {
    DEFAULT_SEPARATOR_WIDTH
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_diagnostics_level() -> String {
    "warn".to_string()
}

fn default_diagnostics_format() -> String {
    "pretty".to_string()
}
