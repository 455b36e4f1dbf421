//! Leveled logger with banner framing, grid tables and a warning history.
//!
//! A [`Logger`] is constructed once by the entry point and shared as
//! `Arc<Logger>` with every component that reports progress. All of its
//! state is internally synchronized, so it can be used from any thread.
//!
//! Records are written as `<LEVELNAME>: <message>`. Messages that span
//! several lines are framed by `#` banners so they stand out in long
//! script output:
//!
//! ```text
//! ERROR: ###########...
//! boom
//! More info at http://kb/123
//! ##################...
//! ```
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod format;
mod level;
mod sink;
mod status;

pub use format::{render_table, wrap_message, DEFAULT_SEPARATOR_WIDTH};
pub use level::{parse_threshold, LogLevel};
pub use sink::{MemorySink, Sink};
pub use status::StopSignal;

use crate::error::Result;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::warn;

/// Target used for records mirrored into `tracing`.
pub const TRACING_TARGET: &str = "packman";

/// Process-wide structured logger.
#[derive(Debug)]
pub struct Logger {
    threshold: AtomicU8,
    separator_width: usize,
    mirror_to_tracing: bool,
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    sink: Sink,
    warnings: Vec<String>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Logger {
    /// Logger writing to stdout at INFO.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    /// Set the minimum severity that will be emitted.
    pub fn configure(&self, level: LogLevel) {
        self.configure_rank(level.rank());
    }

    /// Set the minimum rank that will be emitted. Any value is accepted,
    /// not only the ranks of the named levels.
    pub fn configure_rank(&self, rank: u8) {
        self.threshold.store(rank, Ordering::SeqCst);
    }

    /// Current gate threshold.
    pub fn threshold(&self) -> u8 {
        self.threshold.load(Ordering::SeqCst)
    }

    pub fn separator_width(&self) -> usize {
        self.separator_width
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level.rank() >= self.threshold()
    }

    /// Emit `message` at `level`, banner-wrapped if it spans several lines.
    pub fn log(&self, level: LogLevel, message: &str) {
        self.emit(level, message, false);
    }

    fn emit(&self, level: LogLevel, message: &str, remember_warning: bool) {
        let mut inner = self.inner.lock();
        if remember_warning {
            inner.warnings.push(message.to_string());
        }

        if !self.is_enabled(level) {
            return;
        }

        let body = wrap_message(level, message, self.separator_width);
        let record = format!("{}: {}\n", level.name(), body);

        if let Err(err) = inner.sink.write_record(&record) {
            warn!("Failed to write {} record: {}", level, err);
        }
        drop(inner);

        if self.mirror_to_tracing {
            mirror(level, &body);
        }
    }

    pub fn critical(&self, message: &str) {
        self.log(LogLevel::Critical, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    /// Log an error, pointing at a knowledge-base entry when one is given.
    pub fn error_with_kb(&self, message: &str, kb_entry_link: Option<&str>) {
        match kb_entry_link {
            Some(link) => self.error(&format!("{}\nMore info at {}", message, link)),
            None => self.error(message),
        }
    }

    /// Log at WARNING and record the message in the warning history,
    /// whether or not it passes the gate.
    pub fn warning(&self, message: &str) {
        self.emit(LogLevel::Warning, message, true);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn trace(&self, message: &str) {
        self.log(LogLevel::Trace, message);
    }

    /// Warnings recorded so far, oldest first.
    pub fn warnings(&self) -> Vec<String> {
        self.inner.lock().warnings.clone()
    }

    pub fn warning_count(&self) -> usize {
        self.inner.lock().warnings.len()
    }

    pub fn clear_warnings(&self) {
        self.inner.lock().warnings.clear();
    }

    /// Emit the warning history as a numbered list at INFO.
    /// Nothing is written when no warnings were recorded.
    pub fn log_warning_summary(&self) -> usize {
        let warnings = self.warnings();
        if warnings.is_empty() {
            return 0;
        }

        let mut summary = format!("Warnings collected during run ({}):", warnings.len());
        for (i, warning) in warnings.iter().enumerate() {
            summary.push_str(&format!("\n{}. {}", i + 1, warning));
        }
        self.info(&summary);
        warnings.len()
    }

    /// Render `rows` as a grid table and emit it at INFO.
    ///
    /// Each row must serialize to a map; all rows must share the columns
    /// of the first one. Malformed input is returned as an error before
    /// anything is written.
    pub fn log_table<T: Serialize>(&self, rows: &[T]) -> Result<()> {
        let table = render_table(rows)?;
        self.info(&format!("\n{}\n", table));
        Ok(())
    }
}

fn mirror(level: LogLevel, body: &str) {
    match level {
        LogLevel::Critical | LogLevel::Error => {
            tracing::error!(target: TRACING_TARGET, severity = level.name(), "{}", body)
        }
        LogLevel::Warning => tracing::warn!(target: TRACING_TARGET, "{}", body),
        LogLevel::Info => tracing::info!(target: TRACING_TARGET, "{}", body),
        LogLevel::Debug => tracing::debug!(target: TRACING_TARGET, "{}", body),
        LogLevel::Trace => tracing::trace!(target: TRACING_TARGET, "{}", body),
    }
}

/// Builder for [`Logger`].
#[derive(Debug)]
pub struct LoggerBuilder {
    threshold: u8,
    separator_width: usize,
    mirror_to_tracing: bool,
    sink: Sink,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            threshold: LogLevel::Info.rank(),
            separator_width: DEFAULT_SEPARATOR_WIDTH,
            mirror_to_tracing: false,
            sink: Sink::Stdout,
        }
    }
}

impl LoggerBuilder {
    pub fn level(mut self, level: LogLevel) -> Self {
        self.threshold = level.rank();
        self
    }

    pub fn threshold(mut self, rank: u8) -> Self {
        self.threshold = rank;
        self
    }

    pub fn separator_width(mut self, width: usize) -> Self {
        self.separator_width = width;
        self
    }

    pub fn mirror_to_tracing(mut self, enabled: bool) -> Self {
        self.mirror_to_tracing = enabled;
        self
    }

    pub fn sink(mut self, sink: Sink) -> Self {
        self.sink = sink;
        self
    }

    /// Shorthand for `sink(Sink::Memory(buffer))`.
    pub fn memory(self, buffer: MemorySink) -> Self {
        self.sink(Sink::Memory(buffer))
    }

    pub fn build(self) -> Logger {
        Logger {
            threshold: AtomicU8::new(self.threshold),
            separator_width: self.separator_width,
            mirror_to_tracing: self.mirror_to_tracing,
            inner: Mutex::new(Inner {
                sink: self.sink,
                warnings: Vec::new(),
            }),
        }
    }
}
