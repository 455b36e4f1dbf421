//! Helpers that wrap caller operations and report through the logger.
//!
//! # Submodules
//!
//! - `logging`: `tracing` subscriber setup for internal diagnostics.
//! - `retry`: Fixed-delay retry that logs every failed attempt.
//! - `session`: Values computed once per thread or once per process.
//! - `timer`: Wall-clock timing of an operation, reported at DEBUG.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod logging;
pub mod retry;
pub mod session;
pub mod timer;

pub use retry::{RetryPolicy, Sleeper, ThreadSleeper};
pub use session::{SharedSession, ThreadSession};
pub use timer::{format_duration, timed, timed_async};
