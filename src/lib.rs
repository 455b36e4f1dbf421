// packman - leveled logging and retry helpers for automation scripts
// Author: kelexine (https://github.com/kelexine)

pub mod cli;
pub mod config;
pub mod error;
pub mod logger;
pub mod utils;

pub use error::{Error, Result};
pub use logger::{LogLevel, Logger, MemorySink, Sink, StopSignal};
pub use utils::retry::RetryPolicy;
