//! Severity levels understood by the [`Logger`](super::Logger).
//!
//! The set is fixed at compile time. Each level carries the numeric rank
//! used by the emission gate: a record is written when its rank is at
//! least the configured threshold.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered severity of a log record. Higher rank is more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// All levels, least severe first.
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    /// Numeric rank used by the emission gate.
    pub const fn rank(self) -> u8 {
        match self {
            LogLevel::Critical => 50,
            LogLevel::Error => 40,
            LogLevel::Warning => 30,
            LogLevel::Info => 20,
            LogLevel::Debug => 10,
            LogLevel::Trace => 5,
        }
    }

    /// Upper-case label printed in front of every record.
    pub const fn name(self) -> &'static str {
        match self {
            LogLevel::Critical => "CRITICAL",
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }

    /// Level with exactly this rank, if any.
    pub fn from_rank(rank: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.rank() == rank)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    /// Accepts a level name (any case, `WARN` included) or one of the six ranks.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(rank) = trimmed.parse::<u8>() {
            return Self::from_rank(rank).ok_or_else(|| Error::InvalidLevel(s.to_string()));
        }

        match trimmed.to_ascii_uppercase().as_str() {
            "CRITICAL" => Ok(LogLevel::Critical),
            "ERROR" => Ok(LogLevel::Error),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            "TRACE" => Ok(LogLevel::Trace),
            _ => Err(Error::InvalidLevel(s.to_string())),
        }
    }
}

/// Parse a gate threshold: a level name, or any numeric rank.
///
/// Unlike [`LogLevel::from_str`], numbers outside the six named ranks are
/// accepted, so `25` lets WARNING and above through while hiding INFO.
pub fn parse_threshold(s: &str) -> Result<u8, Error> {
    match s.trim().parse::<u8>() {
        Ok(rank) => Ok(rank),
        Err(_) => s.parse::<LogLevel>().map(LogLevel::rank),
    }
}
