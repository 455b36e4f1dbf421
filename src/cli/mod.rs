// CLI module for packman
// Author: kelexine (https://github.com/kelexine)

pub mod commands;

use crate::logger::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// packman - leveled logging and retry helpers for shell automation
#[derive(Parser, Debug)]
#[command(name = "packman", version, about, long_about = None)]
pub struct Args {
    /// Minimum severity to emit (name or numeric rank)
    #[arg(long, global = true, env = "PACKMAN_LEVEL")]
    pub level: Option<String>,

    /// Configuration file (defaults to ~/.packman/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Emit a single record
    Log {
        /// Severity of the record (name or rank)
        #[arg(value_name = "LEVEL")]
        severity: LogLevel,

        /// Message text; embedded newlines produce a banner
        message: String,

        /// Knowledge-base link appended to ERROR records
        #[arg(long)]
        kb: Option<String>,
    },

    /// Render a JSON array of objects as a table
    Table {
        /// JSON text, or `-` to read standard input
        json: String,
    },

    /// Run a command, retrying on non-zero exit
    Run {
        /// Attempts before giving up (overrides config)
        #[arg(long)]
        attempts: Option<u32>,

        /// Pause between attempts in milliseconds (overrides config)
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Seconds between "still running" status records
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
        status_interval: u64,

        /// Knowledge-base link reported if every attempt fails
        #[arg(long)]
        kb: Option<String>,

        /// Program and arguments
        #[arg(trailing_var_arg = true, required = true, num_args = 1..)]
        command: Vec<String>,
    },

    /// Print the effective configuration as TOML
    Config,
}
