// packman - leveled logging and retry helpers for automation scripts
// Author: kelexine (https://github.com/kelexine)

use anyhow::Result;
use clap::Parser;
use packman::cli::{commands, Args};
use packman::config::AppConfig;
use packman::utils::logging;
use std::sync::Arc;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration, CLI level wins over file and env
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(level) = &args.level {
        config.logger.level = level.clone();
    }

    // Phase 2: Initialize diagnostics
    logging::init(&config.diagnostics)?;
    debug!("Starting packman v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Build the shared logger
    let logger = Arc::new(config.logger.build()?);

    // Phase 4: Run the subcommand
    commands::execute(args.command, &config, logger).await
}
