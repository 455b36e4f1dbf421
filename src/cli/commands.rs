// Subcommand execution
// Author: kelexine (https://github.com/kelexine)

use crate::cli::Command;
use crate::config::AppConfig;
use crate::error::Error;
use crate::logger::{LogLevel, Logger};
use crate::utils::retry::RetryPolicy;
use crate::utils::timer::timed_async;
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::io::Read;
use std::process::ExitStatus;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

/// Why a single run of an external command did not succeed.
#[derive(Error, Debug)]
pub enum CommandFailure {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}")]
    Exit { program: String, status: ExitStatus },
}

/// Dispatch a parsed subcommand.
pub async fn execute(command: Command, config: &AppConfig, logger: Arc<Logger>) -> Result<()> {
    match command {
        Command::Log {
            severity,
            message,
            kb,
        } => {
            emit(&logger, severity, &message, kb.as_deref());
            Ok(())
        }
        Command::Table { json } => table(&logger, &json),
        Command::Run {
            attempts,
            delay_ms,
            status_interval,
            kb,
            command,
        } => {
            let mut retry = config.retry.clone();
            if let Some(attempts) = attempts {
                retry.max_attempts = attempts;
            }
            if let Some(delay_ms) = delay_ms {
                retry.delay_ms = delay_ms;
            }
            let policy = retry.policy()?;
            run(
                logger,
                &policy,
                Duration::from_secs(status_interval),
                &command,
                kb.as_deref(),
            )
            .await
        }
        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

/// Emit one record through the matching entry point.
pub fn emit(logger: &Logger, level: LogLevel, message: &str, kb: Option<&str>) {
    match level {
        LogLevel::Error => logger.error_with_kb(message, kb),
        LogLevel::Warning => logger.warning(message),
        _ => logger.log(level, message),
    }
}

/// Parse a JSON array (or `-` for stdin) and log it as a table.
pub fn table(logger: &Logger, json: &str) -> Result<()> {
    let text = if json == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read table from stdin")?;
        buffer
    } else {
        json.to_string()
    };

    let rows: Vec<Value> = serde_json::from_str(&text).context("table input must be a JSON array")?;
    logger.log_table(&rows)?;
    Ok(())
}

/// Run an external command under `policy`, reporting progress every
/// `status_interval` until it finishes, then print the warning summary.
pub async fn run(
    logger: Arc<Logger>,
    policy: &RetryPolicy,
    status_interval: Duration,
    command: &[String],
    kb: Option<&str>,
) -> Result<()> {
    let Some((program, args)) = command.split_first() else {
        bail!("no command given");
    };
    if status_interval.is_zero() {
        return Err(Error::InvalidStatusInterval.into());
    }
    let label = command.join(" ");

    let (stop_tx, stop_rx) = watch::channel(false);
    let status = {
        let logger = logger.clone();
        let message = format!("Running `{}`", label);
        tokio::spawn(async move {
            logger
                .periodic_status_async(stop_rx, status_interval, &message)
                .await
        })
    };

    let attempts = AtomicU32::new(0);
    let outcome = timed_async(
        &logger,
        &label,
        policy.execute_async(&logger, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            run_once(program, args)
        }),
    )
    .await;

    let _ = stop_tx.send(true);
    let ticks = status.await.context("status task panicked")??;
    debug!("Command `{}` finished after {} status ticks", label, ticks);

    let used = attempts.load(Ordering::SeqCst);
    match &outcome {
        Ok(()) if used > 1 => {
            logger.warning(&format!("`{}` succeeded only after {} attempts", label, used))
        }
        Ok(()) => logger.info(&format!("`{}` succeeded", label)),
        Err(_) => logger.error_with_kb(&format!("`{}` failed after {} attempts", label, used), kb),
    }

    logger.log_warning_summary();
    outcome.map_err(Into::into)
}

async fn run_once(program: &str, args: &[String]) -> std::result::Result<(), CommandFailure> {
    let status = tokio::process::Command::new(program)
        .args(args)
        .status()
        .await
        .map_err(|source| CommandFailure::Spawn {
            program: program.to_string(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(CommandFailure::Exit {
            program: program.to_string(),
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::MemorySink;

    fn memory_logger() -> (Arc<Logger>, MemorySink) {
        let sink = MemorySink::new();
        (Arc::new(Logger::builder().memory(sink.clone()).build()), sink)
    }

    fn quick_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts).unwrap().with_delay(Duration::ZERO)
    }

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_emit_routes_warning_into_history() {
        let (logger, sink) = memory_logger();
        emit(&logger, LogLevel::Warning, "careful", None);
        emit(&logger, LogLevel::Error, "boom", Some("http://kb/1"));

        assert_eq!(logger.warnings(), vec!["careful"]);
        assert!(sink.contents().contains("More info at http://kb/1"));
    }

    #[test]
    fn test_table_rejects_non_array() {
        let (logger, sink) = memory_logger();
        assert!(table(&logger, "{\"a\": 1}").is_err());
        assert!(table(&logger, "[]").is_err());
        assert!(sink.is_empty());

        table(&logger, r#"[{"host": "db1", "up": true}]"#).unwrap();
        assert!(sink.contents().contains("db1"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_succeeds_first_time() {
        let (logger, sink) = memory_logger();
        run(logger.clone(), &quick_policy(3), Duration::from_secs(60), &sh("exit 0"), None)
            .await
            .unwrap();

        assert!(sink.contents().contains("INFO: `sh -c exit 0` succeeded"));
        assert_eq!(logger.warning_count(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_retries_until_success() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let script = format!(
            "test -f {0} || {{ touch {0}; exit 1; }}",
            marker.display()
        );

        let (logger, sink) = memory_logger();
        run(logger.clone(), &quick_policy(3), Duration::from_secs(60), &sh(&script), None)
            .await
            .unwrap();

        let contents = sink.contents();
        assert!(contents.contains("Attempt 1 of 3 failed with exception:"));
        assert!(!contents.contains("Attempt 2 of 3"));
        assert_eq!(logger.warning_count(), 1);
        assert!(contents.contains("Warnings collected during run (1):"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_reports_exhaustion() {
        let (logger, sink) = memory_logger();
        let err = run(
            logger,
            &quick_policy(2),
            Duration::from_secs(60),
            &sh("exit 3"),
            Some("http://kb/run"),
        )
        .await
        .unwrap_err();

        let failure = err.downcast_ref::<CommandFailure>().unwrap();
        assert!(matches!(failure, CommandFailure::Exit { .. }));

        let contents = sink.contents();
        assert!(contents.contains("Attempt 2 of 2 failed with exception:"));
        assert!(contents.contains("failed after 2 attempts"));
        assert!(contents.contains("More info at http://kb/run"));
    }

    #[tokio::test]
    async fn test_run_rejects_zero_status_interval() {
        let (logger, sink) = memory_logger();
        let err = run(
            logger,
            &quick_policy(1),
            Duration::ZERO,
            &["packman-definitely-missing-binary".to_string()],
            None,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidStatusInterval)
        ));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_run_missing_program_is_spawn_failure() {
        let (logger, _sink) = memory_logger();
        let err = run(
            logger,
            &quick_policy(1),
            Duration::from_secs(60),
            &["packman-definitely-missing-binary".to_string()],
            None,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CommandFailure>(),
            Some(CommandFailure::Spawn { .. })
        ));
    }
}
