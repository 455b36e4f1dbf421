// Periodic status reporting with cooperative cancellation
// Author: kelexine (https://github.com/kelexine)

use super::Logger;
use crate::error::{Error, Result};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

/// Cooperative stop flag shared between a status loop and its owner.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag and wake every waiter.
    pub fn stop(&self) {
        let (flag, cvar) = &*self.inner;
        *flag.lock() = true;
        cvar.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        *self.inner.0.lock()
    }

    /// Block until the flag is set or `timeout` elapses.
    /// Returns `true` when the flag is set.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (flag, cvar) = &*self.inner;
        let mut stopped = flag.lock();
        if !*stopped {
            cvar.wait_while_for(&mut stopped, |stopped| !*stopped, timeout);
        }
        *stopped
    }
}

/// A status loop needs a non-zero interval, otherwise it would spin.
fn ensure_interval(interval: Duration) -> Result<()> {
    if interval.is_zero() {
        return Err(Error::InvalidStatusInterval);
    }
    Ok(())
}

fn status_line(message: &str, elapsed: Duration) -> String {
    format!("{}: passed {} seconds", message, elapsed.as_secs_f64())
}

impl Logger {
    /// Emit `"<message>: passed <n> seconds"` at INFO every `interval`
    /// until `stop` is set. Blocks the calling thread; meant to run on a
    /// dedicated worker. Returns the number of status records emitted,
    /// or an error for a zero `interval`.
    pub fn periodic_status(
        &self,
        stop: &StopSignal,
        interval: Duration,
        message: &str,
    ) -> Result<u64> {
        ensure_interval(interval)?;
        let mut elapsed = Duration::ZERO;
        let mut ticks = 0;

        while !stop.wait_timeout(interval) {
            elapsed += interval;
            ticks += 1;
            self.info(&status_line(message, elapsed));
        }

        debug!("Status loop for '{}' stopped after {} ticks", message, ticks);
        Ok(ticks)
    }

    /// Async counterpart of [`Logger::periodic_status`] for tokio tasks.
    ///
    /// Stops when the watched value becomes `true` or the sender is dropped.
    pub async fn periodic_status_async(
        &self,
        mut stop: watch::Receiver<bool>,
        interval: Duration,
        message: &str,
    ) -> Result<u64> {
        ensure_interval(interval)?;
        let mut elapsed = Duration::ZERO;
        let mut ticks = 0;

        loop {
            if *stop.borrow() {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    elapsed += interval;
                    ticks += 1;
                    self.info(&status_line(message, elapsed));
                }
                changed = stop.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        debug!("Async status loop for '{}' stopped after {} ticks", message, ticks);
        Ok(ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::MemorySink;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_status_line_formats_elapsed() {
        assert_eq!(status_line("Building", Duration::from_secs(10)), "Building: passed 10 seconds");
        assert_eq!(
            status_line("Building", Duration::from_millis(1500)),
            "Building: passed 1.5 seconds"
        );
    }

    #[test]
    fn test_stop_signal_wait_returns_early() {
        let stop = StopSignal::new();
        let remote = stop.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.stop();
        });

        let started = Instant::now();
        assert!(stop.wait_timeout(Duration::from_secs(10)));
        assert!(started.elapsed() < Duration::from_secs(5));
        handle.join().unwrap();
    }

    #[test]
    fn test_stop_signal_times_out_when_unset() {
        let stop = StopSignal::new();
        assert!(!stop.wait_timeout(Duration::from_millis(5)));
        assert!(!stop.is_stopped());
    }

    #[test]
    fn test_periodic_status_already_stopped_emits_nothing() {
        let sink = MemorySink::new();
        let logger = Logger::builder().memory(sink.clone()).build();
        let stop = StopSignal::new();
        stop.stop();

        let ticks = logger
            .periodic_status(&stop, Duration::from_secs(60), "Waiting")
            .unwrap();
        assert_eq!(ticks, 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_periodic_status_accumulates_until_stopped() {
        let sink = MemorySink::new();
        let logger = Arc::new(Logger::builder().memory(sink.clone()).build());
        let stop = StopSignal::new();

        let worker = {
            let logger = logger.clone();
            let stop = stop.clone();
            thread::spawn(move || logger.periodic_status(&stop, Duration::from_millis(10), "Copying"))
        };

        while sink.lines().len() < 2 {
            thread::sleep(Duration::from_millis(5));
        }
        stop.stop();
        let ticks = worker.join().unwrap().unwrap();

        let lines = sink.lines();
        assert_eq!(lines.len() as u64, ticks);
        assert_eq!(lines[0], "INFO: Copying: passed 0.01 seconds");
        assert_eq!(lines[1], "INFO: Copying: passed 0.02 seconds");
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_status_async_stops_on_signal() {
        let sink = MemorySink::new();
        let logger = Arc::new(Logger::builder().memory(sink.clone()).build());
        let (tx, rx) = watch::channel(false);

        let task = {
            let logger = logger.clone();
            tokio::spawn(async move {
                logger
                    .periodic_status_async(rx, Duration::from_secs(5), "Deploying")
                    .await
            })
        };

        tokio::time::sleep(Duration::from_secs(12)).await;
        tx.send(true).unwrap();
        let ticks = task.await.unwrap().unwrap();

        assert_eq!(ticks, 2);
        assert_eq!(
            sink.lines(),
            vec![
                "INFO: Deploying: passed 5 seconds",
                "INFO: Deploying: passed 10 seconds",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_status_async_stops_when_sender_dropped() {
        let logger = Logger::builder().memory(MemorySink::new()).build();
        let (tx, rx) = watch::channel(false);
        drop(tx);

        let ticks = logger
            .periodic_status_async(rx, Duration::from_secs(1), "Idle")
            .await
            .unwrap();
        assert_eq!(ticks, 0);
    }

    #[test]
    fn test_periodic_status_rejects_zero_interval() {
        let sink = MemorySink::new();
        let logger = Logger::builder().memory(sink.clone()).build();
        let stop = StopSignal::new();

        let result = logger.periodic_status(&stop, Duration::ZERO, "Spin");
        assert!(matches!(result, Err(Error::InvalidStatusInterval)));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_periodic_status_async_rejects_zero_interval() {
        let sink = MemorySink::new();
        let logger = Logger::builder().memory(sink.clone()).build();
        let (_tx, rx) = watch::channel(false);

        let result = logger
            .periodic_status_async(rx, Duration::ZERO, "Spin")
            .await;
        assert!(matches!(result, Err(Error::InvalidStatusInterval)));
        assert!(sink.is_empty());
    }
}
