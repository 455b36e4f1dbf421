// Fixed-delay retry with per-attempt error reporting
// Author: kelexine (https://github.com/kelexine)

use crate::error::{Error, Result};
use crate::logger::Logger;
use backoff::backoff::{Backoff, Constant};
use std::fmt::{self, Display};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Attempts made when no count is configured.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Pause between two attempts when no delay is configured.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// Blocking pause between attempts
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Re-invokes a failing operation up to `max_attempts` times with a fixed
/// delay in between. Every failure is logged at ERROR; the last one is
/// handed back to the caller unchanged.
#[derive(Clone)]
pub struct RetryPolicy<S = ThreadSleeper> {
    max_attempts: u32,
    delay: Duration,
    sleeper: S,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_DELAY,
            sleeper: ThreadSleeper,
        }
    }
}

impl<S> fmt::Debug for RetryPolicy<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("delay", &self.delay)
            .finish()
    }
}

impl RetryPolicy {
    /// Policy making at most `max_attempts` attempts, one second apart.
    pub fn new(max_attempts: u32) -> Result<Self> {
        if max_attempts == 0 {
            return Err(Error::InvalidRetryPolicy(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            max_attempts,
            ..Self::default()
        })
    }
}

impl<S> RetryPolicy<S> {
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Replace the blocking sleeper used by [`RetryPolicy::execute`].
    pub fn with_sleeper<T: Sleeper>(self, sleeper: T) -> RetryPolicy<T> {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: self.delay,
            sleeper,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn backoff(&self) -> Constant {
        Constant::new(self.delay)
    }

    fn report_failure<E: Display>(&self, logger: &Logger, attempt: u32, error: &E) {
        logger.error(&format!(
            "Attempt {} of {} failed with exception:\n{}",
            attempt + 1,
            self.max_attempts,
            error
        ));
    }
}

impl<S: Sleeper> RetryPolicy<S> {
    /// Run `operation` until it succeeds or the attempts are used up.
    ///
    /// No delay follows the final failed attempt.
    pub fn execute<T, E, F>(&self, logger: &Logger, mut operation: F) -> std::result::Result<T, E>
    where
        F: FnMut() -> std::result::Result<T, E>,
        E: Display,
    {
        let mut backoff = self.backoff();
        let mut attempt = 0;

        loop {
            match operation() {
                Ok(result) => {
                    if attempt > 0 {
                        debug!("Operation succeeded on attempt {}", attempt + 1);
                    }
                    return Ok(result);
                }
                Err(error) => {
                    self.report_failure(logger, attempt, &error);
                    if attempt + 1 >= self.max_attempts {
                        return Err(error);
                    }

                    let delay = backoff.next_backoff().unwrap_or(self.delay);
                    debug!("Retrying after {}ms", delay.as_millis());
                    self.sleeper.sleep(delay);
                    attempt += 1;
                }
            }
        }
    }

    /// Async counterpart of [`RetryPolicy::execute`]; waits with
    /// `tokio::time::sleep` instead of the blocking sleeper.
    pub async fn execute_async<T, E, F, Fut>(
        &self,
        logger: &Logger,
        mut operation: F,
    ) -> std::result::Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Display,
    {
        let mut backoff = self.backoff();
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!("Operation succeeded on attempt {}", attempt + 1);
                    }
                    return Ok(result);
                }
                Err(error) => {
                    self.report_failure(logger, attempt, &error);
                    if attempt + 1 >= self.max_attempts {
                        return Err(error);
                    }

                    let delay = backoff.next_backoff().unwrap_or(self.delay);
                    debug!("Retrying after {}ms", delay.as_millis());
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
