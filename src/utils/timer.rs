// Execution timing helper
// Author: kelexine (https://github.com/kelexine)

use crate::logger::Logger;
use chrono::NaiveTime;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Render a duration as `HH.MM.SS`, whole seconds only.
/// Durations of a day or more wrap around like a clock.
pub fn format_duration(duration: Duration) -> String {
    let secs = (duration.as_secs() % 86_400) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, 0)
        .map(|time| time.format("%H.%M.%S").to_string())
        .unwrap_or_else(|| "00.00.00".to_string())
}

/// Run `operation` and report how long it took at DEBUG.
///
/// The operation's return value is passed through untouched, errors
/// included. A panic skips the report and unwinds as usual.
pub fn timed<T, F>(logger: &Logger, name: &str, operation: F) -> T
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = operation();
    logger.debug(&format!(
        "Function {} ran for {} minute(s) in {:?} thread",
        name,
        format_duration(start.elapsed()),
        std::thread::current().id()
    ));
    result
}

/// Await `future` and report how long it took at DEBUG.
pub async fn timed_async<T, Fut>(logger: &Logger, name: &str, future: Fut) -> T
where
    Fut: Future<Output = T>,
{
    let start = Instant::now();
    let result = future.await;
    logger.debug(&format!(
        "Function {} ran for {} minute(s) in {:?} thread",
        name,
        format_duration(start.elapsed()),
        std::thread::current().id()
    ));
    result
}
