// Output sinks for the logger
// Author: kelexine (https://github.com/kelexine)

use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

/// Destination of formatted log records.
pub enum Sink {
    Stdout,
    Stderr,
    Memory(MemorySink),
    Writer(Box<dyn Write + Send>),
}

impl Sink {
    /// Write one complete record and flush it.
    pub(crate) fn write_record(&mut self, record: &str) -> io::Result<()> {
        match self {
            Sink::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(record.as_bytes())?;
                out.flush()
            }
            Sink::Stderr => {
                let mut err = io::stderr().lock();
                err.write_all(record.as_bytes())?;
                err.flush()
            }
            Sink::Memory(buffer) => {
                buffer.push(record);
                Ok(())
            }
            Sink::Writer(writer) => {
                writer.write_all(record.as_bytes())?;
                writer.flush()
            }
        }
    }
}

impl Default for Sink {
    fn default() -> Self {
        Sink::Stdout
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sink::Stdout => f.write_str("Stdout"),
            Sink::Stderr => f.write_str("Stderr"),
            Sink::Memory(_) => f.write_str("Memory"),
            Sink::Writer(_) => f.write_str("Writer"),
        }
    }
}

/// Shared in-memory buffer collecting everything the logger writes.
///
/// Clones share the same buffer, so one handle can be given to the logger
/// while another is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, record: &str) {
        self.buffer.lock().push_str(record);
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        self.buffer.lock().clone()
    }

    /// Output split into lines, terminators removed.
    pub fn lines(&self) -> Vec<String> {
        self.buffer.lock().lines().map(str::to_string).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}
