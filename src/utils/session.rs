// Memoized sessions: once per thread, or once per process
// Author: kelexine (https://github.com/kelexine)

use crate::logger::Logger;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, ThreadId};

/// Caches one value per calling thread.
///
/// The factory runs the first time a given thread asks; later calls from
/// that thread get the cached value back. Entries are not dropped when
/// their thread exits: the map lives as long as the session, so a
/// long-lived session shared by short-lived threads should call
/// [`ThreadSession::release`] before each thread finishes.
pub struct ThreadSession<T> {
    sessions: Mutex<HashMap<ThreadId, Arc<T>>>,
}

impl<T> Default for ThreadSession<T> {
    fn default() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> ThreadSession<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_init<F>(&self, logger: &Logger, factory: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        let id = thread::current().id();
        if let Some(session) = self.sessions.lock().get(&id) {
            return session.clone();
        }

        // Only this thread can insert under its own id, so building the
        // value outside the lock cannot race with itself.
        logger.info(&format!("Current thread: {:?}", id));
        let session = Arc::new(factory());
        self.sessions.lock().insert(id, session.clone());
        session
    }

    /// Drop the calling thread's cached value, returning it if present.
    /// The next `get_or_init` from this thread computes a fresh one.
    pub fn release(&self) -> Option<Arc<T>> {
        self.sessions.lock().remove(&thread::current().id())
    }

    /// Number of threads holding a session.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

/// Computes its value once for the whole process.
pub struct SharedSession<T> {
    cell: OnceCell<Arc<T>>,
}

impl<T> Default for SharedSession<T> {
    fn default() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }
}

impl<T> SharedSession<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_init<F>(&self, logger: &Logger, factory: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        self.cell
            .get_or_init(|| {
                logger.info(&format!("Current thread: {:?}", thread::current().id()));
                Arc::new(factory())
            })
            .clone()
    }

    pub fn get(&self) -> Option<Arc<T>> {
        self.cell.get().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::MemorySink;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_thread_session_computes_once_per_thread() {
        let sink = MemorySink::new();
        let logger = Arc::new(Logger::builder().memory(sink.clone()).build());
        let sessions = Arc::new(ThreadSession::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let make = |calls: &Arc<AtomicUsize>| {
            let calls = calls.clone();
            move || calls.fetch_add(1, Ordering::SeqCst)
        };

        let first = sessions.get_or_init(&logger, make(&calls));
        let again = sessions.get_or_init(&logger, make(&calls));
        assert!(Arc::ptr_eq(&first, &again));

        let other = {
            let (logger, sessions, calls) = (logger.clone(), sessions.clone(), calls.clone());
            thread::spawn(move || *sessions.get_or_init(&logger, make(&calls)))
                .join()
                .unwrap()
        };

        assert_eq!(*first, 0);
        assert_eq!(other, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(sessions.len(), 2);

        let lines = sink.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.starts_with("INFO: Current thread: ThreadId(")));
    }

    #[test]
    fn test_thread_session_release_frees_worker_entries() {
        let logger = Arc::new(Logger::builder().memory(MemorySink::new()).build());
        let sessions = Arc::new(ThreadSession::new());

        let workers: Vec<_> = (0..8)
            .map(|i| {
                let (logger, sessions) = (logger.clone(), sessions.clone());
                thread::spawn(move || {
                    let value = *sessions.get_or_init(&logger, || i);
                    let released = sessions.release();
                    assert_eq!(released.map(|v| *v), Some(value));
                    assert!(sessions.release().is_none());
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert!(sessions.is_empty());

        let first = sessions.get_or_init(&logger, || 100);
        sessions.release();
        let second = sessions.get_or_init(&logger, || 200);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*second, 200);
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn test_shared_session_computes_once() {
        let sink = MemorySink::new();
        let logger = Arc::new(Logger::builder().memory(sink.clone()).build());
        let session = Arc::new(SharedSession::new());
        assert!(session.get().is_none());

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let (logger, session) = (logger.clone(), session.clone());
                thread::spawn(move || *session.get_or_init(&logger, || i))
            })
            .collect();
        let values: Vec<i32> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(values.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(sink.lines().len(), 1);
        assert_eq!(session.get().map(|v| *v), Some(values[0]));
    }
}
