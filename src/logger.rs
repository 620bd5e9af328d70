//! Core logger implementation.
//!
//! A [`Logger`] is a named threshold plus an ordered list of handlers.
//! Records that pass the threshold are handed to every handler in attach
//! order; handlers do their own I/O on their worker threads.

use std::sync::{
    Arc,
    atomic::{AtomicU8, AtomicU64, Ordering},
};

use log::warn;
// parking_lot avoids poisoning and matches crate-wide locking strategy
use parking_lot::RwLock;

use crate::{
    handler::Handler, level::Level, log_record::LogRecord, rate_limited_warner::RateLimitedWarner,
};

/// Threshold new loggers start with.
pub const DEFAULT_LEVEL: Level = Level::Warning;

/// Named logger dispatching records to its handlers.
pub struct Logger {
    name: String,
    level: AtomicU8,
    handlers: RwLock<Vec<Arc<dyn Handler>>>,
    dropped_records: AtomicU64,
    warner: RateLimitedWarner,
}

impl Logger {
    /// Create a logger with no handlers and a `WARNING` threshold.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: AtomicU8::new(u8::from(DEFAULT_LEVEL)),
            handlers: RwLock::new(Vec::new()),
            dropped_records: AtomicU64::new(0),
            warner: RateLimitedWarner::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Update the minimum level this logger processes.
    ///
    /// The update is thread‑safe because the level is stored in an
    /// `AtomicU8`.
    pub fn set_level(&self, level: Level) {
        self.level.store(u8::from(level), Ordering::Relaxed);
    }

    /// Current minimum level.
    pub fn level(&self) -> Level {
        Level::try_from(self.level.load(Ordering::Relaxed)).unwrap_or(DEFAULT_LEVEL)
    }

    /// Return whether `level` is enabled for this logger.
    pub fn is_enabled_for(&self, level: Level) -> bool {
        u8::from(level) >= self.level.load(Ordering::Relaxed)
    }

    /// Attach a handler. Records reach handlers in attach order.
    pub fn add_handler(&self, handler: Arc<dyn Handler>) {
        self.handlers.write().push(handler);
    }

    /// Snapshot of the attached handlers.
    pub fn handlers(&self) -> Vec<Arc<dyn Handler>> {
        self.handlers.read().clone()
    }

    /// Remove all attached handlers.
    pub fn clear_handlers(&self) {
        self.handlers.write().clear();
    }

    /// Log `message` at `level`. Returns `true` when the record passed the
    /// threshold and was dispatched.
    pub fn log(&self, level: Level, message: &str) -> bool {
        if !self.is_enabled_for(level) {
            return false;
        }
        self.dispatch(LogRecord::new(&self.name, level, message));
        true
    }

    /// Dispatch an already-constructed record through this logger.
    pub fn log_record(&self, record: LogRecord) -> bool {
        if !self.is_enabled_for(record.level()) {
            return false;
        }
        self.dispatch(record);
        true
    }

    pub fn debug(&self, message: &str) -> bool {
        self.log(Level::Debug, message)
    }

    pub fn info(&self, message: &str) -> bool {
        self.log(Level::Info, message)
    }

    pub fn warning(&self, message: &str) -> bool {
        self.log(Level::Warning, message)
    }

    pub fn error(&self, message: &str) -> bool {
        self.log(Level::Error, message)
    }

    pub fn critical(&self, message: &str) -> bool {
        self.log(Level::Critical, message)
    }

    fn dispatch(&self, record: LogRecord) {
        let handlers = self.handlers.read().clone();
        let Some((last, rest)) = handlers.split_last() else {
            return;
        };
        for handler in rest {
            self.deliver(handler.as_ref(), record.clone());
        }
        self.deliver(last.as_ref(), record);
    }

    fn deliver(&self, handler: &dyn Handler, record: LogRecord) {
        if let Err(err) = handler.handle(record) {
            self.dropped_records.fetch_add(1, Ordering::Relaxed);
            self.warner.record_drop();
            let kind = handler.kind();
            self.warner.warn_if_due(|count| {
                warn!("logger {:?}: {count} records not accepted ({kind}: {err})", self.name);
            });
        }
    }

    /// Flush every handler. `true` only when all of them succeed.
    pub fn flush(&self) -> bool {
        let handlers = self.handlers.read().clone();
        handlers
            .iter()
            .map(|h| h.flush())
            .fold(true, |ok, flushed| ok && flushed)
    }

    /// Number of records a handler refused.
    pub fn dropped_records(&self) -> u64 {
        self.dropped_records.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<&'static str> = self.handlers.read().iter().map(|h| h.kind()).collect();
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("handlers", &kinds)
            .finish()
    }
}
