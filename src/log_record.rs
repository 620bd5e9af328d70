//! Log record representation.
//!
//! A [`LogRecord`] captures a single log event together with the context a
//! formatter may need: creation time, process id, thread name and source
//! location.

use std::fmt;
use std::thread;

use chrono::{DateTime, Utc};

use crate::level::Level;

/// Source location and runtime context captured alongside a record.
#[derive(Clone, Debug)]
pub struct RecordMetadata {
    /// Rust module path where the log call originated.
    pub module_path: String,
    /// Source file name for the log call.
    pub filename: String,
    /// Line number in the source file.
    pub line_number: u32,
    /// Time the record was created.
    pub timestamp: DateTime<Utc>,
    /// ID of the process that created the record.
    pub process_id: u32,
    /// Name of the thread that created the record (if any).
    pub thread_name: Option<String>,
}

impl Default for RecordMetadata {
    fn default() -> Self {
        Self {
            module_path: String::new(),
            filename: String::new(),
            line_number: 0,
            timestamp: Utc::now(),
            process_id: std::process::id(),
            thread_name: thread::current().name().map(ToString::to_string),
        }
    }
}

/// A single log event.
#[derive(Clone, Debug)]
pub struct LogRecord {
    logger: String,
    level: Level,
    message: String,
    metadata: RecordMetadata,
}

impl LogRecord {
    /// Construct a record for `logger` at `level`, stamped with the current
    /// time, process and thread.
    pub fn new(logger: &str, level: Level, message: &str) -> Self {
        Self::with_metadata(logger, level, message, RecordMetadata::default())
    }

    /// Construct a record with explicit metadata.
    pub fn with_metadata(
        logger: &str,
        level: Level,
        message: &str,
        metadata: RecordMetadata,
    ) -> Self {
        Self {
            logger: logger.to_owned(),
            level,
            message: message.to_owned(),
            metadata,
        }
    }

    /// Name of the logger that created this record.
    pub fn logger(&self) -> &str {
        &self.logger
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn metadata(&self) -> &RecordMetadata {
        &self.metadata
    }

    /// Creation time of the record.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.metadata.timestamp
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.level, self.message)
    }
}
