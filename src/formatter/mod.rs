//! Formatters turning [`LogRecord`]s into text.
//!
//! Provides the core [`Formatter`] trait, a shared trait-object wrapper used
//! by handlers, and [`PatternFormatter`], which understands the familiar
//! `%(field)s` record patterns.

use std::{fmt, sync::Arc};

use crate::log_record::LogRecord;

mod pattern;

pub use pattern::{FormatError, PatternFormatter};
pub(crate) use pattern::escape_literal;

/// Trait for formatting log records into strings.
///
/// Implementors must be thread-safe (`Send + Sync`) so formatters can be
/// moved into handler worker threads.
pub trait Formatter: Send + Sync {
    /// Format a log record into a string representation.
    fn format(&self, record: &LogRecord) -> String;
}

/// Shared formatter trait object used across handlers.
#[derive(Clone)]
pub struct SharedFormatter {
    inner: Arc<dyn Formatter>,
}

impl SharedFormatter {
    /// Create a shared formatter from an owned formatter implementation.
    pub fn new<F>(formatter: F) -> Self
    where
        F: Formatter + 'static,
    {
        Self {
            inner: Arc::new(formatter),
        }
    }

    /// Wrap an existing shared formatter trait object.
    pub fn from_arc(inner: Arc<dyn Formatter>) -> Self {
        Self { inner }
    }

    /// Format a log record using the wrapped formatter instance.
    pub fn format(&self, record: &LogRecord) -> String {
        self.inner.format(record)
    }
}

impl fmt::Debug for SharedFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedFormatter(<dyn Formatter>)")
    }
}

impl Formatter for SharedFormatter {
    fn format(&self, record: &LogRecord) -> String {
        self.inner.format(record)
    }
}

impl<F> Formatter for F
where
    F: Fn(&LogRecord) -> String + Send + Sync,
{
    fn format(&self, record: &LogRecord) -> String {
        self(record)
    }
}
