//! The handler abstraction shared by every output sink.

use std::any::Any;

use thiserror::Error;

use crate::log_record::LogRecord;

/// Errors a handler may report when accepting a record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler's queue is full and the record was dropped.
    #[error("handler queue is full; record dropped")]
    QueueFull,
    /// The handler's worker has shut down.
    #[error("handler worker has shut down")]
    Closed,
}

/// Trait implemented by all log handlers.
///
/// Handlers are shared between threads, so implementations must be `Send` and
/// `Sync`. Implementations hand records to their own worker and return without
/// blocking on I/O.
pub trait Handler: Send + Sync {
    /// Dispatch a log record for handling.
    fn handle(&self, record: LogRecord) -> Result<(), HandlerError>;

    /// Flush any buffered output. Returns `true` on success.
    fn flush(&self) -> bool {
        true
    }

    /// Short name identifying the handler kind, e.g. `"stream"`.
    fn kind(&self) -> &'static str;

    /// Access the concrete handler for downcasting.
    fn as_any(&self) -> &dyn Any;
}
