//! A simple handler that accumulates records in memory for test assertions.
//!
//! This module is shared across multiple test files so that each test module
//! does not need its own copy of the same boilerplate.

use crate::handler::{Handler, HandlerError};
use crate::log_record::LogRecord;
use parking_lot::Mutex;
use std::any::Any;
use std::sync::Arc;

/// Handler that stores every record it receives for later inspection.
#[derive(Clone, Default)]
pub struct CollectingHandler {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl CollectingHandler {
    /// Return a snapshot of all records received so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Messages of the records received so far.
    pub fn messages(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .map(|r| r.message().to_string())
            .collect()
    }
}

impl Handler for CollectingHandler {
    fn handle(&self, record: LogRecord) -> Result<(), HandlerError> {
        self.records.lock().push(record);
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "collecting"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
