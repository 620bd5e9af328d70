//! Handler keeping every record in memory, for asserting on what a
//! [`Logger`](ulogger::Logger) dispatched.

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;
use ulogger::{Handler, HandlerError, LogRecord};

#[derive(Clone, Default)]
pub struct MemoryHandler {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemoryHandler {
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }
}

impl Handler for MemoryHandler {
    fn handle(&self, record: LogRecord) -> Result<(), HandlerError> {
        self.records.lock().push(record);
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
