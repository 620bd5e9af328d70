//! Test fixtures that provide `(SharedBuf, StreamHandler)` pairs so handlers
//! can be exercised without touching the terminal.

use rstest::fixture;
use ulogger::{LogRecord, PatternFormatter, StreamHandler};

use super::shared_buffer::SharedBuf;

/// Return a handler writing `LEVEL logger: message` lines into a fresh
/// in-memory buffer.
#[fixture]
pub fn handler_tuple() -> (SharedBuf, StreamHandler) {
    let buffer = SharedBuf::default();
    let formatter = PatternFormatter::new("%(levelname)s %(name)s: %(message)s", None)
        .expect("fixture pattern compiles");
    let handler = StreamHandler::new(buffer.clone(), formatter).expect("handler must start");
    (buffer, handler)
}

/// Return a handler using a closure formatter.
#[fixture]
pub fn closure_handler() -> (SharedBuf, StreamHandler) {
    let buffer = SharedBuf::default();
    let handler = StreamHandler::new(buffer.clone(), |r: &LogRecord| {
        format!("{} - {}", r.level(), r.message())
    })
    .expect("handler must start");
    (buffer, handler)
}
