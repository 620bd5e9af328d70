mod test_utils;

use rstest::rstest;
use test_utils::{SharedBuf, fixtures::{closure_handler, handler_tuple}};
use ulogger::{Handler, Level, LogRecord, StreamHandler};

#[rstest]
fn stream_handler_writes_to_buffer(handler_tuple: (SharedBuf, StreamHandler)) {
    let (buffer, handler) = handler_tuple;
    handler
        .handle(LogRecord::new("core", Level::Info, "hello"))
        .expect("queue has room");
    drop(handler); // ensure thread completes

    assert_eq!(buffer.contents(), "INFO core: hello\n");
}

#[rstest]
fn records_keep_their_order(handler_tuple: (SharedBuf, StreamHandler)) {
    let (buffer, handler) = handler_tuple;
    for i in 0..20 {
        handler
            .handle(LogRecord::new("core", Level::Warning, &format!("msg {i}")))
            .expect("queue has room");
    }
    assert!(handler.flush());
    let lines: Vec<String> = buffer.contents().lines().map(str::to_owned).collect();
    let expected: Vec<String> = (0..20).map(|i| format!("WARNING core: msg {i}")).collect();
    assert_eq!(lines, expected);
}

#[rstest]
fn closure_formatters_are_supported(closure_handler: (SharedBuf, StreamHandler)) {
    let (buffer, handler) = closure_handler;
    handler
        .handle(LogRecord::new("core", Level::Critical, "down"))
        .expect("queue has room");
    assert!(handler.flush());
    assert_eq!(buffer.contents(), "CRITICAL - down\n");
    assert_eq!(handler.kind(), "stream");
}
