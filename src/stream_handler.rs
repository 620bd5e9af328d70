//! Stream-based logging handler implementation.
//!
//! [`StreamHandler`] formats records and writes them, one per line, to any
//! `io::Write` target (usually `stderr` or `stdout`) on a background thread.

use std::{
    any::Any,
    io::{self, Write},
};

use crate::{
    formatter::{Formatter, SharedFormatter},
    handler::{Handler, HandlerError},
    log_record::LogRecord,
    worker::{Sink, Worker, WorkerConfig},
};

struct StreamSink<W> {
    writer: W,
    formatter: SharedFormatter,
}

impl<W: Write + Send + 'static> Sink for StreamSink<W> {
    fn emit(&mut self, record: &LogRecord) -> io::Result<()> {
        let msg = self.formatter.format(record);
        writeln!(self.writer, "{msg}")?;
        self.writer.flush()
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Handler that writes formatted log records to an `io::Write` stream.
pub struct StreamHandler {
    worker: Worker,
    formatter: SharedFormatter,
}

impl StreamHandler {
    /// Create a handler writing to `stderr`.
    pub fn stderr(formatter: impl Formatter + 'static) -> io::Result<Self> {
        Self::new(io::stderr(), formatter)
    }

    /// Create a handler writing to `stdout`.
    pub fn stdout(formatter: impl Formatter + 'static) -> io::Result<Self> {
        Self::new(io::stdout(), formatter)
    }

    /// Create a handler from an arbitrary writer and formatter.
    pub fn new<W>(writer: W, formatter: impl Formatter + 'static) -> io::Result<Self>
    where
        W: Write + Send + 'static,
    {
        Self::with_config(writer, SharedFormatter::new(formatter), WorkerConfig::default())
    }

    pub(crate) fn with_config<W>(
        writer: W,
        formatter: SharedFormatter,
        config: WorkerConfig,
    ) -> io::Result<Self>
    where
        W: Write + Send + 'static,
    {
        let sink = StreamSink {
            writer,
            formatter: formatter.clone(),
        };
        Ok(Self {
            worker: Worker::spawn("stream", config, sink)?,
            formatter,
        })
    }

    /// Formatter applied to every record.
    pub fn formatter(&self) -> &SharedFormatter {
        &self.formatter
    }
}

impl Handler for StreamHandler {
    fn handle(&self, record: LogRecord) -> Result<(), HandlerError> {
        self.worker.submit(record)
    }

    fn flush(&self) -> bool {
        self.worker.flush()
    }

    fn kind(&self) -> &'static str {
        "stream"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
