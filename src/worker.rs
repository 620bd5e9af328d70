//! Background worker shared by the built-in handlers.
//!
//! Each handler owns one worker thread fed through a bounded channel. The
//! producer side never blocks: when the queue is full the record is dropped
//! and a rate-limited warning is emitted through the `log` facade. The sink
//! (stream, socket, HTTP transport) is moved into the thread so callers never
//! touch it directly.

use std::{
    io,
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use log::warn;

use crate::{handler::HandlerError, log_record::LogRecord, rate_limited_warner::RateLimitedWarner};

/// Default bounded channel capacity used by handlers.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
/// Default time a flush waits for the worker to acknowledge.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(1);
/// Time `Drop` waits for the worker to drain before detaching it.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Destination driven by a [`Worker`] thread.
pub(crate) trait Sink: Send + 'static {
    /// Emit one record.
    fn emit(&mut self, record: &LogRecord) -> io::Result<()>;

    /// Flush buffered output.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

enum Command {
    Record(LogRecord),
    Flush(Sender<bool>),
}

/// Tuning shared by handler builders.
#[derive(Clone, Copy, Debug)]
pub(crate) struct WorkerConfig {
    pub capacity: usize,
    pub flush_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CHANNEL_CAPACITY,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }
}

/// Owner of a sink's worker thread.
pub(crate) struct Worker {
    label: &'static str,
    tx: Option<Sender<Command>>,
    handle: Option<JoinHandle<()>>,
    done_rx: Receiver<()>,
    flush_timeout: Duration,
    warner: RateLimitedWarner,
}

impl Worker {
    /// Spawn a named worker thread driving `sink`.
    pub fn spawn<S: Sink>(label: &'static str, config: WorkerConfig, sink: S) -> io::Result<Self> {
        let (tx, rx) = bounded(config.capacity);
        let (done_tx, done_rx) = bounded(1);
        let handle = thread::Builder::new()
            .name(format!("ulogger-{label}"))
            .spawn(move || {
                run(label, rx, sink);
                let _ = done_tx.send(());
            })?;
        Ok(Self {
            label,
            tx: Some(tx),
            handle: Some(handle),
            done_rx,
            flush_timeout: config.flush_timeout,
            warner: RateLimitedWarner::default(),
        })
    }

    /// Queue `record` for the worker without blocking.
    pub fn submit(&self, record: LogRecord) -> Result<(), HandlerError> {
        let Some(tx) = &self.tx else {
            return Err(HandlerError::Closed);
        };
        match tx.try_send(Command::Record(record)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.warner.record_drop();
                let label = self.label;
                self.warner.warn_if_due(|count| {
                    warn!("{label} handler: dropped {count} records; queue full");
                });
                Err(HandlerError::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => Err(HandlerError::Closed),
        }
    }

    /// Ask the worker to flush and wait for the acknowledgement.
    pub fn flush(&self) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };
        let (ack_tx, ack_rx) = bounded(1);
        if tx
            .send_timeout(Command::Flush(ack_tx), self.flush_timeout)
            .is_err()
        {
            return false;
        }
        ack_rx.recv_timeout(self.flush_timeout).unwrap_or(false)
    }
}

fn run<S: Sink>(label: &'static str, rx: Receiver<Command>, mut sink: S) {
    for command in rx {
        match command {
            Command::Record(record) => {
                if let Err(err) = sink.emit(&record) {
                    warn!("{label} handler write error: {err}");
                }
            }
            Command::Flush(ack) => {
                let ok = match sink.flush() {
                    Ok(()) => true,
                    Err(err) => {
                        warn!("{label} handler flush error: {err}");
                        false
                    }
                };
                let _ = ack.send(ok);
            }
        }
    }
    if let Err(err) = sink.flush() {
        warn!("{label} handler flush error during shutdown: {err}");
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        let label = self.label;
        self.warner.flush(|count| {
            warn!("{label} handler: dropped {count} records; queue full");
        });
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if self.done_rx.recv_timeout(SHUTDOWN_TIMEOUT).is_err() {
                warn!("{label} handler: worker thread did not shut down within 1s");
                return;
            }
            if handle.join().is_err() {
                warn!("{label} handler: worker thread panicked");
            }
        }
    }
}
