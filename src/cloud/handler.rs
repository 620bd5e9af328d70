//! Handler shipping records to Cloud Logging from a background thread.

use std::{any::Any, collections::BTreeMap, io};

use chrono::SecondsFormat;
use log::{debug, info};

use super::{
    GceResource,
    client::{CloudLoggingClient, LogEntry, WriteRequest},
};
use crate::{
    formatter::{Formatter, SharedFormatter},
    handler::{Handler, HandlerError},
    level::Level,
    log_record::LogRecord,
    worker::{Sink, Worker, WorkerConfig},
};

/// `log` target used for the transport's own diagnostics.
pub const TRANSPORT_TARGET: &str = "ulogger::cloud::transport";

/// Cloud Logging severity name for `level`.
pub fn severity(level: Level) -> &'static str {
    match level {
        Level::Trace | Level::Debug => "DEBUG",
        Level::Info => "INFO",
        Level::Warning => "WARNING",
        Level::Error => "ERROR",
        Level::Critical => "CRITICAL",
    }
}

/// Where and how entries are filed.
#[derive(Clone, Debug)]
pub struct CloudTarget {
    pub log_name: String,
    pub resource: GceResource,
    pub labels: BTreeMap<String, String>,
}

struct CloudSink {
    client: CloudLoggingClient,
    formatter: SharedFormatter,
    log_path: String,
    target: CloudTarget,
    verbosity: Level,
    sent: u64,
}

impl Sink for CloudSink {
    fn emit(&mut self, record: &LogRecord) -> io::Result<()> {
        let text = self.formatter.format(record);
        let request = WriteRequest {
            log_name: &self.log_path,
            resource: &self.target.resource,
            labels: &self.target.labels,
            entries: vec![LogEntry {
                severity: severity(record.level()),
                text_payload: &text,
                timestamp: record
                    .timestamp()
                    .to_rfc3339_opts(SecondsFormat::Micros, true),
            }],
        };
        self.client.write(&request)?;
        self.sent += 1;
        if self.verbosity <= Level::Debug {
            debug!(target: TRANSPORT_TARGET, "sent entry {} to {}", self.sent, self.log_path);
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.verbosity <= Level::Debug {
            debug!(target: TRANSPORT_TARGET, "flushed after {} entries", self.sent);
        }
        Ok(())
    }
}

/// Handler writing records to Google Cloud Logging.
pub struct CloudLoggingHandler {
    worker: Worker,
    project_id: String,
    target: CloudTarget,
    transport_level: Level,
    formatter: SharedFormatter,
}

impl CloudLoggingHandler {
    /// Start a transport for `client`, filing entries under `target`.
    pub fn new(
        client: CloudLoggingClient,
        target: CloudTarget,
        formatter: impl Formatter + 'static,
    ) -> io::Result<Self> {
        Self::with_config(
            client,
            target,
            SharedFormatter::new(formatter),
            Level::Info,
            WorkerConfig::default(),
        )
    }

    pub(crate) fn with_config(
        client: CloudLoggingClient,
        target: CloudTarget,
        formatter: SharedFormatter,
        transport_level: Level,
        config: WorkerConfig,
    ) -> io::Result<Self> {
        let project_id = client.project_id().to_string();
        let log_path = client.log_path(&target.log_name);
        info!(target: TRANSPORT_TARGET, "starting cloud logging transport for {log_path}");
        let sink = CloudSink {
            client,
            formatter: formatter.clone(),
            log_path,
            target: target.clone(),
            verbosity: transport_level,
            sent: 0,
        };
        Ok(Self {
            worker: Worker::spawn("cloud", config, sink)?,
            project_id,
            target,
            transport_level,
            formatter,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn log_name(&self) -> &str {
        &self.target.log_name
    }

    pub fn resource(&self) -> &GceResource {
        &self.target.resource
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.target.labels
    }

    /// Threshold for the transport's own diagnostics.
    pub fn transport_log_level(&self) -> Level {
        self.transport_level
    }

    pub fn formatter(&self) -> &SharedFormatter {
        &self.formatter
    }
}

/// Records from the transport itself are never shipped, or every entry
/// would produce another one.
fn is_transport_record(record: &LogRecord) -> bool {
    record.logger().starts_with(TRANSPORT_TARGET)
}

impl Handler for CloudLoggingHandler {
    fn handle(&self, record: LogRecord) -> Result<(), HandlerError> {
        if is_transport_record(&record) {
            return Ok(());
        }
        self.worker.submit(record)
    }

    fn flush(&self) -> bool {
        self.worker.flush()
    }

    fn kind(&self) -> &'static str {
        "stackdriver"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
