//! Handler forwarding formatted records to a syslog daemon.
//!
//! Each record becomes one `<PRI>message\0` frame. Network sockets are
//! opened when the handler is built so misconfiguration surfaces at setup
//! time. A local daemon socket that is missing at build time is connected on
//! first use instead. All later I/O happens on the handler's worker thread.

use std::{any::Any, io, time::Duration};

use log::{debug, warn};

use super::{
    facility::{Facility, priority},
    transport::{self, DEFAULT_CONNECT_TIMEOUT, Protocol, SyslogAddress, SyslogConnection},
};
use crate::{
    formatter::{Formatter, SharedFormatter},
    handler::{Handler, HandlerError},
    log_record::LogRecord,
    worker::{Sink, Worker, WorkerConfig},
};

/// Encode `message` as a syslog frame for `facility` at the record's level.
pub fn frame(facility: Facility, record: &LogRecord, message: &str) -> Vec<u8> {
    let pri = priority(facility, record.level());
    let mut out = Vec::with_capacity(message.len() + 7);
    out.extend_from_slice(format!("<{pri}>").as_bytes());
    out.extend_from_slice(message.as_bytes());
    out.push(0);
    out
}

struct SyslogSink {
    connection: Option<SyslogConnection>,
    address: SyslogAddress,
    protocol: Protocol,
    facility: Facility,
    formatter: SharedFormatter,
    connect_timeout: Duration,
}

impl SyslogSink {
    fn reconnect(&mut self) -> io::Result<&mut SyslogConnection> {
        debug!("syslog handler: connecting to {}", self.address);
        self.connection = None;
        let connection = transport::connect(&self.address, self.protocol, self.connect_timeout)?;
        Ok(self.connection.insert(connection))
    }
}

impl Sink for SyslogSink {
    fn emit(&mut self, record: &LogRecord) -> io::Result<()> {
        let message = self.formatter.format(record);
        let bytes = frame(self.facility, record, &message);
        let connection = match self.connection.as_mut() {
            Some(connection) => connection,
            None => return self.reconnect()?.send(&bytes),
        };
        match connection.send(&bytes) {
            Ok(()) => Ok(()),
            // The local daemon may have restarted; retry once on a fresh socket.
            Err(_) if connection.is_local() => self.reconnect()?.send(&bytes),
            Err(err) => Err(err),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.connection.as_mut() {
            Some(connection) => connection.flush(),
            None => Ok(()),
        }
    }
}

/// Open the initial connection. Only a missing local socket is tolerated.
fn connect_initial(
    address: &SyslogAddress,
    protocol: Protocol,
    connect_timeout: Duration,
) -> io::Result<Option<SyslogConnection>> {
    match transport::connect(address, protocol, connect_timeout) {
        Ok(connection) => Ok(Some(connection)),
        Err(err) if matches!(address, SyslogAddress::Unix(_)) => {
            warn!("syslog handler: cannot connect to {address} yet: {err}");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Handler writing records to a local or remote syslog daemon.
pub struct SyslogHandler {
    worker: Worker,
    address: SyslogAddress,
    protocol: Protocol,
    facility: Facility,
    formatter: SharedFormatter,
}

impl SyslogHandler {
    /// Connect to `address` and start the worker thread.
    ///
    /// A Unix socket that cannot be reached yet is retried on each record.
    pub fn new(
        address: SyslogAddress,
        protocol: Protocol,
        facility: Facility,
        formatter: impl Formatter + 'static,
    ) -> io::Result<Self> {
        Self::with_config(
            address,
            protocol,
            facility,
            SharedFormatter::new(formatter),
            WorkerConfig::default(),
            DEFAULT_CONNECT_TIMEOUT,
        )
    }

    pub(crate) fn with_config(
        address: SyslogAddress,
        protocol: Protocol,
        facility: Facility,
        formatter: SharedFormatter,
        config: WorkerConfig,
        connect_timeout: Duration,
    ) -> io::Result<Self> {
        let connection = connect_initial(&address, protocol, connect_timeout)?;
        let sink = SyslogSink {
            connection,
            address: address.clone(),
            protocol,
            facility,
            formatter: formatter.clone(),
            connect_timeout,
        };
        Ok(Self {
            worker: Worker::spawn("syslog", config, sink)?,
            address,
            protocol,
            facility,
            formatter,
        })
    }

    pub fn address(&self) -> &SyslogAddress {
        &self.address
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn facility(&self) -> Facility {
        self.facility
    }

    pub fn formatter(&self) -> &SharedFormatter {
        &self.formatter
    }
}

impl Handler for SyslogHandler {
    fn handle(&self, record: LogRecord) -> Result<(), HandlerError> {
        self.worker.submit(record)
    }

    fn flush(&self) -> bool {
        self.worker.flush()
    }

    fn kind(&self) -> &'static str {
        "syslog"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
