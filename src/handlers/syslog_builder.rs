//! Builder for [`SyslogHandler`].
//!
//! Resolves the destination, protocol, facility and message format from
//! explicit settings, the `SYSLOG_HOST`/`SYSLOG_PORT` environment variables
//! and the host platform. The environment is captured when the builder is
//! created; [`SyslogHandlerBuilder::with_environment`] replaces the snapshot.

use std::{num::NonZeroU64, time::Duration};

use super::{
    HandlerBuildError, HandlerBuilder, HandlerOptions,
    common::{CommonBuilder, ISO_DATEFMT, non_empty},
};
use crate::{
    formatter::{PatternFormatter, SharedFormatter, escape_literal},
    syslog::{
        AddressArg, EnvironmentKind, Facility, Protocol, SyslogAddress, SyslogEnvironment,
        SyslogHandler, resolve_address, resolve_protocol,
        transport::DEFAULT_CONNECT_TIMEOUT,
    },
};

/// Builder for constructing [`SyslogHandler`] instances.
#[derive(Clone, Debug)]
pub struct SyslogHandlerBuilder {
    progname: String,
    environment: SyslogEnvironment,
    address: Option<AddressArg>,
    protocol: Option<Protocol>,
    facility: Option<Facility>,
    connect_timeout: Duration,
    common: CommonBuilder,
}

impl SyslogHandlerBuilder {
    /// Create a builder for `progname`, snapshotting the process environment.
    pub fn new(progname: impl Into<String>) -> Self {
        Self {
            progname: progname.into(),
            environment: SyslogEnvironment::detect(),
            address: None,
            protocol: None,
            facility: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            common: CommonBuilder::default(),
        }
    }

    /// Create a builder from the shared option bag.
    pub fn from_options(options: &HandlerOptions) -> Self {
        let mut builder = Self::new(options.progname.clone());
        builder.address = options.address.clone();
        builder.protocol = options.proto;
        builder.facility = options.facility;
        builder.common.fmt = non_empty(options.fmt.as_deref());
        builder.common.datefmt = non_empty(options.datefmt.as_deref());
        builder
    }

    /// Replace the captured environment snapshot.
    pub fn with_environment(mut self, environment: SyslogEnvironment) -> Self {
        self.environment = environment;
        self
    }

    /// Send to an explicit Unix socket path or `(host, port)` pair.
    pub fn with_address(mut self, address: AddressArg) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    pub fn with_facility(mut self, facility: Facility) -> Self {
        self.facility = Some(facility);
        self
    }

    /// Override the record format.
    pub fn with_fmt(mut self, fmt: impl Into<String>) -> Self {
        self.common.fmt = Some(fmt.into());
        self
    }

    /// Override the `asctime` date format. Ignored on macOS, where the
    /// daemon stamps messages itself.
    pub fn with_datefmt(mut self, datefmt: impl Into<String>) -> Self {
        self.common.datefmt = Some(datefmt.into());
        self
    }

    /// Set the bounded channel capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.common.set_capacity(capacity);
        self
    }

    /// Set the flush timeout in milliseconds.
    pub fn with_flush_timeout_ms(mut self, timeout_ms: NonZeroU64) -> Self {
        self.common.flush_timeout_ms = Some(timeout_ms);
        self
    }

    /// Timeout applied when opening TCP connections.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Where the environment snapshot points syslog output by default.
    pub fn environment_kind(&self) -> EnvironmentKind {
        self.environment.kind()
    }

    /// Resolved destination.
    pub fn address(&self) -> Result<SyslogAddress, HandlerBuildError> {
        resolve_address(self.address.as_ref(), &self.environment)
    }

    /// Resolved socket type, UDP unless set explicitly.
    pub fn protocol(&self) -> Protocol {
        resolve_protocol(self.protocol)
    }

    /// Resolved facility, `LOCAL0` unless set explicitly.
    pub fn facility(&self) -> Facility {
        self.facility.unwrap_or_default()
    }

    /// Formatter the built handler will use.
    ///
    /// On macOS the daemon prefixes its own timestamp and host, so the
    /// default carries only the program name and pid and no date format is
    /// applied. Elsewhere the default is an ISO-8601 UTC timestamp.
    pub fn formatter(&self) -> Result<PatternFormatter, HandlerBuildError> {
        let progname = escape_literal(&self.progname);
        match self.environment_kind() {
            EnvironmentKind::Darwin => {
                let fmt = self
                    .common
                    .fmt
                    .clone()
                    .unwrap_or_else(|| format!("{progname} (%(process)d): %(message)s"));
                Ok(PatternFormatter::new(fmt, None)?)
            }
            EnvironmentKind::Default | EnvironmentKind::Remote => self.common.pattern(
                || format!("%(asctime)s.%(msecs)03dZ {progname} (%(process)d): %(message)s"),
                Some(ISO_DATEFMT),
            ),
        }
    }
}

impl HandlerBuilder for SyslogHandlerBuilder {
    type Handler = SyslogHandler;

    fn build_inner(&self) -> Result<Self::Handler, HandlerBuildError> {
        self.common.is_capacity_valid()?;
        let address = self.address()?;
        let formatter = SharedFormatter::new(self.formatter()?);
        Ok(SyslogHandler::with_config(
            address,
            self.protocol(),
            self.facility(),
            formatter,
            self.common.worker_config(),
            self.connect_timeout,
        )?)
    }
}
