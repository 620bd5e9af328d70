//! Micro logging setup.
//!
//! `ulogger` attaches ready-made handlers to a [`Logger`] in one call:
//!
//! - `stream`: formatted lines on `stderr`;
//! - `syslog`: a local or remote syslog daemon, resolved from explicit
//!   options, `SYSLOG_HOST`/`SYSLOG_PORT` and the host platform;
//! - `stackdriver`: Google Cloud Logging, with the host's identity taken from
//!   the GCE metadata server (feature `stackdriver`).
//!
//! ```no_run
//! use ulogger::{HandlerOptions, root, setup_logging};
//!
//! setup_logging(root(), "my_program", "INFO", &["stream", "syslog"], &HandlerOptions::default())?;
//! root().info("ohai");
//! # Ok::<(), ulogger::SetupError>(())
//! ```

#[cfg(feature = "stackdriver")]
pub mod cloud;
pub mod config;
pub mod formatter;
pub mod handler;
pub mod handlers;
pub mod level;
#[cfg(feature = "log-compat")]
pub mod log_compat;
pub mod log_record;
pub mod logger;
mod manager;
mod rate_limited_warner;
pub mod registry;
mod setup;
pub mod stream_handler;
pub mod syslog;
#[cfg(test)]
mod test_utils;
mod worker;

pub use config::LoggingConfig;
pub use formatter::{FormatError, Formatter, PatternFormatter, SharedFormatter};
pub use handler::{Handler, HandlerError};
pub use handlers::{
    Credentials, HandlerBuildError, HandlerBuilder, HandlerOptions, StreamHandlerBuilder,
    SyslogHandlerBuilder,
};
#[cfg(feature = "stackdriver")]
pub use handlers::CloudLoggingHandlerBuilder;
pub use level::{Level, LevelParseError};
#[cfg(feature = "log-compat")]
pub use log_compat::{BridgeError, install_log_bridge, install_root_log_bridge};
pub use log_record::{LogRecord, RecordMetadata};
pub use logger::Logger;
pub use manager::{ROOT_LOGGER_NAME, root};
pub use rate_limited_warner::{DEFAULT_WARN_INTERVAL, RateLimitedWarner};
pub use registry::{HandlerFactory, HandlerRegistry, RegistryEntry};
pub use setup::{SetupError, setup_logging, setup_logging_with};
pub use stream_handler::StreamHandler;
pub use syslog::{AddressArg, Facility, Protocol, SyslogAddress, SyslogEnvironment, SyslogHandler};
