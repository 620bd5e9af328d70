//! Compatibility bridge for the Rust `log` crate.
//!
//! [`install_log_bridge`] installs a `log::Log` implementation that turns
//! `log` records into [`LogRecord`]s and dispatches them through a
//! [`Logger`], so `log::info!` and friends reach the configured handlers.

use std::sync::OnceLock;

use log::{Metadata, Record};
use thiserror::Error;

use crate::{
    level::Level,
    log_record::{LogRecord, RecordMetadata},
    logger::Logger,
    manager,
};

/// Returned when the bridge cannot be installed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BridgeError {
    /// Another `log` implementation is already the global logger.
    #[error("a different global logger is already installed")]
    ForeignLogger,
    /// The bridge is installed for a different [`Logger`].
    #[error("the log bridge is already installed for logger {0:?}")]
    OtherLogger(String),
}

/// Adapter implementing the Rust `log::Log` trait.
struct LogBridge {
    logger: &'static Logger,
}

/// Diagnostics from this crate's own worker threads must not loop back into
/// the handlers that produced them. Cloud transport diagnostics are the
/// exception: they are opt-in and the cloud handler skips them itself.
fn is_internal(target: &str) -> bool {
    let own = target == env!("CARGO_CRATE_NAME")
        || target.starts_with(concat!(env!("CARGO_CRATE_NAME"), "::"));
    own && !is_cloud_transport(target)
}

#[cfg(feature = "stackdriver")]
fn is_cloud_transport(target: &str) -> bool {
    target.starts_with(crate::cloud::TRANSPORT_TARGET)
}

#[cfg(not(feature = "stackdriver"))]
fn is_cloud_transport(_target: &str) -> bool {
    false
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        !is_internal(metadata.target()) && self.logger.is_enabled_for(metadata.level().into())
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let metadata = RecordMetadata {
            module_path: record.module_path().unwrap_or_default().to_string(),
            filename: record.file().unwrap_or_default().to_string(),
            line_number: record.line().unwrap_or(0),
            ..Default::default()
        };
        let record = LogRecord::with_metadata(
            record.target(),
            Level::from(record.level()),
            &record.args().to_string(),
            metadata,
        );
        self.logger.log_record(record);
    }

    fn flush(&self) {
        self.logger.flush();
    }
}

static INSTALLED: OnceLock<Result<&'static Logger, BridgeError>> = OnceLock::new();

/// Route records from the `log` facade to `logger`.
///
/// Idempotent for the same logger. The `log` max level is set to `Trace`;
/// filtering happens against the logger's own threshold.
///
/// # Errors
///
/// [`BridgeError::ForeignLogger`] when another `log` implementation was
/// installed first, [`BridgeError::OtherLogger`] when the bridge already
/// serves a different logger.
pub fn install_log_bridge(logger: &'static Logger) -> Result<(), BridgeError> {
    let outcome = INSTALLED.get_or_init(|| {
        log::set_boxed_logger(Box::new(LogBridge { logger }))
            .map_err(|_| BridgeError::ForeignLogger)?;
        log::set_max_level(log::LevelFilter::Trace);
        Ok(logger)
    });
    match outcome {
        Ok(installed) if std::ptr::eq(*installed, logger) => Ok(()),
        Ok(installed) => Err(BridgeError::OtherLogger(installed.name().to_string())),
        Err(err) => Err(err.clone()),
    }
}

/// [`install_log_bridge`] for the process-wide [`root`](crate::root) logger.
pub fn install_root_log_bridge() -> Result<(), BridgeError> {
    install_log_bridge(manager::root())
}
