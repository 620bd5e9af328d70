//! Process-wide root logger.
//!
//! Most callers pass a [`Logger`] explicitly; [`root`] exists for programs
//! that want one ambient logger configured once at startup.

use once_cell::sync::Lazy;

use crate::logger::Logger;

/// Name of the process-wide logger.
pub const ROOT_LOGGER_NAME: &str = "root";

static ROOT: Lazy<Logger> = Lazy::new(|| Logger::new(ROOT_LOGGER_NAME));

/// The process-wide root logger.
pub fn root() -> &'static Logger {
    &ROOT
}
