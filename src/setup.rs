//! One-call logging setup.

use thiserror::Error;

use crate::{
    handlers::{HandlerBuildError, HandlerBuilder, HandlerOptions, StreamHandlerBuilder},
    level::{Level, LevelParseError},
    logger::Logger,
    registry::{HandlerRegistry, RegistryEntry},
};

/// Errors raised while configuring a logger.
#[derive(Debug, Error)]
pub enum SetupError {
    /// No handler is known under this name.
    #[error("Unsupported log handler: {0:?}.")]
    UnsupportedHandler(String),
    /// The name is known but no builder is available for it.
    #[error("handler builder not implemented for {0:?}")]
    NotImplemented(String),
    #[error("invalid log level: {0}")]
    InvalidLevel(#[from] LevelParseError),
    #[error(transparent)]
    Handler(#[from] HandlerBuildError),
    /// A declarative configuration could not be parsed.
    #[error("invalid logging configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Attach the requested handlers to `logger` and set its level.
///
/// Names are resolved through the built-in [`HandlerRegistry`]. See
/// [`setup_logging_with`] to supply a custom registry.
///
/// # Errors
///
/// Fails on the first unknown or unbuildable handler, or when `level` is
/// not a level name. Handlers attached before the failure stay attached.
///
/// # Examples
///
/// ```no_run
/// use ulogger::{HandlerOptions, Logger, setup_logging};
///
/// let logger = Logger::new("root");
/// setup_logging(&logger, "my_program", "INFO", &["stream"], &HandlerOptions::default())?;
/// logger.info("ohai");
/// # Ok::<(), ulogger::SetupError>(())
/// ```
pub fn setup_logging<S: AsRef<str>>(
    logger: &Logger,
    progname: &str,
    level: &str,
    handlers: &[S],
    options: &HandlerOptions,
) -> Result<(), SetupError> {
    setup_logging_with(
        &HandlerRegistry::with_defaults(),
        logger,
        progname,
        level,
        handlers,
        options,
    )
}

/// [`setup_logging`] with an explicit registry.
///
/// A `stream` entry in `registry` replaces the console handler; without one,
/// `stream` still builds it.
pub fn setup_logging_with<S: AsRef<str>>(
    registry: &HandlerRegistry,
    logger: &Logger,
    progname: &str,
    level: &str,
    handlers: &[S],
    options: &HandlerOptions,
) -> Result<(), SetupError> {
    let options = options.clone().with_progname(progname);
    for name in handlers {
        let name = name.as_ref();
        let handler = match registry.get(name) {
            Some(RegistryEntry::Available(factory)) => factory(&options)?,
            Some(RegistryEntry::Unavailable) => {
                return Err(SetupError::NotImplemented(name.to_string()));
            }
            None if name == "stream" => StreamHandlerBuilder::from_options(&options).build()?,
            None => return Err(SetupError::UnsupportedHandler(name.to_string())),
        };
        logger.add_handler(handler);
    }
    let level: Level = level.parse()?;
    logger.set_level(level);
    Ok(())
}
