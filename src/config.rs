//! Declarative logging configuration.
//!
//! A [`LoggingConfig`] mirrors the arguments of
//! [`setup_logging`](crate::setup_logging) so a program can keep its logging
//! setup in a JSON file:
//!
//! ```json
//! {
//!   "progname": "my_program",
//!   "level": "INFO",
//!   "handlers": ["stream", "syslog"],
//!   "options": {"facility": "local3", "address": ["logs.example", 1514]}
//! }
//! ```

use serde::Deserialize;

use crate::{
    handlers::HandlerOptions,
    logger::Logger,
    registry::HandlerRegistry,
    setup::{SetupError, setup_logging_with},
};

fn default_level() -> String {
    "INFO".to_string()
}

fn default_handlers() -> Vec<String> {
    vec!["stream".to_string()]
}

/// Serialisable equivalent of a `setup_logging` call.
#[derive(Clone, Debug, Deserialize)]
pub struct LoggingConfig {
    pub progname: String,
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_handlers")]
    pub handlers: Vec<String>,
    #[serde(default)]
    pub options: HandlerOptions,
}

impl LoggingConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, SetupError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Configure `logger` with the built-in handlers.
    pub fn apply(&self, logger: &Logger) -> Result<(), SetupError> {
        self.apply_with(&HandlerRegistry::with_defaults(), logger)
    }

    /// Configure `logger`, resolving handler names through `registry`.
    pub fn apply_with(&self, registry: &HandlerRegistry, logger: &Logger) -> Result<(), SetupError> {
        setup_logging_with(
            registry,
            logger,
            &self.progname,
            &self.level,
            self.handlers.as_slice(),
            &self.options,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{level::Level, syslog::Facility};

    #[test]
    fn defaults_to_stream_at_info() {
        let config = LoggingConfig::from_json(r#"{"progname": "prog"}"#).expect("valid config");
        assert_eq!(config.level, "INFO");
        assert_eq!(config.handlers, vec!["stream"]);
        let logger = Logger::new("config");
        config.apply(&logger).expect("stream setup succeeds");
        assert_eq!(logger.level(), Level::Info);
        assert_eq!(logger.handlers()[0].kind(), "stream");
    }

    #[test]
    fn reads_handler_options() {
        let config = LoggingConfig::from_json(
            r#"{"progname": "prog", "level": "DEBUG", "options": {"facility": "local3"}}"#,
        )
        .expect("valid config");
        assert_eq!(config.options.facility, Some(Facility::LOCAL3));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = LoggingConfig::from_json("{").unwrap_err();
        assert!(matches!(err, SetupError::Config(_)));
        let missing = LoggingConfig::from_json(r#"{"level": "INFO"}"#).unwrap_err();
        assert!(missing.to_string().contains("progname"), "{missing}");
    }

    #[test]
    fn unknown_handler_propagates() {
        let config = LoggingConfig::from_json(r#"{"progname": "p", "handlers": ["carrier-pigeon"]}"#)
            .expect("valid config");
        let err = config.apply(&Logger::new("config")).unwrap_err();
        assert!(matches!(err, SetupError::UnsupportedHandler(ref n) if n == "carrier-pigeon"));
    }
}
