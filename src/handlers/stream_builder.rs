//! Builder for [`StreamHandler`].
//!
//! Allows configuration of stream based handlers writing to `stdout` or
//! `stderr`. The builder exposes basic tuning for channel capacity and
//! a millisecond-based flush timeout. [`StreamHandlerBuilder::from_options`]
//! defaults to `stderr`, the console handler `setup_logging` attaches for
//! `"stream"`.

use std::num::NonZeroU64;

use super::{
    HandlerBuildError, HandlerBuilder, HandlerOptions,
    common::{CommonBuilder, ISO_DATEFMT},
};
use crate::{
    formatter::{PatternFormatter, SharedFormatter, escape_literal},
    stream_handler::StreamHandler,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StreamTarget {
    Stdout,
    Stderr,
}

/// Default console format, e.g.
/// `2017-08-26T14:47:44.968Z prog (4242) INFO: hello`.
pub fn default_stream_format(progname: &str) -> String {
    format!(
        "%(asctime)s.%(msecs)03dZ {} (%(process)d) %(levelname)s: %(message)s",
        escape_literal(progname)
    )
}

/// Builder for constructing [`StreamHandler`] instances.
#[derive(Clone, Debug)]
pub struct StreamHandlerBuilder {
    target: StreamTarget,
    progname: String,
    common: CommonBuilder,
}

impl StreamHandlerBuilder {
    /// Create a builder targeting `stdout`.
    pub fn stdout(progname: impl Into<String>) -> Self {
        Self {
            target: StreamTarget::Stdout,
            progname: progname.into(),
            common: CommonBuilder::default(),
        }
    }

    /// Create a builder targeting `stderr`.
    pub fn stderr(progname: impl Into<String>) -> Self {
        Self {
            target: StreamTarget::Stderr,
            progname: progname.into(),
            common: CommonBuilder::default(),
        }
    }

    /// Create a `stderr` builder from the shared option bag.
    pub fn from_options(options: &HandlerOptions) -> Self {
        Self {
            target: StreamTarget::Stderr,
            progname: options.progname.clone(),
            common: CommonBuilder::with_formats(
                options.fmt.as_deref(),
                options.datefmt.as_deref(),
            ),
        }
    }

    /// Override the record format.
    pub fn with_fmt(mut self, fmt: impl Into<String>) -> Self {
        self.common.fmt = Some(fmt.into());
        self
    }

    /// Override the `asctime` date format.
    pub fn with_datefmt(mut self, datefmt: impl Into<String>) -> Self {
        self.common.datefmt = Some(datefmt.into());
        self
    }

    /// Set the bounded channel capacity.
    ///
    /// # Validation
    ///
    /// The capacity must be greater than zero; invalid values cause `build`
    /// to error.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.common.set_capacity(capacity);
        self
    }

    /// Set the flush timeout in milliseconds.
    pub fn with_flush_timeout_ms(mut self, timeout_ms: NonZeroU64) -> Self {
        self.common.flush_timeout_ms = Some(timeout_ms);
        self
    }

    /// Formatter the built handler will use.
    pub fn formatter(&self) -> Result<PatternFormatter, HandlerBuildError> {
        self.common
            .pattern(|| default_stream_format(&self.progname), Some(ISO_DATEFMT))
    }
}

impl HandlerBuilder for StreamHandlerBuilder {
    type Handler = StreamHandler;

    fn build_inner(&self) -> Result<Self::Handler, HandlerBuildError> {
        self.common.is_capacity_valid()?;
        let formatter = SharedFormatter::new(self.formatter()?);
        let config = self.common.worker_config();
        let handler = match self.target {
            StreamTarget::Stdout => {
                StreamHandler::with_config(std::io::stdout(), formatter, config)?
            }
            StreamTarget::Stderr => {
                StreamHandler::with_config(std::io::stderr(), formatter, config)?
            }
        };
        Ok(handler)
    }
}
