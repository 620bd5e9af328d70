//! Handler builders and associated traits.
//!
//! Provides a minimal builder API for constructing handlers in a
//! type‑safe manner. Each builder implements [`HandlerBuilder`] which
//! returns a shared [`Handler`] ready for registration with a logger.

use std::{io, num::ParseIntError, sync::Arc};

use thiserror::Error;

#[cfg(feature = "stackdriver")]
use crate::cloud::CloudError;
use crate::{formatter::FormatError, handler::Handler};

#[cfg(feature = "stackdriver")]
pub mod cloud_builder;
mod common;
pub mod options;
pub mod stream_builder;
pub mod syslog_builder;
#[cfg(test)]
pub(crate) mod test_helpers;

#[cfg(feature = "stackdriver")]
pub use cloud_builder::CloudLoggingHandlerBuilder;
pub use options::{Credentials, HandlerOptions};
pub use stream_builder::StreamHandlerBuilder;
pub use syslog_builder::SyslogHandlerBuilder;

/// Errors that may occur while building a handler.
#[derive(Debug, Error)]
pub enum HandlerBuildError {
    /// Invalid user supplied configuration.
    #[error("invalid handler configuration: {0}")]
    InvalidConfig(String),
    /// A syslog port that is not a valid integer.
    #[error("invalid syslog port {value:?}: {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: ParseIntError,
    },
    /// The format or date format string failed to compile.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// Underlying I/O error whilst creating the handler.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Metadata lookup or client construction against the cloud provider
    /// failed.
    #[cfg(feature = "stackdriver")]
    #[error(transparent)]
    Cloud(#[from] CloudError),
}

/// Trait implemented by all handler builders.
///
/// `build_inner` returns the concrete handler so callers can inspect it;
/// `build` erases the type for registration with a
/// [`Logger`](crate::Logger).
pub trait HandlerBuilder: Send + Sync {
    /// Concrete handler type produced by this builder.
    type Handler: Handler + 'static;

    /// Build the handler instance.
    fn build_inner(&self) -> Result<Self::Handler, HandlerBuildError>;

    /// Build the handler behind a shared trait object.
    fn build(&self) -> Result<Arc<dyn Handler>, HandlerBuildError> {
        Ok(Arc::new(self.build_inner()?))
    }
}
