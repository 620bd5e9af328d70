//! Name → handler factory lookup used by [`setup_logging`](crate::setup_logging).
//!
//! The built-in names are `stream`, `syslog` and `stackdriver`. A name can be
//! registered with a factory or merely declared: declared names are known but
//! cannot be built, e.g. `stackdriver` when the crate is compiled without the
//! `stackdriver` feature.

use std::{collections::BTreeMap, fmt, sync::Arc};

use crate::{
    handler::Handler,
    handlers::{HandlerBuildError, HandlerBuilder, HandlerOptions, StreamHandlerBuilder, SyslogHandlerBuilder},
};

/// Builds a handler from the shared options.
pub type HandlerFactory =
    Arc<dyn Fn(&HandlerOptions) -> Result<Arc<dyn Handler>, HandlerBuildError> + Send + Sync>;

/// Outcome of looking a name up.
#[derive(Clone)]
pub enum RegistryEntry {
    Available(HandlerFactory),
    /// Known name without a factory.
    Unavailable,
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryEntry::Available(_) => f.write_str("Available(<factory>)"),
            RegistryEntry::Unavailable => f.write_str("Unavailable"),
        }
    }
}

/// Registry of handler factories keyed by name.
#[derive(Clone, Debug, Default)]
pub struct HandlerRegistry {
    entries: BTreeMap<String, RegistryEntry>,
}

impl HandlerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in handlers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("stream", |options| {
            StreamHandlerBuilder::from_options(options).build()
        });
        registry.register("syslog", |options| {
            SyslogHandlerBuilder::from_options(options).build()
        });
        #[cfg(feature = "stackdriver")]
        registry.register("stackdriver", |options| {
            crate::handlers::CloudLoggingHandlerBuilder::from_options(options)?.build()
        });
        #[cfg(not(feature = "stackdriver"))]
        registry.declare("stackdriver");
        registry
    }

    /// Register `factory` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&HandlerOptions) -> Result<Arc<dyn Handler>, HandlerBuildError>
            + Send
            + Sync
            + 'static,
    {
        self.entries
            .insert(name.into(), RegistryEntry::Available(Arc::new(factory)));
        self
    }

    /// Mark `name` as known but not buildable.
    pub fn declare(&mut self, name: impl Into<String>) -> &mut Self {
        self.entries.insert(name.into(), RegistryEntry::Unavailable);
        self
    }

    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
