//! Shared builder options.
//!
//! Stores fields common to every handler builder: worker queue tuning and
//! the optional format overrides.

use std::{
    num::{NonZeroU64, NonZeroUsize},
    time::Duration,
};

use super::HandlerBuildError;
use crate::{
    formatter::PatternFormatter,
    worker::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_FLUSH_TIMEOUT, WorkerConfig},
};

/// Date format shared by the built-in default formats.
pub(crate) const ISO_DATEFMT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Clone, Debug, Default)]
pub(crate) struct CommonBuilder {
    pub(crate) capacity: Option<NonZeroUsize>,
    pub(crate) capacity_set: bool,
    pub(crate) flush_timeout_ms: Option<NonZeroU64>,
    pub(crate) fmt: Option<String>,
    pub(crate) datefmt: Option<String>,
}

impl CommonBuilder {
    /// Seed the format overrides, treating empty strings as absent.
    pub(crate) fn with_formats(fmt: Option<&str>, datefmt: Option<&str>) -> Self {
        Self {
            fmt: non_empty(fmt),
            datefmt: non_empty(datefmt),
            ..Self::default()
        }
    }

    pub(crate) fn set_capacity(&mut self, capacity: usize) {
        self.capacity = NonZeroUsize::new(capacity);
        self.capacity_set = true;
    }

    pub(crate) fn is_capacity_valid(&self) -> Result<(), HandlerBuildError> {
        if self.capacity.is_none() && self.capacity_set {
            Err(HandlerBuildError::InvalidConfig(
                "capacity must be greater than zero".into(),
            ))
        } else {
            Ok(())
        }
    }

    pub(crate) fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            capacity: self
                .capacity
                .map(NonZeroUsize::get)
                .unwrap_or(DEFAULT_CHANNEL_CAPACITY),
            flush_timeout: self
                .flush_timeout_ms
                .map(|ms| Duration::from_millis(ms.get()))
                .unwrap_or(DEFAULT_FLUSH_TIMEOUT),
        }
    }

    /// Compile `fmt` (or `default_fmt`) with `datefmt` (or `default_datefmt`).
    pub(crate) fn pattern(
        &self,
        default_fmt: impl FnOnce() -> String,
        default_datefmt: Option<&str>,
    ) -> Result<PatternFormatter, HandlerBuildError> {
        let fmt = self.fmt.clone().unwrap_or_else(default_fmt);
        let datefmt = self
            .datefmt
            .clone()
            .or_else(|| default_datefmt.map(str::to_owned));
        Ok(PatternFormatter::new(fmt, datefmt)?)
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_owned)
}
