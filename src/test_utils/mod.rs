//! Test-only helpers shared across crate unit tests.
//!
//! This module is only compiled for unit tests and provides small utilities
//! used by multiple test modules to keep individual test files focused.

mod collecting_handler;

pub use collecting_handler::CollectingHandler;
