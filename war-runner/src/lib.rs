//! Web archives as test fixtures
//!
//! A bundled server executable is copied to a temporary jar and launched with
//! the web archive as its last argument. Everything else, tagging, reaping and
//! readiness polling included, is the jar runner's.

pub mod bundle;
pub mod runner;

// Re-export main types
pub use bundle::{SERVER_JAR_PREFIX, SERVER_JAR_SUFFIX, ServerBundle};
pub use runner::{WarRunner, WarRunnerBuilder};
