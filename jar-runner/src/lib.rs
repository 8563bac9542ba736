//! Runnable jars as test fixtures
//!
//! A runner launches an artifact as a child process tagged with an identifier
//! derived from the artifact path, waits for an HTTP readiness URL and, at
//! release, kills every process carrying that tag. Processes leaked by an
//! earlier crashed run are killed before the next launch.

pub mod config;
pub mod core;
pub mod discovery;
pub mod error;
pub mod runtime;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use config::{OutputBuffer, OutputSink, RunnerConfig, RunnerConfigBuilder};
pub use core::{LaunchCommand, Tag};
pub use discovery::{ends_with, ends_with_runnable_jar, find_artifact};
pub use error::{RunnerError, RunnerResult};
pub use runtime::{JarRunner, ProbeOutcome, ReadinessState, Reaper, RunnerContext, RunnerHandle};
pub use traits::{CheckResult, HealthCheck, ProcessKiller, ProcessLister};
