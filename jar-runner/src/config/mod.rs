//! Configuration Management
//!
//! This module provides the immutable runner configuration and the builder
//! that validates it once, before any process is touched.

pub mod builder;
pub mod runner;

// Re-export main types
pub use builder::RunnerConfigBuilder;
pub use runner::{
    DEFAULT_ALWAYS_WAIT_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_FOR_STARTUP_SECS, ENV_VAR_RUNTIME_HOME,
    MIN_POLL_INTERVAL_MS, OutputBuffer, OutputSink, PreInitAction, Properties, RunnerConfig, resolve_runtime_home,
};
