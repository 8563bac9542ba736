//! Runtime Management
//!
//! Reaping, launching and readiness polling, sequenced by the runner
//! lifecycle.

pub mod launcher;
pub mod lifecycle;
pub mod prober;
pub mod reaper;

// Re-export main types
pub use launcher::{LaunchedProcess, check_early_exit, launch};
pub use lifecycle::{JarRunner, RunnerContext, RunnerHandle};
pub use prober::{ProbeOutcome, ProbeSettings, ReadinessProber, ReadinessState};
pub use reaper::Reaper;
