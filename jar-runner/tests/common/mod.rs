//! Common test utilities and infrastructure
//!
//! Fake runtime homes, artifacts and health servers shared by the
//! integration suites.

#![allow(dead_code)]

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items for convenience
pub use fixtures::TestFixtures;
pub use helpers::{HealthServer, TestHelpers};
