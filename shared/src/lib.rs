//! Shared types and logging for the jar runner workspace
//!
//! Holds what both the plain jar runner and the web-archive variant need:
//! the structured process records produced by process enumeration and the
//! tag-aware logging helpers.

pub mod logging;
pub mod types;

pub use types::*;
