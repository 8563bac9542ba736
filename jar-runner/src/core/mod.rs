//! Pure building blocks: process tags and launch command assembly

pub mod command;
pub mod tag;

pub use command::{LaunchCommand, RUNTIME_EXECUTABLE};
pub use tag::{TAG_PREFIX, Tag};
