//! Service implementations
//!
//! Real implementations of the host-facing traits plus the output pumps of
//! the child process. These are the only places that run external commands
//! or open network connections.

pub mod http_check;
pub mod output;
pub mod process_killer;
pub mod process_lister;

#[cfg(test)]
mod tests;

// Re-export all service implementations
pub use http_check::{HTTP_TIMEOUT, HttpHealthCheck};
pub use output::{configure_child_stdio, spawn_output_pumps};
pub use process_killer::{OsKiller, kill_command};
pub use process_lister::CommandLister;
