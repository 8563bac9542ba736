//! Runner error types

use thiserror::Error;

/// Every fatal condition of a runner lifecycle, each carrying one descriptive message
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Error while listing processes: {message}")]
    Listing { message: String },

    #[error("Could not 'force kill' the process with pid {pid}: {reason}")]
    KillFailed { pid: String, reason: String },

    #[error("Error while executing command '{command}': {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command '{command}' returned with exit value {}", .code.map_or_else(|| "none (terminated by signal)".to_string(), |c| c.to_string()))]
    EarlyExit { command: String, code: Option<i32> },

    #[error("'{url}' did not respond with 200 after {attempts} attempts")]
    ReadinessTimeout { url: String, attempts: u64 },

    #[error("Failed to wait for response from '{url}': {message}")]
    Probe { url: String, message: String },

    #[error("Pre-initialization action failed: {0:#}")]
    PreInitialization(#[source] anyhow::Error),

    #[error("Artifact discovery failed: {message}")]
    Discovery { message: String },

    #[error("Temporary artifact error: {message}")]
    TempArtifact { message: String },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl RunnerError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn listing(message: impl Into<String>) -> Self {
        Self::Listing {
            message: message.into(),
        }
    }

    pub fn discovery(message: impl Into<String>) -> Self {
        Self::Discovery {
            message: message.into(),
        }
    }

    /// Whether this error was raised by eager configuration validation
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

/// Result type for runner operations
pub type RunnerResult<T> = Result<T, RunnerError>;
