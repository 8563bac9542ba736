//! Force-kill through the operating system's own command

use std::process::{Command, Stdio};

use crate::error::{RunnerError, RunnerResult};
use crate::traits::ProcessKiller;

/// Program and arguments killing `pid` on the current platform
pub fn kill_command(pid: &str) -> (&'static str, Vec<String>) {
    if cfg!(windows) {
        (
            "taskkill",
            vec!["/F".to_string(), "/PID".to_string(), pid.to_string()],
        )
    } else {
        ("kill", vec![pid.to_string()])
    }
}

/// Kills with `kill <pid>` on Unix and macOS, `taskkill /F /PID <pid>` on Windows
#[derive(Debug, Clone, Default)]
pub struct OsKiller;

impl OsKiller {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessKiller for OsKiller {
    fn kill(&self, pid: &str) -> RunnerResult<()> {
        let (program, args) = kill_command(pid);

        let output = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| RunnerError::KillFailed {
                pid: pid.to_string(),
                reason: format!("'{program}' could not be executed: {e}"),
            })?;

        if output.status.success() {
            return Ok(());
        }

        Err(RunnerError::KillFailed {
            pid: pid.to_string(),
            reason: format!(
                "'{program}' returned with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        })
    }
}
