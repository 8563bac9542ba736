//! Child process spawning

use std::process::ExitStatus;
use tokio::process::Child;
use tokio::task::JoinHandle;

use shared::{runner_debug, runner_info};

use crate::config::RunnerConfig;
use crate::core::{LaunchCommand, Tag};
use crate::error::{RunnerError, RunnerResult};
use crate::services::{configure_child_stdio, spawn_output_pumps};

/// A spawned child with the tasks draining its output
pub struct LaunchedProcess {
    pub child: Child,
    pub pumps: Vec<JoinHandle<()>>,
}

/// Spawn `command` in the configured working directory.
///
/// The child inherits the environment. Its output is pumped into the
/// configured sinks. Readiness is not awaited here.
pub fn launch(tag: &Tag, command: &LaunchCommand, config: &RunnerConfig) -> RunnerResult<LaunchedProcess> {
    let rendered = command.to_string();
    runner_info!(tag, command = %rendered, "Launching runner process");

    let mut cmd = command.to_command();
    cmd.current_dir(config.working_dir());
    configure_child_stdio(&mut cmd);

    let mut child = cmd.spawn().map_err(|source| RunnerError::Launch {
        command: rendered.clone(),
        source,
    })?;

    let pumps = spawn_output_pumps(&mut child, config.stdout(), config.stderr());

    if let Some(status) = child.try_wait()? {
        check_early_exit(&rendered, status)?;
    }

    runner_debug!(tag, pid = ?child.id(), "Runner process started");
    Ok(LaunchedProcess { child, pumps })
}

/// Fail when a child already exited with a non-zero status
pub fn check_early_exit(command: &str, status: ExitStatus) -> RunnerResult<()> {
    if status.success() {
        return Ok(());
    }

    Err(RunnerError::EarlyExit {
        command: command.to_string(),
        code: status.code(),
    })
}
