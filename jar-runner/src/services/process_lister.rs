//! Process enumeration through an external listing tool
//!
//! The tool must print one process per line as `<pid> <command...>`. Both
//! `jps -mlvV` (JVMs of one runtime) and `ps -eo pid=,args=` (every process on
//! Unix) have that shape, so the same parser serves both.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use shared::{ProcessRecord, parse_listing};

use crate::error::{RunnerError, RunnerResult};
use crate::traits::ProcessLister;

/// Lists processes by running a command and parsing its stdout
#[derive(Debug, Clone)]
pub struct CommandLister {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandLister {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// `<home>/bin/jps -mlvV`: every JVM of the runtime with its full arguments
    pub fn jps(runtime_home: &Path) -> Self {
        Self::new(runtime_home.join("bin").join("jps"), vec!["-mlvV".to_string()])
    }

    /// `ps -eo pid=,args=`: every process of the host
    #[cfg(unix)]
    pub fn ps() -> Self {
        Self::new("ps", vec!["-eo".to_string(), "pid=,args=".to_string()])
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn describe(&self) -> String {
        let mut description = self.program.display().to_string();
        for arg in &self.args {
            description.push(' ');
            description.push_str(arg);
        }
        description
    }
}

impl ProcessLister for CommandLister {
    fn list(&self) -> RunnerResult<Vec<ProcessRecord>> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| RunnerError::listing(format!("'{}' could not be executed: {e}", self.describe())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RunnerError::listing(format!(
                "'{}' returned with {}: {}",
                self.describe(),
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_listing(&stdout))
    }
}
