//! Launch command assembly
//!
//! The command has the shape
//! `<home>/bin/java [options] -D<k>=<v>... -D<tag> -jar <artifact> [args]`.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{Properties, RunnerConfig};
use crate::core::tag::Tag;

/// Name of the runtime launcher below `<home>/bin`
pub const RUNTIME_EXECUTABLE: &str = "java";

/// Program plus argument vector of a runner child process
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl LaunchCommand {
    pub fn build(
        runtime_home: &Path,
        options: &[String],
        properties: &Properties,
        tag: &Tag,
        artifact: &Path,
        arguments: &[String],
    ) -> Self {
        let program = runtime_home.join("bin").join(RUNTIME_EXECUTABLE);

        let mut args = Vec::with_capacity(options.len() + properties.len() + arguments.len() + 3);
        args.extend(options.iter().cloned());
        args.extend(properties.iter().map(|(key, value)| format!("-D{key}={value}")));
        args.push(tag.flag());
        args.push("-jar".to_string());
        args.push(artifact.to_string_lossy().into_owned());
        args.extend(arguments.iter().cloned());

        Self { program, args }
    }

    pub fn for_config(config: &RunnerConfig, tag: &Tag) -> Self {
        Self::build(
            config.runtime_home(),
            config.options(),
            config.properties(),
            tag,
            config.artifact(),
            config.arguments(),
        )
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Child process command with program and arguments applied
    pub fn to_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
