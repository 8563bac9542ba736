//! Bundled server executable and its temporary copy

use std::io::Write;
use std::path::PathBuf;
use tempfile::TempPath;

use jar_runner::{RunnerError, RunnerResult};

pub const SERVER_JAR_PREFIX: &str = "jetty-runner";
pub const SERVER_JAR_SUFFIX: &str = ".jar";

/// Source of the server jar launched for a web archive
#[derive(Clone, Debug)]
pub enum ServerBundle {
    /// Jar embedded in the test binary, typically with `include_bytes!`
    Bytes(&'static [u8]),
    /// Jar on disk
    File(PathBuf),
}

impl ServerBundle {
    /// Copy the bundle to a fresh `jetty-runner*.jar` temporary file.
    ///
    /// The file is deleted when the returned path is dropped.
    pub fn to_temp_jar(&self) -> RunnerResult<TempPath> {
        let mut file = tempfile::Builder::new()
            .prefix(SERVER_JAR_PREFIX)
            .suffix(SERVER_JAR_SUFFIX)
            .tempfile()
            .map_err(|e| temp_error("Cannot create temporary server jar", e))?;

        match self {
            ServerBundle::Bytes(bytes) => file
                .write_all(bytes)
                .map_err(|e| temp_error("Cannot write temporary server jar", e))?,
            ServerBundle::File(path) => {
                let mut source = std::fs::File::open(path)
                    .map_err(|e| temp_error(&format!("Cannot open server jar {}", path.display()), e))?;
                std::io::copy(&mut source, &mut file).map_err(|e| temp_error("Cannot copy server jar", e))?;
            }
        }

        file.flush().map_err(|e| temp_error("Cannot write temporary server jar", e))?;
        Ok(file.into_temp_path())
    }
}

fn temp_error(context: &str, e: std::io::Error) -> RunnerError {
    RunnerError::TempArtifact {
        message: format!("{context}: {e}"),
    }
}
