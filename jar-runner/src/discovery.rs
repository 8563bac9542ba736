//! Locating a build artifact in a directory

use std::path::{Path, PathBuf};

use crate::error::{RunnerError, RunnerResult};

/// File name suffix of runnable jars produced by the build
pub const RUNNABLE_JAR_SUFFIX: &str = "-runnable.jar";

/// Predicate matching file names with the given suffix
pub fn ends_with(suffix: impl Into<String>) -> impl Fn(&str) -> bool {
    let suffix = suffix.into();
    move |name: &str| name.ends_with(&suffix)
}

pub fn ends_with_runnable_jar() -> impl Fn(&str) -> bool {
    ends_with(RUNNABLE_JAR_SUFFIX)
}

/// Find the single entry of `dir` whose file name satisfies `predicate`.
///
/// No match and more than one match are both errors.
pub fn find_artifact<P>(dir: &Path, predicate: P) -> RunnerResult<PathBuf>
where
    P: Fn(&str) -> bool,
{
    let entries = std::fs::read_dir(dir)
        .map_err(|e| RunnerError::discovery(format!("Error while listing files in {}: {e}", dir.display())))?;

    let mut matches = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| RunnerError::discovery(format!("Error while listing files in {}: {e}", dir.display())))?;
        if predicate(&entry.file_name().to_string_lossy()) {
            matches.push(entry.path());
        }
    }

    match matches.len() {
        0 => Err(RunnerError::discovery(format!(
            "Cannot find a matching file in {}",
            dir.display()
        ))),
        1 => Ok(matches.remove(0)),
        n => Err(RunnerError::discovery(format!(
            "Found more than one matching file in {} ({n} matches)",
            dir.display()
        ))),
    }
}
