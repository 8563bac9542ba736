//! Process reaping: enumerate, filter by tag, force-kill
//!
//! Reaping is synchronous so a handle dropped without an explicit release can
//! still clean up from `Drop`.

use shared::{runner_debug, runner_info, runner_warn};

use crate::core::Tag;
use crate::error::RunnerResult;
use crate::traits::{ProcessKiller, ProcessLister};

/// Kills every process whose command line carries a tag
pub struct Reaper<L, K> {
    lister: L,
    killer: K,
}

impl<L, K> Reaper<L, K>
where
    L: ProcessLister,
    K: ProcessKiller,
{
    pub fn new(lister: L, killer: K) -> Self {
        Self { lister, killer }
    }

    /// Kill all processes tagged with `tag` and return how many were killed.
    ///
    /// Idempotent; no match is not an error. A listing failure or a failed kill
    /// aborts the call, the remaining matches are left alone.
    pub fn reap(&self, tag: &Tag) -> RunnerResult<usize> {
        let records = self.lister.list()?;
        let matches: Vec<_> = records.iter().filter(|record| record.contains(tag.as_str())).collect();

        if matches.is_empty() {
            runner_debug!(tag, total = records.len(), "No tagged processes found");
            return Ok(0);
        }

        runner_info!(tag, count = matches.len(), "Found tagged processes, killing them");

        for record in &matches {
            runner_debug!(tag, pid = %record.pid, command = %record.command, "Force killing process");
            if let Err(e) = self.killer.kill(&record.pid) {
                runner_warn!(tag, pid = %record.pid, error = %e, "Reap aborted");
                return Err(e);
            }
        }

        Ok(matches.len())
    }
}
