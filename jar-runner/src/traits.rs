//! Trait definitions with mockall annotations for testing
//!
//! The runner touches the host in three places: listing processes, killing
//! processes and probing the readiness URL. Each sits behind a trait so the
//! reaping and polling logic can be tested without real processes or servers.

use shared::ProcessRecord;
use url::Url;

use crate::error::RunnerResult;

/// Snapshot of host processes as structured `(pid, command)` records
#[mockall::automock]
pub trait ProcessLister: Send + Sync {
    /// List processes.
    ///
    /// Any failure to obtain the snapshot is an error; an empty snapshot is not.
    fn list(&self) -> RunnerResult<Vec<ProcessRecord>>;
}

/// Force termination of a single process
#[mockall::automock]
pub trait ProcessKiller: Send + Sync {
    /// Kill the process with the given pid; a failed kill is an error
    fn kill(&self, pid: &str) -> RunnerResult<()>;
}

/// Outcome of a single readiness request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    /// The server answered with this HTTP status
    Status(u16),
    /// Connection refused, reset or timed out; worth retrying
    Unreachable(String),
}

/// One readiness request against the check URL
#[mockall::automock]
#[async_trait::async_trait]
pub trait HealthCheck: Send + Sync {
    /// Perform one GET request.
    ///
    /// # Returns
    /// The status or a retryable failure; `Err` only for failures that no
    /// amount of waiting can fix.
    async fn check(&self, url: &Url) -> RunnerResult<CheckResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_trait_instantiation() {
        let mut lister = MockProcessLister::new();
        lister.expect_list().returning(|| Ok(vec![ProcessRecord::new("1", "init")]));
        assert_eq!(lister.list().unwrap().len(), 1);

        let mut killer = MockProcessKiller::new();
        killer.expect_kill().withf(|pid| pid == "1").returning(|_| Ok(()));
        assert!(killer.kill("1").is_ok());

        let _check = MockHealthCheck::new();
    }
}
