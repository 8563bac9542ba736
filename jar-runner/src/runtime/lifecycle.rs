//! Runner lifecycle: acquire, use, release
//!
//! Acquisition order is reap, pre-initialization, launch, readiness probe and
//! the optional fixed wait. Release reaps again and makes sure the owned child
//! is gone. Release also runs when acquisition fails halfway and, best-effort,
//! when a handle is dropped without an explicit release.

use futures_util::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Child;
use tokio::task::JoinHandle;

use shared::{runner_debug, runner_error, runner_info, runner_warn};

use crate::config::RunnerConfig;
use crate::core::{LaunchCommand, Tag};
use crate::error::{RunnerError, RunnerResult};
use crate::runtime::launcher::launch;
use crate::runtime::prober::{ProbeOutcome, ProbeSettings, ReadinessProber};
use crate::runtime::reaper::Reaper;
use crate::services::{CommandLister, HttpHealthCheck, OsKiller};
use crate::traits::{HealthCheck, ProcessKiller, ProcessLister};

/// How long release waits for the output pumps to see EOF before aborting them
const PUMP_DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

type ReleaseHook = Box<dyn FnOnce() + Send>;

/// Launches one artifact as a test fixture
pub struct JarRunner<L = CommandLister, K = OsKiller, H = HttpHealthCheck>
where
    L: ProcessLister + 'static,
    K: ProcessKiller + 'static,
    H: HealthCheck,
{
    config: Arc<RunnerConfig>,
    reaper: Reaper<L, K>,
    prober: ReadinessProber<H>,
    release_hooks: Vec<ReleaseHook>,
}

impl JarRunner {
    /// Runner listing processes with `jps` from the configured runtime home
    pub fn new(config: RunnerConfig) -> RunnerResult<Self> {
        let lister = CommandLister::jps(config.runtime_home());
        let check = HttpHealthCheck::new()?;
        Ok(Self::with_services(config, lister, OsKiller::new(), check))
    }
}

impl<L, K, H> JarRunner<L, K, H>
where
    L: ProcessLister + 'static,
    K: ProcessKiller + 'static,
    H: HealthCheck,
{
    /// Create a runner with injected host services
    pub fn with_services(config: RunnerConfig, lister: L, killer: K, check: H) -> Self {
        Self {
            config: Arc::new(config),
            reaper: Reaper::new(lister, killer),
            prober: ReadinessProber::new(check),
            release_hooks: Vec::new(),
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Tag of every process launched by this runner
    pub fn tag(&self) -> Tag {
        Tag::for_path(self.config.tag_path())
    }

    /// Register an action run once at release, after the child is gone
    pub fn on_release<F>(mut self, hook: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.release_hooks.push(Box::new(hook));
        self
    }

    /// Start the artifact and wait for readiness.
    ///
    /// On failure everything acquired so far is released before the error is
    /// returned.
    pub async fn acquire(self) -> RunnerResult<RunnerHandle<L, K>> {
        let Self {
            config,
            reaper,
            prober,
            release_hooks,
        } = self;

        let mut handle = RunnerHandle {
            tag: Tag::for_path(config.tag_path()),
            config,
            reaper,
            child: None,
            pumps: Vec::new(),
            readiness: None,
            release_hooks,
            released: false,
        };

        match start(&mut handle, &prober).await {
            Ok(()) => Ok(handle),
            Err(e) => {
                runner_error!(handle.tag, error = %e, "Failed to start runner, releasing");
                let tag = handle.tag.clone();
                if let Err(release_err) = handle.release().await {
                    runner_error!(tag, error = %release_err, "Release after failed start failed");
                }
                Err(e)
            }
        }
    }

    /// Acquire, run `body`, then release on every exit path.
    ///
    /// A panicking body is resumed after the release. A release failure is
    /// only returned when the body itself completed.
    pub async fn scoped<F, Fut, T>(self, body: F) -> RunnerResult<T>
    where
        F: FnOnce(RunnerContext) -> Fut,
        Fut: Future<Output = T>,
    {
        let handle = self.acquire().await?;
        let result = AssertUnwindSafe(body(handle.context())).catch_unwind().await;
        let released = handle.release().await;

        match result {
            Ok(value) => released.map(|_| value),
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

async fn start<L, K, H>(handle: &mut RunnerHandle<L, K>, prober: &ReadinessProber<H>) -> RunnerResult<()>
where
    L: ProcessLister + 'static,
    K: ProcessKiller + 'static,
    H: HealthCheck,
{
    let reaped = handle.reaper.reap(&handle.tag)?;
    if reaped > 0 {
        runner_info!(handle.tag, reaped, "Killed leftovers of an earlier run");
    }

    if let Some(action) = handle.config.pre_initialization() {
        runner_debug!(handle.tag, "Running pre-initialization");
        action.perform().await.map_err(RunnerError::PreInitialization)?;
    }

    let command = LaunchCommand::for_config(&handle.config, &handle.tag);
    let launched = launch(&handle.tag, &command, &handle.config)?;
    handle.child = Some(launched.child);
    handle.pumps = launched.pumps;

    let outcome = prober.probe(&handle.tag, &ProbeSettings::from_config(&handle.config)).await?;
    handle.readiness = Some(outcome);

    let always_wait = handle.config.always_wait();
    if !always_wait.is_zero() {
        runner_debug!(handle.tag, wait_ms = always_wait.as_millis() as u64, "Waiting after readiness check");
        tokio::time::sleep(always_wait).await;
    }

    Ok(())
}

/// Snapshot of a live runner handed to test bodies
#[derive(Clone, Debug)]
pub struct RunnerContext {
    pub tag: Tag,
    pub config: Arc<RunnerConfig>,
    pub pid: Option<u32>,
    pub readiness: Option<ProbeOutcome>,
}

/// A running artifact owned by the caller until [`release`](Self::release)
pub struct RunnerHandle<L = CommandLister, K = OsKiller>
where
    L: ProcessLister + 'static,
    K: ProcessKiller + 'static,
{
    tag: Tag,
    config: Arc<RunnerConfig>,
    reaper: Reaper<L, K>,
    child: Option<Child>,
    pumps: Vec<JoinHandle<()>>,
    readiness: Option<ProbeOutcome>,
    release_hooks: Vec<ReleaseHook>,
    released: bool,
}

impl<L, K> RunnerHandle<L, K>
where
    L: ProcessLister + 'static,
    K: ProcessKiller + 'static,
{
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Pid of the launched child, `None` once it was reaped by the runtime
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    pub fn readiness(&self) -> Option<ProbeOutcome> {
        self.readiness
    }

    pub fn context(&self) -> RunnerContext {
        RunnerContext {
            tag: self.tag.clone(),
            config: Arc::clone(&self.config),
            pid: self.pid(),
            readiness: self.readiness,
        }
    }

    /// Reap tagged processes, stop the owned child and run the release hooks.
    ///
    /// Returns how many tagged processes were killed. The child is stopped and
    /// the hooks run even when reaping fails; the reap error is returned last.
    pub async fn release(mut self) -> RunnerResult<usize> {
        self.released = true;

        let reaped = self.reaper.reap(&self.tag);
        match &reaped {
            Ok(count) => {
                runner_info!(self.tag, reaped = *count, "Released runner");
            }
            Err(e) => {
                runner_error!(self.tag, error = %e, "Failed to reap tagged processes");
            }
        }

        if let Some(mut child) = self.child.take() {
            match child.try_wait() {
                Ok(Some(status)) => {
                    runner_debug!(self.tag, %status, "Runner process already exited");
                }
                _ => {
                    if let Err(e) = child.kill().await {
                        runner_warn!(self.tag, error = %e, "Failed to kill runner process");
                    }
                }
            }
        }

        for mut pump in self.pumps.drain(..) {
            if tokio::time::timeout(PUMP_DRAIN_TIMEOUT, &mut pump).await.is_err() {
                pump.abort();
            }
        }

        for hook in self.release_hooks.drain(..) {
            hook();
        }

        reaped
    }
}

impl<L, K> Drop for RunnerHandle<L, K>
where
    L: ProcessLister + 'static,
    K: ProcessKiller + 'static,
{
    fn drop(&mut self) {
        if self.released {
            return;
        }

        runner_warn!(self.tag, "Runner handle dropped without release, cleaning up");

        if let Err(e) = self.reaper.reap(&self.tag) {
            runner_error!(self.tag, error = %e, "Failed to reap tagged processes on drop");
        }

        if let Some(child) = self.child.as_mut() {
            if let Err(e) = child.start_kill() {
                runner_debug!(self.tag, error = %e, "Could not signal runner process on drop");
            }
        }

        for pump in &self.pumps {
            pump.abort();
        }

        for hook in self.release_hooks.drain(..) {
            hook();
        }
    }
}
