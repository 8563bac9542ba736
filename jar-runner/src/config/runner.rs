//! Runner Configuration
//!
//! Immutable configuration of one runner. Values are only produced by
//! [`RunnerConfigBuilder::build`](super::RunnerConfigBuilder::build), so every
//! field already satisfies its constraints.

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::ffi::OsString;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

use crate::error::{RunnerError, RunnerResult};

/// Environment variable naming the runtime home
pub const ENV_VAR_RUNTIME_HOME: &str = "JAVA_HOME";

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
pub const MIN_POLL_INTERVAL_MS: u64 = 5;
pub const DEFAULT_WAIT_FOR_STARTUP_SECS: u64 = 10;
pub const DEFAULT_ALWAYS_WAIT_MS: u64 = 0;

/// Ordered system properties; keys are unique and keep their first insertion position
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Properties(Vec<(String, String)>);

impl Properties {
    /// Insert a property, replacing the value in place when the key already exists
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// In-memory sink shared between the output pump and the test
#[derive(Clone, Debug, Default)]
pub struct OutputBuffer(Arc<Mutex<Vec<u8>>>);

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, bytes: &[u8]) {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend_from_slice(bytes);
    }

    /// Everything captured so far, decoded lossily as UTF-8
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_empty()
    }
}

/// Destination of a child output stream
#[derive(Clone, Debug)]
pub enum OutputSink {
    /// Forward to the parent's stdout
    Stdout,
    /// Forward to the parent's stderr
    Stderr,
    Discard,
    Buffer(OutputBuffer),
    /// Append to a file, created if missing
    File(PathBuf),
}

type PreInitFn = dyn Fn() -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync;

/// User code run after the pre-launch reap and before the child is spawned
#[derive(Clone)]
pub struct PreInitAction(Arc<PreInitFn>);

impl PreInitAction {
    pub fn new<F, Fut>(action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let action: Arc<PreInitFn> = Arc::new(move || action().boxed());
        Self(action)
    }

    pub async fn perform(&self) -> anyhow::Result<()> {
        (self.0)().await
    }
}

impl fmt::Debug for PreInitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PreInitAction(..)")
    }
}

#[derive(Clone, Debug)]
pub struct RunnerConfig {
    pub(crate) artifact: PathBuf,
    pub(crate) tag_path: PathBuf,
    pub(crate) runtime_home: PathBuf,
    pub(crate) options: Vec<String>,
    pub(crate) properties: Properties,
    pub(crate) arguments: Vec<String>,
    pub(crate) stdout: OutputSink,
    pub(crate) stderr: OutputSink,
    pub(crate) working_dir: PathBuf,
    pub(crate) check_url: Option<Url>,
    pub(crate) poll_interval: Duration,
    pub(crate) wait_for_startup: Duration,
    pub(crate) always_wait: Duration,
    pub(crate) strict_readiness: bool,
    pub(crate) pre_initialization: Option<PreInitAction>,
}

impl RunnerConfig {
    /// Create a new builder for the given artifact
    pub fn builder(artifact: impl Into<PathBuf>) -> super::RunnerConfigBuilder {
        super::RunnerConfigBuilder::new(artifact)
    }

    /// Absolute, canonical path of the launched artifact
    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    /// Path the process tag is derived from
    pub fn tag_path(&self) -> &Path {
        &self.tag_path
    }

    pub fn runtime_home(&self) -> &Path {
        &self.runtime_home
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn stdout(&self) -> &OutputSink {
        &self.stdout
    }

    pub fn stderr(&self) -> &OutputSink {
        &self.stderr
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn check_url(&self) -> Option<&Url> {
        self.check_url.as_ref()
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn wait_for_startup(&self) -> Duration {
        self.wait_for_startup
    }

    pub fn always_wait(&self) -> Duration {
        self.always_wait
    }

    pub fn strict_readiness(&self) -> bool {
        self.strict_readiness
    }

    pub fn pre_initialization(&self) -> Option<&PreInitAction> {
        self.pre_initialization.as_ref()
    }
}

fn is_blank(value: &std::ffi::OsStr) -> bool {
    value.to_string_lossy().trim().is_empty()
}

/// Pick the runtime home: a non-blank explicit value wins, then the environment value.
pub fn resolve_runtime_home(explicit: Option<&Path>, env_value: Option<OsString>) -> RunnerResult<PathBuf> {
    if let Some(home) = explicit.filter(|home| !is_blank(home.as_os_str())) {
        return Ok(home.to_path_buf());
    }

    match env_value {
        Some(value) if !is_blank(&value) => Ok(PathBuf::from(value)),
        _ => Err(RunnerError::config(format!(
            "The environment variable {ENV_VAR_RUNTIME_HOME} is not set or blank."
        ))),
    }
}
