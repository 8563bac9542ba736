//! Runner Configuration Builder
//!
//! Fluent builder collecting settings without judging them; [`build`] performs
//! all validation once and fails fast with a configuration error.
//!
//! [`build`]: RunnerConfigBuilder::build

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use super::runner::{
    DEFAULT_ALWAYS_WAIT_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_FOR_STARTUP_SECS, ENV_VAR_RUNTIME_HOME,
    MIN_POLL_INTERVAL_MS, OutputSink, PreInitAction, Properties, RunnerConfig, resolve_runtime_home,
};
use crate::error::{RunnerError, RunnerResult};

pub struct RunnerConfigBuilder {
    artifact: PathBuf,
    tag_path: Option<PathBuf>,
    runtime_home: Option<PathBuf>,
    options: Vec<String>,
    properties: Properties,
    empty_property_name: bool,
    arguments: Vec<String>,
    stdout: OutputSink,
    stderr: OutputSink,
    working_dir: PathBuf,
    check_url: Option<String>,
    poll_interval_ms: u64,
    wait_for_startup_secs: u64,
    always_wait_ms: u64,
    strict_readiness: bool,
    pre_initialization: Option<PreInitAction>,
}

impl RunnerConfigBuilder {
    pub fn new(artifact: impl Into<PathBuf>) -> Self {
        Self {
            artifact: artifact.into(),
            tag_path: None,
            runtime_home: None,
            options: Vec::new(),
            properties: Properties::default(),
            empty_property_name: false,
            arguments: Vec::new(),
            stdout: OutputSink::Stdout,
            stderr: OutputSink::Stderr,
            working_dir: PathBuf::from("."),
            check_url: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            wait_for_startup_secs: DEFAULT_WAIT_FOR_STARTUP_SECS,
            always_wait_ms: DEFAULT_ALWAYS_WAIT_MS,
            strict_readiness: false,
            pre_initialization: None,
        }
    }

    /// Replace the artifact given to [`new`](Self::new)
    pub fn artifact(mut self, artifact: impl Into<PathBuf>) -> Self {
        self.artifact = artifact.into();
        self
    }

    /// Use this runtime home instead of the `JAVA_HOME` environment variable
    pub fn runtime_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.runtime_home = Some(home.into());
        self
    }

    /// Derive the process tag from another existing path than the artifact
    pub fn tag_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.tag_path = Some(path.into());
        self
    }

    /// Add a runtime option placed before the system properties (e.g. `-Xmx256m`)
    pub fn option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.extend(options.into_iter().map(Into::into));
        self
    }

    /// Add a `-D<name>=<value>` system property; re-adding a name replaces its value
    pub fn property(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        let name = name.into();
        if name.trim().is_empty() {
            self.empty_property_name = true;
            return self;
        }
        self.properties.insert(name, value.to_string());
        self
    }

    pub fn argument(mut self, arg: impl Into<String>) -> Self {
        self.arguments.push(arg.into());
        self
    }

    pub fn arguments<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdout(mut self, sink: OutputSink) -> Self {
        self.stdout = sink;
        self
    }

    pub fn stderr(mut self, sink: OutputSink) -> Self {
        self.stderr = sink;
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// URL polled until it answers with HTTP 200
    pub fn check_url(mut self, url: impl Into<String>) -> Self {
        self.check_url = Some(url.into());
        self
    }

    pub fn poll_interval_ms(mut self, millis: u64) -> Self {
        self.poll_interval_ms = millis;
        self
    }

    pub fn wait_for_startup_secs(mut self, seconds: u64) -> Self {
        self.wait_for_startup_secs = seconds;
        self
    }

    /// Fixed wait after the readiness check, whatever its outcome
    pub fn always_wait_ms(mut self, millis: u64) -> Self {
        self.always_wait_ms = millis;
        self
    }

    /// Fail acquisition when the check URL never answers with 200
    pub fn strict_readiness(mut self, strict: bool) -> Self {
        self.strict_readiness = strict;
        self
    }

    pub fn pre_initialization<F, Fut>(mut self, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.pre_initialization = Some(PreInitAction::new(action));
        self
    }

    /// Validate everything and build the configuration.
    ///
    /// The runtime home falls back to the `JAVA_HOME` environment variable.
    pub fn build(self) -> RunnerResult<RunnerConfig> {
        let env_home = std::env::var_os(ENV_VAR_RUNTIME_HOME);
        self.build_with_env(env_home)
    }

    fn build_with_env(self, env_home: Option<std::ffi::OsString>) -> RunnerResult<RunnerConfig> {
        let artifact = canonical_existing(&self.artifact, "The Java runnable")?;
        let tag_path = match &self.tag_path {
            Some(path) => canonical_existing(path, "The tag path")?,
            None => artifact.clone(),
        };
        let runtime_home = resolve_runtime_home(self.runtime_home.as_deref(), env_home)?;

        if self.empty_property_name {
            return Err(RunnerError::config("The name of the system property must not be empty."));
        }

        let check_url = self.check_url.as_deref().map(parse_check_url).transpose()?;

        if self.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            return Err(RunnerError::config(format!(
                "A check interval lower than {MIN_POLL_INTERVAL_MS} ms does not make sense (got {} ms).",
                self.poll_interval_ms
            )));
        }

        if self.wait_for_startup_secs == 0 {
            return Err(RunnerError::config("The 'waitForStartup' time must be a positive number."));
        }

        Ok(RunnerConfig {
            artifact,
            tag_path,
            runtime_home,
            options: self.options,
            properties: self.properties,
            arguments: self.arguments,
            stdout: self.stdout,
            stderr: self.stderr,
            working_dir: self.working_dir,
            check_url,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            wait_for_startup: Duration::from_secs(self.wait_for_startup_secs),
            always_wait: Duration::from_millis(self.always_wait_ms),
            strict_readiness: self.strict_readiness,
            pre_initialization: self.pre_initialization,
        })
    }
}

fn canonical_existing(path: &Path, what: &str) -> RunnerResult<PathBuf> {
    std::fs::canonicalize(path)
        .map_err(|e| RunnerError::config(format!("{what} {} does not exist ({e}).", path.display())))
}

fn parse_check_url(raw: &str) -> RunnerResult<Url> {
    let url = Url::parse(raw).map_err(|e| RunnerError::config(format!("Cannot create URL from {raw} ({e})")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(RunnerError::config(format!(
            "Cannot create URL from {raw} (unsupported scheme '{other}')"
        ))),
    }
}
