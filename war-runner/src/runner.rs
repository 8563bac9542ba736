//! War runner and its builder

use std::future::Future;
use std::path::{Path, PathBuf};
use tempfile::TempPath;

use jar_runner::config::OutputSink;
use jar_runner::services::{CommandLister, HttpHealthCheck, OsKiller};
use jar_runner::{
    HealthCheck, JarRunner, ProcessKiller, ProcessLister, RunnerConfig, RunnerConfigBuilder, RunnerContext, RunnerError,
    RunnerHandle, RunnerResult, Tag,
};
use shared::{runner_debug, runner_warn};

use crate::bundle::ServerBundle;

/// Collects the settings of a [`WarRunner`]; the server jar is copied at build
pub struct WarRunnerBuilder {
    war: PathBuf,
    bundle: ServerBundle,
    config: RunnerConfigBuilder,
}

impl WarRunnerBuilder {
    pub fn new(war: impl Into<PathBuf>, bundle: ServerBundle) -> Self {
        let war = war.into();
        Self {
            config: RunnerConfig::builder(&war),
            war,
            bundle,
        }
    }

    pub fn runtime_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.config = self.config.runtime_home(home);
        self
    }

    pub fn option(mut self, option: impl Into<String>) -> Self {
        self.config = self.config.option(option);
        self
    }

    pub fn property(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.config = self.config.property(name, value);
        self
    }

    /// Server argument, placed before the web archive
    pub fn argument(mut self, arg: impl Into<String>) -> Self {
        self.config = self.config.argument(arg);
        self
    }

    pub fn arguments<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config = self.config.arguments(args);
        self
    }

    /// Let the server listen on this port (`--port <port>`)
    pub fn http_port(mut self, port: u16) -> Self {
        self.config = self.config.argument("--port").argument(port.to_string());
        self
    }

    pub fn stdout(mut self, sink: OutputSink) -> Self {
        self.config = self.config.stdout(sink);
        self
    }

    pub fn stderr(mut self, sink: OutputSink) -> Self {
        self.config = self.config.stderr(sink);
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config = self.config.working_dir(dir);
        self
    }

    pub fn check_url(mut self, url: impl Into<String>) -> Self {
        self.config = self.config.check_url(url);
        self
    }

    pub fn poll_interval_ms(mut self, millis: u64) -> Self {
        self.config = self.config.poll_interval_ms(millis);
        self
    }

    pub fn wait_for_startup_secs(mut self, seconds: u64) -> Self {
        self.config = self.config.wait_for_startup_secs(seconds);
        self
    }

    pub fn always_wait_ms(mut self, millis: u64) -> Self {
        self.config = self.config.always_wait_ms(millis);
        self
    }

    pub fn strict_readiness(mut self, strict: bool) -> Self {
        self.config = self.config.strict_readiness(strict);
        self
    }

    pub fn pre_initialization<F, Fut>(mut self, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.config = self.config.pre_initialization(action);
        self
    }

    /// Validate, copy the server jar and create a runner with the default host services
    pub fn build(self) -> RunnerResult<WarRunner> {
        let (war, config, server_jar) = self.prepare()?;
        let lister = CommandLister::jps(config.runtime_home());
        let check = HttpHealthCheck::new()?;
        Ok(WarRunner::assemble(war, config, server_jar, lister, OsKiller::new(), check))
    }

    /// Like [`build`](Self::build) with injected host services
    pub fn build_with_services<L, K, H>(self, lister: L, killer: K, check: H) -> RunnerResult<WarRunner<L, K, H>>
    where
        L: ProcessLister + 'static,
        K: ProcessKiller + 'static,
        H: HealthCheck,
    {
        let (war, config, server_jar) = self.prepare()?;
        Ok(WarRunner::assemble(war, config, server_jar, lister, killer, check))
    }

    fn prepare(self) -> RunnerResult<(PathBuf, RunnerConfig, TempPath)> {
        let war = std::fs::canonicalize(&self.war).map_err(|_| {
            RunnerError::config(format!("The War archive {} does not exist.", self.war.display()))
        })?;

        let server_jar = self.bundle.to_temp_jar()?;

        // The tag follows the archive so a later run finds this run's leftovers
        let config = self
            .config
            .artifact(server_jar.to_path_buf())
            .tag_path(&war)
            .argument(war.to_string_lossy())
            .build()?;

        Ok((war, config, server_jar))
    }
}

/// A web archive deployed through the bundled server
pub struct WarRunner<L = CommandLister, K = OsKiller, H = HttpHealthCheck>
where
    L: ProcessLister + 'static,
    K: ProcessKiller + 'static,
    H: HealthCheck,
{
    runner: JarRunner<L, K, H>,
    war: PathBuf,
    server_jar: PathBuf,
}

impl WarRunner {
    pub fn builder(war: impl Into<PathBuf>, bundle: ServerBundle) -> WarRunnerBuilder {
        WarRunnerBuilder::new(war, bundle)
    }
}

impl<L, K, H> WarRunner<L, K, H>
where
    L: ProcessLister + 'static,
    K: ProcessKiller + 'static,
    H: HealthCheck,
{
    fn assemble(war: PathBuf, config: RunnerConfig, server_jar: TempPath, lister: L, killer: K, check: H) -> Self {
        let tag = Tag::for_path(config.tag_path());
        let server_jar_path = server_jar.to_path_buf();

        let runner = JarRunner::with_services(config, lister, killer, check)
            .on_release(move || remove_server_jar(&tag, server_jar));

        Self {
            runner,
            war,
            server_jar: server_jar_path,
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        self.runner.config()
    }

    /// Tag derived from the web archive path
    pub fn tag(&self) -> Tag {
        self.runner.tag()
    }

    /// Absolute path of the deployed web archive
    pub fn war(&self) -> &Path {
        &self.war
    }

    /// Temporary copy of the server jar, removed at release
    pub fn server_jar(&self) -> &Path {
        &self.server_jar
    }

    pub async fn acquire(self) -> RunnerResult<RunnerHandle<L, K>> {
        self.runner.acquire().await
    }

    pub async fn scoped<F, Fut, T>(self, body: F) -> RunnerResult<T>
    where
        F: FnOnce(RunnerContext) -> Fut,
        Fut: Future<Output = T>,
    {
        self.runner.scoped(body).await
    }
}

fn remove_server_jar(tag: &Tag, server_jar: TempPath) {
    let path = server_jar.to_path_buf();
    match server_jar.close() {
        Ok(()) => {
            runner_debug!(tag, path = %path.display(), "Removed temporary server jar");
        }
        Err(e) => {
            runner_warn!(tag, path = %path.display(), error = %e, "Could not remove temporary server jar");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jar_runner::traits::{MockHealthCheck, MockProcessKiller, MockProcessLister};

    fn war_file() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let war = dir.path().join("shop.war");
        std::fs::write(&war, b"PK").unwrap();
        (dir, war)
    }

    fn builder(war: &Path) -> WarRunnerBuilder {
        WarRunner::builder(war, ServerBundle::Bytes(b"server")).runtime_home("/opt/jdk")
    }

    #[test]
    fn test_missing_war_is_rejected() {
        let err = builder(Path::new("/definitely/not/here.war")).build().err().unwrap();

        assert!(err.is_configuration());
        assert!(err.to_string().contains("The War archive /definitely/not/here.war does not exist."));
    }

    #[test]
    fn test_war_is_last_argument_and_tag_source() {
        let (_dir, war) = war_file();
        let runner = builder(&war).http_port(8080).argument("--stats").build().unwrap();

        let war = std::fs::canonicalize(&war).unwrap();
        let expected = vec![
            "--port".to_string(),
            "8080".to_string(),
            "--stats".to_string(),
            war.to_string_lossy().into_owned(),
        ];
        assert_eq!(runner.config().arguments(), expected.as_slice());
        assert_eq!(runner.config().tag_path(), war.as_path());
        assert_eq!(runner.tag(), Tag::for_path(&war));
        assert_eq!(runner.war(), war.as_path());
    }

    #[test]
    fn test_server_jar_is_the_artifact() {
        let (_dir, war) = war_file();
        let runner = builder(&war).build().unwrap();

        let jar = runner.server_jar().to_path_buf();
        assert_eq!(std::fs::canonicalize(&jar).unwrap(), runner.config().artifact());
        assert_eq!(std::fs::read(&jar).unwrap(), b"server");
    }

    #[test]
    fn test_unused_runner_removes_server_jar() {
        let (_dir, war) = war_file();
        let runner = builder(&war).build().unwrap();
        let jar = runner.server_jar().to_path_buf();
        assert!(jar.exists());

        drop(runner);
        assert!(!jar.exists());
    }

    #[test]
    fn test_invalid_settings_fail_build() {
        let (_dir, war) = war_file();

        let err = builder(&war)
            .poll_interval_ms(1)
            .build_with_services(MockProcessLister::new(), MockProcessKiller::new(), MockHealthCheck::new())
            .err()
            .unwrap();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_failed_acquire_removes_server_jar() {
        let (_dir, war) = war_file();

        let mut lister = MockProcessLister::new();
        lister.expect_list().times(2).returning(|| Ok(Vec::new()));
        let mut killer = MockProcessKiller::new();
        killer.expect_kill().never();

        let runner = builder(&war)
            .runtime_home("/definitely/not/a/jdk")
            .build_with_services(lister, killer, MockHealthCheck::new())
            .unwrap();
        let jar = runner.server_jar().to_path_buf();

        let err = runner.acquire().await.err().unwrap();
        assert!(matches!(err, RunnerError::Launch { .. }));
        assert!(!jar.exists());
    }
}
