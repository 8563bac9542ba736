//! End-to-end lifecycle tests against real processes
//!
//! The runtime is a shell script standing in for `java`, processes are listed
//! with `ps` and killed with `kill`, exactly as the runner does on a host.

#![cfg(unix)]

use std::time::Duration;

use jar_runner::services::{CommandLister, OsKiller};
use jar_runner::{JarRunner, OutputBuffer, OutputSink, ProcessLister, ReadinessState, Reaper, RunnerConfig, Tag};

mod common;
use common::{HealthServer, TestFixtures, TestHelpers};

const GONE_TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn test_launch_probe_and_reap() {
    shared::logging::try_init_tracing(Some("debug"));

    let fixtures = TestFixtures::new();
    let server = HealthServer::start(1).await;
    let output = OutputBuffer::new();

    let config = RunnerConfig::builder(fixtures.artifact())
        .runtime_home(fixtures.runtime_home())
        .check_url(server.url())
        .poll_interval_ms(50)
        .wait_for_startup_secs(10)
        .property("server.port", 8080)
        .arguments(["--x", "1"])
        .stdout(OutputSink::Buffer(output.clone()))
        .build()
        .unwrap();
    let tag = Tag::for_path(config.tag_path());
    let lister = CommandLister::jps(config.runtime_home());

    let handle = JarRunner::new(config).unwrap().acquire().await.unwrap();
    let pid = handle.pid().unwrap();
    assert_eq!(handle.readiness().unwrap().state, ReadinessState::Ready);
    assert_eq!(server.requests(), 1);

    // The launched process carries the tag on its command line
    let tagged: Vec<_> = lister.list().unwrap().into_iter().filter(|r| r.contains(tag.as_str())).collect();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].pid, pid.to_string());

    assert_eq!(handle.release().await.unwrap(), 1);
    assert!(TestHelpers::wait_until_gone(pid, GONE_TIMEOUT).await);

    let reaper = Reaper::new(lister, OsKiller::new());
    assert_eq!(reaper.reap(&tag).unwrap(), 0);

    let printed = output.contents();
    assert!(printed.contains(&format!("-Dserver.port=8080 {} -jar", tag.flag())));
    assert!(printed.contains("app.jar --x 1"));
}

#[tokio::test]
async fn test_leftover_of_earlier_run_is_reaped_before_launch() {
    let fixtures = TestFixtures::new();
    let artifact = std::fs::canonicalize(fixtures.artifact()).unwrap();
    let tag = Tag::for_path(&artifact);

    // Stands in for a process left behind by a crashed run
    let mut leftover = std::process::Command::new("sh")
        .arg("-c")
        .arg("sleep 30; true")
        .arg("leftover")
        .arg(tag.flag())
        .spawn()
        .unwrap();

    let config = RunnerConfig::builder(&artifact)
        .runtime_home(fixtures.runtime_home())
        .stdout(OutputSink::Discard)
        .build()
        .unwrap();
    let handle = JarRunner::new(config).unwrap().acquire().await.unwrap();

    let status = leftover.wait().unwrap();
    assert!(!status.success());

    handle.release().await.unwrap();
}

#[tokio::test]
async fn test_runners_of_other_artifacts_are_left_alone() {
    let first = TestFixtures::new();
    let second = TestFixtures::new();

    let build = |fixtures: &TestFixtures| {
        RunnerConfig::builder(fixtures.artifact())
            .runtime_home(fixtures.runtime_home())
            .stdout(OutputSink::Discard)
            .build()
            .unwrap()
    };

    let first_handle = JarRunner::new(build(&first)).unwrap().acquire().await.unwrap();
    let first_pid = first_handle.pid().unwrap();

    let second_handle = JarRunner::new(build(&second)).unwrap().acquire().await.unwrap();
    assert_ne!(first_handle.tag(), second_handle.tag());
    assert_eq!(second_handle.release().await.unwrap(), 1);

    assert!(TestHelpers::is_alive(first_pid));
    assert_eq!(first_handle.release().await.unwrap(), 1);
    assert!(TestHelpers::wait_until_gone(first_pid, GONE_TIMEOUT).await);
}

#[tokio::test]
async fn test_working_directory_is_applied() {
    let fixtures = TestFixtures::new();
    let workdir = fixtures.root().join("work");
    std::fs::create_dir(&workdir).unwrap();
    let output = OutputBuffer::new();

    let config = RunnerConfig::builder(fixtures.artifact())
        .runtime_home(fixtures.runtime_home())
        .working_dir(&workdir)
        .stdout(OutputSink::Buffer(output.clone()))
        .build()
        .unwrap();

    JarRunner::new(config).unwrap().acquire().await.unwrap().release().await.unwrap();

    let expected = std::fs::canonicalize(&workdir).unwrap();
    assert!(output.contents().contains(&format!("cwd {}", expected.display())));
}

#[tokio::test]
async fn test_scoped_run_cleans_up() {
    let fixtures = TestFixtures::new();
    let config = RunnerConfig::builder(fixtures.artifact())
        .runtime_home(fixtures.runtime_home())
        .stdout(OutputSink::Discard)
        .build()
        .unwrap();

    let pid = JarRunner::new(config)
        .unwrap()
        .scoped(|context| async move {
            let pid = context.pid.unwrap();
            assert!(TestHelpers::is_alive(pid));
            pid
        })
        .await
        .unwrap();

    assert!(TestHelpers::wait_until_gone(pid, GONE_TIMEOUT).await);
}

#[tokio::test]
async fn test_pre_initialization_runs_before_launch() {
    let fixtures = TestFixtures::new();
    let marker = fixtures.root().join("pre-init.done");

    let written = marker.clone();
    let config = RunnerConfig::builder(fixtures.artifact())
        .runtime_home(fixtures.runtime_home())
        .stdout(OutputSink::Discard)
        .pre_initialization(move || {
            let written = written.clone();
            async move {
                tokio::fs::write(&written, b"done").await?;
                Ok::<(), anyhow::Error>(())
            }
        })
        .build()
        .unwrap();

    let handle = JarRunner::new(config).unwrap().acquire().await.unwrap();
    assert!(marker.exists());
    handle.release().await.unwrap();
}
