//! jar-runner command line
//!
//! - `tag` prints the tag of an artifact
//! - `reap` kills processes left behind for an artifact
//! - `run` starts an artifact like a test would and keeps it up until Ctrl-C

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use jar_runner::config::{ENV_VAR_RUNTIME_HOME, resolve_runtime_home};
use jar_runner::services::{CommandLister, OsKiller};
use jar_runner::{JarRunner, Reaper, RunnerConfig, Tag};

#[derive(Parser)]
#[command(name = "jar-runner")]
#[command(about = "Launch runnable jars as test fixtures and reap their leftovers")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Log level used unless RUST_LOG is set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the process tag of an artifact
    Tag {
        artifact: PathBuf,
    },
    /// Kill every process tagged for an artifact
    Reap {
        artifact: PathBuf,

        /// Runtime home whose jps lists the processes (default: $JAVA_HOME)
        #[arg(long)]
        runtime_home: Option<PathBuf>,

        /// List all host processes with ps instead of jps
        #[arg(long)]
        ps: bool,
    },
    /// Launch an artifact and keep it running until Ctrl-C
    Run {
        artifact: PathBuf,

        #[arg(long)]
        runtime_home: Option<PathBuf>,

        /// URL polled until it answers with HTTP 200
        #[arg(long)]
        check_url: Option<String>,

        #[arg(long, default_value_t = jar_runner::config::DEFAULT_POLL_INTERVAL_MS)]
        poll_interval_ms: u64,

        #[arg(long, default_value_t = jar_runner::config::DEFAULT_WAIT_FOR_STARTUP_SECS)]
        wait_secs: u64,

        #[arg(long, default_value_t = jar_runner::config::DEFAULT_ALWAYS_WAIT_MS)]
        always_wait_ms: u64,

        /// Fail when the check URL never answers with 200
        #[arg(long)]
        strict: bool,

        /// Runtime option such as -Xmx256m
        #[arg(long = "jvm-option", allow_hyphen_values = true)]
        jvm_options: Vec<String>,

        /// System property as KEY=VALUE
        #[arg(short = 'D', value_parser = parse_property)]
        properties: Vec<(String, String)>,

        #[arg(long)]
        working_dir: Option<PathBuf>,

        /// Arguments passed to the artifact
        #[arg(last = true)]
        args: Vec<String>,
    },
}

fn parse_property(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{value}'"))
}

fn tag_for(artifact: &Path) -> anyhow::Result<Tag> {
    let path = std::fs::canonicalize(artifact).with_context(|| format!("Cannot resolve {}", artifact.display()))?;
    Ok(Tag::for_path(&path))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    shared::logging::init_tracing(Some(&args.log_level));

    match args.command {
        Commands::Tag { artifact } => {
            println!("{}", tag_for(&artifact)?);
        }
        Commands::Reap {
            artifact,
            runtime_home,
            ps,
        } => {
            let tag = tag_for(&artifact)?;
            let lister = if ps {
                ps_lister()?
            } else {
                let home = resolve_runtime_home(runtime_home.as_deref(), std::env::var_os(ENV_VAR_RUNTIME_HOME))?;
                CommandLister::jps(&home)
            };

            let killed = Reaper::new(lister, OsKiller::new()).reap(&tag)?;
            println!("{killed}");
        }
        Commands::Run {
            artifact,
            runtime_home,
            check_url,
            poll_interval_ms,
            wait_secs,
            always_wait_ms,
            strict,
            jvm_options,
            properties,
            working_dir,
            args,
        } => {
            let mut builder = RunnerConfig::builder(artifact)
                .options(jvm_options)
                .arguments(args)
                .poll_interval_ms(poll_interval_ms)
                .wait_for_startup_secs(wait_secs)
                .always_wait_ms(always_wait_ms)
                .strict_readiness(strict);
            for (key, value) in properties {
                builder = builder.property(key, value);
            }
            if let Some(home) = runtime_home {
                builder = builder.runtime_home(home);
            }
            if let Some(url) = check_url {
                builder = builder.check_url(url);
            }
            if let Some(dir) = working_dir {
                builder = builder.working_dir(dir);
            }

            let handle = JarRunner::new(builder.build()?)?.acquire().await?;
            tracing::info!(tag = %handle.tag(), pid = ?handle.pid(), "Runner is up, press Ctrl-C to stop");

            tokio::signal::ctrl_c().await?;
            let killed = handle.release().await?;
            tracing::info!(killed, "Runner stopped");
        }
    }

    Ok(())
}

#[cfg(unix)]
fn ps_lister() -> anyhow::Result<CommandLister> {
    Ok(CommandLister::ps())
}

#[cfg(not(unix))]
fn ps_lister() -> anyhow::Result<CommandLister> {
    anyhow::bail!("--ps is only available on Unix")
}
