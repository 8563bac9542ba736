//! Readiness polling
//!
//! Fixed-interval polling with a hard attempt budget derived from the
//! startup deadline. Only HTTP 200 counts as ready.

use std::time::Duration;
use url::Url;

use shared::{runner_debug, runner_info, runner_warn};

use crate::config::RunnerConfig;
use crate::core::Tag;
use crate::error::{RunnerError, RunnerResult};
use crate::traits::{CheckResult, HealthCheck};

/// Final state of a readiness probe
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadinessState {
    Ready,
    /// The attempt budget ran out without a 200; only fatal in strict mode
    TimeoutExhausted,
}

/// What a probe did before it stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub state: ReadinessState,
    pub attempts: u64,
    pub sleeps: u64,
}

impl ProbeOutcome {
    pub fn is_ready(&self) -> bool {
        self.state == ReadinessState::Ready
    }
}

/// Probe parameters, usually taken from a [`RunnerConfig`]
#[derive(Clone, Debug)]
pub struct ProbeSettings {
    pub url: Option<Url>,
    pub poll_interval: Duration,
    pub wait_for_startup: Duration,
    pub strict: bool,
}

impl ProbeSettings {
    pub fn from_config(config: &RunnerConfig) -> Self {
        Self {
            url: config.check_url().cloned(),
            poll_interval: config.poll_interval(),
            wait_for_startup: config.wait_for_startup(),
            strict: config.strict_readiness(),
        }
    }

    /// `wait_for_startup / poll_interval`, rounded down
    pub fn max_attempts(&self) -> u64 {
        let interval = self.poll_interval.as_millis().max(1);
        (self.wait_for_startup.as_millis() / interval) as u64
    }
}

/// Polls the check URL until it answers 200 or the attempts are used up
pub struct ReadinessProber<H> {
    check: H,
}

impl<H: HealthCheck> ReadinessProber<H> {
    pub fn new(check: H) -> Self {
        Self { check }
    }

    pub async fn probe(&self, tag: &Tag, settings: &ProbeSettings) -> RunnerResult<ProbeOutcome> {
        let Some(url) = settings.url.as_ref() else {
            return Ok(ProbeOutcome {
                state: ReadinessState::Ready,
                attempts: 0,
                sleeps: 0,
            });
        };

        let max_attempts = settings.max_attempts();
        let mut attempts = 0;
        let mut sleeps = 0;

        runner_debug!(tag, %url, max_attempts, "Waiting for readiness");

        while attempts < max_attempts {
            attempts += 1;

            match self.check.check(url).await? {
                CheckResult::Status(200) => {
                    runner_info!(tag, %url, attempts, "Runner is ready");
                    return Ok(ProbeOutcome {
                        state: ReadinessState::Ready,
                        attempts,
                        sleeps,
                    });
                }
                CheckResult::Status(status) => {
                    runner_debug!(tag, %url, attempt = attempts, status, "Not ready yet");
                }
                CheckResult::Unreachable(reason) => {
                    runner_debug!(tag, %url, attempt = attempts, %reason, "Not reachable yet");
                }
            }

            tokio::time::sleep(settings.poll_interval).await;
            sleeps += 1;
        }

        if settings.strict {
            return Err(RunnerError::ReadinessTimeout {
                url: url.to_string(),
                attempts,
            });
        }

        runner_warn!(tag, %url, attempts, "Gave up waiting for a 200 response, continuing anyway");
        Ok(ProbeOutcome {
            state: ReadinessState::TimeoutExhausted,
            attempts,
            sleeps,
        })
    }
}
