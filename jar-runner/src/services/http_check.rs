//! HTTP readiness requests

use async_trait::async_trait;
use std::time::Duration;
use url::Url;

use crate::error::{RunnerError, RunnerResult};
use crate::traits::{CheckResult, HealthCheck};

/// Connect and read timeout of every readiness request
pub const HTTP_TIMEOUT: Duration = Duration::from_millis(500);

/// Plain GET requests with short fixed timeouts
#[derive(Clone)]
pub struct HttpHealthCheck {
    client: reqwest::Client,
}

impl HttpHealthCheck {
    pub fn new() -> RunnerResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(HTTP_TIMEOUT)
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| RunnerError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HealthCheck for HttpHealthCheck {
    async fn check(&self, url: &Url) -> RunnerResult<CheckResult> {
        match self.client.get(url.clone()).send().await {
            Ok(response) => Ok(CheckResult::Status(response.status().as_u16())),
            Err(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
                Ok(CheckResult::Unreachable(e.to_string()))
            }
            Err(e) => Err(RunnerError::Probe {
                url: url.to_string(),
                message: e.to_string(),
            }),
        }
    }
}
