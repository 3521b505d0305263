use axum::body::Bytes;
use reqwest::{StatusCode, Url};
use serde::de::IgnoredAny;
use std::time::Duration;

use crate::key_rotator::{ApiKey, KeyRotator};
use crate::metrics::{UPSTREAM_ATTEMPTS, UPSTREAM_FAILURES};

// Why a single attempt failed. Every variant is retried the same way.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream responded with status {0}")]
    Status(StatusCode),

    #[error("malformed JSON payload: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
#[error("gave up after {attempts} attempts: {last}")]
pub struct RetriesExhausted {
    pub attempts: u32,
    #[source]
    pub last: UpstreamError,
}

#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("invalid upstream url {url}: {reason}")]
    Invalid { url: String, reason: String },

    #[error("upstream url {0} cannot carry a path")]
    NotABase(String),
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    // Delay before the attempt following `attempt` (1-based): backoff, 2x, 4x, ...
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.backoff.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(100),
        }
    }
}

// Attempts made for one download; lives on the stack of a single request
#[derive(Debug)]
struct RetryBudget {
    used: u32,
    max: u32,
}

impl RetryBudget {
    fn new(max: u32) -> Self {
        Self { used: 0, max: max.max(1) }
    }

    fn start_attempt(&mut self) -> u32 {
        self.used += 1;
        self.used
    }

    fn exhausted(&self) -> bool {
        self.used >= self.max
    }
}

pub struct UpstreamClient {
    client: reqwest::Client,
    endpoint: Url,
    host: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl UpstreamClient {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        host: Option<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, EndpointError> {
        let mut endpoint = Url::parse(base_url).map_err(|e| EndpointError::Invalid {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        endpoint
            .path_segments_mut()
            .map_err(|_| EndpointError::NotABase(base_url.to_string()))?
            .pop_if_empty()
            .push("dl");

        let host = host
            .or_else(|| endpoint.host_str().map(str::to_string))
            .unwrap_or_default();

        Ok(Self {
            client,
            endpoint,
            host,
            timeout,
            retry,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    // One call to the conversion api. The JSON body is validated but returned untouched.
    pub async fn fetch(&self, key: &ApiKey, video_id: &str) -> Result<Bytes, UpstreamError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("id", video_id);

        let res = self
            .client
            .get(url)
            .header("x-rapidapi-key", &key.value)
            .header("x-rapidapi-host", &self.host)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }

        let body = res.bytes().await?;
        serde_json::from_slice::<IgnoredAny>(&body)?;
        Ok(body)
    }

    // Call the api with a fresh key per attempt until it succeeds or the budget runs out.
    // Dropping the returned future (client went away) aborts the in-flight call.
    pub async fn forward(
        &self,
        rotator: &KeyRotator,
        video_id: &str,
    ) -> Result<Bytes, RetriesExhausted> {
        let mut budget = RetryBudget::new(self.retry.max_attempts);

        loop {
            let attempt = budget.start_attempt();
            let key = rotator.next_key();
            UPSTREAM_ATTEMPTS.inc();

            match self.fetch(key, video_id).await {
                Ok(body) => {
                    key.record_success();
                    tracing::debug!(attempt, key = %key.fingerprint(), video_id, "upstream call succeeded");
                    return Ok(body);
                }
                Err(e) => {
                    key.record_failure();
                    UPSTREAM_FAILURES.inc();
                    tracing::warn!(
                        attempt,
                        max_attempts = budget.max,
                        key = %key.fingerprint(),
                        video_id,
                        error = %e,
                        "upstream call failed"
                    );

                    if budget.exhausted() {
                        return Err(RetriesExhausted { attempts: attempt, last: e });
                    }
                    tokio::time::sleep(self.retry.delay_after(attempt)).await;
                }
            }
        }
    }
}
