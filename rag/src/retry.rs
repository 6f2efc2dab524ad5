//! HTTP retry policy shared by the provider clients.
//!
//! Transient failures get a bounded number of retries with exponential
//! backoff. Client errors other than 429 return immediately.

use std::future::Future;
use std::time::Duration;

/// Backoff policy for transient provider failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Additional attempts after the first.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// No retries at all, for callers that handle failure themselves.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before retry `attempt` (0-based), doubling each time.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }

    /// Whether an HTTP status merits another attempt.
    pub fn retryable_status(status: reqwest::StatusCode) -> bool {
        status.as_u16() == 429 || status.is_server_error()
    }

    /// Run `send` until it yields a non-retryable outcome or attempts run
    /// out. Transport errors and retryable statuses both count as transient.
    pub async fn execute<F, Fut>(&self, mut send: F) -> Result<reqwest::Response, reqwest::Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut attempt = 0;
        loop {
            match send().await {
                Ok(response)
                    if Self::retryable_status(response.status())
                        && attempt < self.max_retries =>
                {
                    let wait = self.delay(attempt);
                    log::warn!(
                        "provider returned {}, retrying in {:?}",
                        response.status(),
                        wait
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Ok(response) => return Ok(response),
                Err(err) if attempt < self.max_retries => {
                    let wait = self.delay(attempt);
                    log::warn!("request failed ({err}), retrying in {wait:?}");
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
