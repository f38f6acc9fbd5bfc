use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use tracing::debug;
use url::Url;
use wayfare_domain::WayfareError;

use crate::errors::InfraError;

const USER_AGENT: &str = concat!("wayfare/", env!("CARGO_PKG_VERSION"));

/// Backoff stops doubling after this many retries
const MAX_BACKOFF_SHIFT: u32 = 6;

/// Attempt budget for one logical request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: usize,
    base_backoff: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(200);

    /// At least one attempt is always made.
    #[must_use]
    pub fn new(max_attempts: usize, base_backoff: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), base_backoff }
    }

    #[must_use]
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Delay before the attempt following `attempt` (1-based).
    #[must_use]
    pub fn backoff_after(&self, attempt: usize) -> Duration {
        let retries = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        let shift = retries.min(MAX_BACKOFF_SHIFT);
        self.base_backoff.saturating_mul(1 << shift)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_BACKOFF)
    }
}

/// reqwest client with a request timeout and a [`RetryPolicy`]
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    retry: RetryPolicy,
}

impl HttpClient {
    /// # Errors
    ///
    /// Returns a `WayfareError` when the underlying client cannot be built
    /// (TLS backend initialization).
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Result<Self, WayfareError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .no_proxy()
            .build()
            .map_err(InfraError::from)?;

        Ok(Self { client, retry })
    }

    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Run `attempt` until it succeeds, `retryable` rejects its error or the
    /// attempt budget is spent. The last outcome is returned.
    ///
    /// `attempt` receives the 1-based attempt number.
    pub async fn retry<T, E, F, Fut, R>(&self, mut attempt: F, retryable: R) -> Result<T, E>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        R: Fn(&E) -> bool,
        E: Display,
    {
        let mut number = 1;
        loop {
            match attempt(number).await {
                Ok(value) => return Ok(value),
                Err(err) if number < self.retry.max_attempts && retryable(&err) => {
                    let delay = self.retry.backoff_after(number);
                    debug!(attempt = number, ?delay, error = %err, "Retrying HTTP request");
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    number += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
