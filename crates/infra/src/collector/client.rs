//! HTTP adapter for the behavior collector port
//!
//! - `POST {base_url}/behavior` with a [`BehaviorSnapshot`] body
//! - `GET {base_url}/behavior/{user_id}` returning a [`StoredBehavior`]
//!
//! Failed round trips are classified as [`CollectorError`]s and resent while
//! the error is retryable and the configured attempt budget lasts. Every
//! operation is recorded in [`SyncMetrics`].

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, StatusCode};
use tracing::{debug, instrument};
use url::Url;
use wayfare_core::BehaviorCollector;
use wayfare_domain::{BehaviorSnapshot, CollectorConfig, Result, StoredBehavior, WayfareError};

use super::auth::{AccessTokenProvider, StaticTokenProvider};
use super::errors::{CollectorError, CollectorResult};
use crate::errors::InfraError;
use crate::http::{HttpClient, RetryPolicy};
use crate::observability::SyncMetrics;

const BEHAVIOR_SEGMENT: &str = "behavior";

/// Behavior collector reached over HTTP
pub struct HttpBehaviorCollector {
    http: HttpClient,
    base_url: Url,
    auth: Arc<dyn AccessTokenProvider>,
    metrics: Arc<SyncMetrics>,
}

impl HttpBehaviorCollector {
    /// Build a collector from configuration, authenticating with the
    /// configured static token (if any).
    ///
    /// # Errors
    ///
    /// Returns `WayfareError::Config` for an unparsable base URL and
    /// propagates HTTP client construction failures.
    pub fn from_config(config: &CollectorConfig) -> Result<Self> {
        Self::new(config, Arc::new(StaticTokenProvider::new(config.auth_token.clone())))
    }

    /// Build a collector authenticating through `auth`.
    ///
    /// # Errors
    ///
    /// Same as [`HttpBehaviorCollector::from_config`].
    pub fn new(config: &CollectorConfig, auth: Arc<dyn AccessTokenProvider>) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim()).map_err(InfraError::from)?;
        if base_url.cannot_be_a_base() {
            return Err(WayfareError::Config(format!(
                "collector base URL cannot carry paths: {base_url}"
            )));
        }

        let retry = RetryPolicy::new(config.max_attempts, RetryPolicy::DEFAULT_BACKOFF);
        let http = HttpClient::new(config.timeout(), retry)?;

        Ok(Self { http, base_url, auth, metrics: Arc::new(SyncMetrics::new()) })
    }

    /// Share an existing metrics sink
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<SyncMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    #[must_use]
    pub fn metrics(&self) -> Arc<SyncMetrics> {
        Arc::clone(&self.metrics)
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, user_id: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                WayfareError::Config(format!("collector base URL cannot carry paths: {}", self.base_url))
            })?;
            segments.pop_if_empty().push(BEHAVIOR_SEGMENT);
            if let Some(user_id) = user_id {
                segments.push(user_id);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: &Url, token: Option<&str>) -> RequestBuilder {
        let request = self.http.request(method, url.clone());
        match token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    async fn push_snapshot(&self, url: &Url, snapshot: &BehaviorSnapshot) -> CollectorResult<()> {
        let token = self.auth.access_token().await?;
        let token = token.as_deref();

        self.http
            .retry(move |_| self.post_once(url, snapshot, token), CollectorError::should_retry)
            .await
    }

    async fn post_once(
        &self,
        url: &Url,
        snapshot: &BehaviorSnapshot,
        token: Option<&str>,
    ) -> CollectorResult<()> {
        let response = self
            .request(Method::POST, url, token)
            .json(snapshot)
            .send()
            .await
            .map_err(|err| CollectorError::from_transport(&err, url))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(CollectorError::from_status(status, url.as_str(), &body))
    }

    async fn fetch_stored(&self, url: &Url) -> CollectorResult<Option<StoredBehavior>> {
        let token = self.auth.access_token().await?;
        let token = token.as_deref();

        self.http
            .retry(move |_| self.get_once(url, token), CollectorError::should_retry)
            .await
    }

    async fn get_once(
        &self,
        url: &Url,
        token: Option<&str>,
    ) -> CollectorResult<Option<StoredBehavior>> {
        let response = self
            .request(Method::GET, url, token)
            .send()
            .await
            .map_err(|err| CollectorError::from_transport(&err, url))?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CollectorError::from_status(status, url.as_str(), &body));
        }

        let bytes =
            response.bytes().await.map_err(|err| CollectorError::from_transport(&err, url))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        // `null` is "nothing stored"; any other non-object body is malformed
        serde_json::from_slice::<Option<StoredBehavior>>(&bytes)
            .map_err(|err| CollectorError::Malformed(format!("{url}: {err}")))
    }
}

fn log_failure(operation: &'static str, err: &CollectorError) {
    debug!(
        operation,
        category = ?err.category(),
        retryable = err.should_retry(),
        error = %err,
        "Collector request failed"
    );
}

#[async_trait]
impl BehaviorCollector for HttpBehaviorCollector {
    #[instrument(skip(self, snapshot), fields(user_id = %snapshot.user_id))]
    async fn push(&self, snapshot: &BehaviorSnapshot) -> Result<()> {
        let url = self.endpoint(None)?;
        let started = Instant::now();
        let result = self.push_snapshot(&url, snapshot).await;
        self.metrics.record_sync(result.is_ok(), started.elapsed());

        match result {
            Ok(()) => {
                debug!(
                    paths = snapshot.navigation_paths.len(),
                    features = snapshot.feature_usage.len(),
                    "Behavior snapshot pushed"
                );
                Ok(())
            }
            Err(err) => {
                log_failure("push", &err);
                Err(err.into())
            }
        }
    }

    #[instrument(skip(self))]
    async fn fetch(&self, user_id: &str) -> Result<Option<StoredBehavior>> {
        let url = self.endpoint(Some(user_id))?;
        let result = self.fetch_stored(&url).await;
        self.metrics.record_load(result.is_ok());

        result.map_err(|err| {
            log_failure("fetch", &err);
            err.into()
        })
    }
}

impl std::fmt::Debug for HttpBehaviorCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBehaviorCollector")
            .field("base_url", &self.base_url.as_str())
            .field("max_attempts", &self.http.retry_policy().max_attempts())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collector(base_url: &str) -> Result<HttpBehaviorCollector> {
        HttpBehaviorCollector::from_config(&CollectorConfig {
            base_url: base_url.into(),
            ..CollectorConfig::default()
        })
    }

    #[test]
    fn endpoints_extend_base_path() {
        let collector = collector("http://localhost:3000/api/").unwrap();
        assert_eq!(collector.endpoint(None).unwrap().as_str(), "http://localhost:3000/api/behavior");
        assert_eq!(
            collector.endpoint(Some("user 1/x")).unwrap().as_str(),
            "http://localhost:3000/api/behavior/user%201%2Fx"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(collector("not a url"), Err(WayfareError::Config(_))));
        assert!(matches!(collector("mailto:someone@example.com"), Err(WayfareError::Config(_))));
    }
}
