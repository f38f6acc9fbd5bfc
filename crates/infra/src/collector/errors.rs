//! Collector-specific error types
//!
//! Every failed round trip is classified here; the category decides whether
//! the request is sent again before the error is folded into the domain error.

use reqwest::StatusCode;
use thiserror::Error;
use url::Url;
use wayfare_domain::WayfareError;

/// Categories of collector errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorErrorCategory {
    /// 401, 403
    Authentication,
    /// 429
    RateLimit,
    /// 5xx
    Server,
    /// Other 4xx, malformed bodies
    Client,
    /// Connection failures and timeouts
    Network,
}

/// Collector operation errors
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Client error: {0}")]
    Client(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),
}

/// Convenience type alias for collector round trips
pub type CollectorResult<T> = std::result::Result<T, CollectorError>;

impl CollectorError {
    #[must_use]
    pub fn category(&self) -> CollectorErrorCategory {
        match self {
            Self::Auth(_) => CollectorErrorCategory::Authentication,
            Self::RateLimit(_) => CollectorErrorCategory::RateLimit,
            Self::Server(_) => CollectorErrorCategory::Server,
            Self::Client(_) | Self::Malformed(_) => CollectorErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => CollectorErrorCategory::Network,
        }
    }

    /// Whether sending the same request again could succeed
    #[must_use]
    pub fn should_retry(&self) -> bool {
        matches!(
            self.category(),
            CollectorErrorCategory::RateLimit
                | CollectorErrorCategory::Server
                | CollectorErrorCategory::Network
        )
    }

    /// Classify a non-success HTTP status.
    #[must_use]
    pub fn from_status(status: StatusCode, url: &str, body: &str) -> Self {
        let message = if body.is_empty() {
            format!("{url} returned status {status}")
        } else {
            format!("{url} returned status {status}: {body}")
        };

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Self::Auth(message)
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimit(message)
        } else if status.is_server_error() {
            Self::Server(message)
        } else {
            Self::Client(message)
        }
    }

    /// Classify a failure that produced no usable response.
    #[must_use]
    pub fn from_transport(err: &reqwest::Error, url: &Url) -> Self {
        let message = format!("{url}: {err}");
        if err.is_timeout() {
            Self::Timeout(message)
        } else if err.is_decode() {
            Self::Malformed(message)
        } else {
            Self::Network(message)
        }
    }
}

impl From<CollectorError> for WayfareError {
    fn from(err: CollectorError) -> Self {
        let message = err.to_string();
        match err {
            CollectorError::Auth(_) => WayfareError::Unavailable(message),
            CollectorError::RateLimit(_)
            | CollectorError::Server(_)
            | CollectorError::Network(_)
            | CollectorError::Timeout(_) => WayfareError::Network(message),
            CollectorError::Client(_) => WayfareError::InvalidInput(message),
            CollectorError::Malformed(_) => WayfareError::Serialization(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;

    #[test]
    fn status_classification() {
        let url = "http://collector/behavior";
        assert_eq!(
            CollectorError::from_status(StatusCode::UNAUTHORIZED, url, "").category(),
            CollectorErrorCategory::Authentication
        );
        assert_eq!(
            CollectorError::from_status(StatusCode::TOO_MANY_REQUESTS, url, "").category(),
            CollectorErrorCategory::RateLimit
        );
        assert_eq!(
            CollectorError::from_status(StatusCode::BAD_GATEWAY, url, "").category(),
            CollectorErrorCategory::Server
        );
        assert_eq!(
            CollectorError::from_status(StatusCode::UNPROCESSABLE_ENTITY, url, "bad").category(),
            CollectorErrorCategory::Client
        );
    }

    #[test]
    fn should_retry() {
        assert!(CollectorError::Server("x".into()).should_retry());
        assert!(CollectorError::Timeout("x".into()).should_retry());
        assert!(!CollectorError::Auth("x".into()).should_retry());
        assert!(!CollectorError::Malformed("x".into()).should_retry());
    }

    #[tokio::test]
    async fn refused_connection_is_retryable_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let url = Url::parse(&format!("http://{addr}/behavior")).unwrap();
        drop(listener);

        let err = reqwest::Client::builder()
            .no_proxy()
            .build()
            .unwrap()
            .get(url.clone())
            .send()
            .await
            .unwrap_err();

        let classified = CollectorError::from_transport(&err, &url);
        assert!(
            matches!(classified, CollectorError::Network(ref msg) if msg.contains("/behavior"))
        );
        assert!(classified.should_retry());
    }

    #[test]
    fn folds_into_domain_errors() {
        let err: WayfareError = CollectorError::Malformed("not json".into()).into();
        assert!(matches!(err, WayfareError::Serialization(msg) if msg.contains("not json")));

        let err: WayfareError = CollectorError::Server("boom".into()).into();
        assert_eq!(err.label(), "network");
    }
}
