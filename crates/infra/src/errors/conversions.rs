//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use url::ParseError as UrlError;
use wayfare_domain::WayfareError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub WayfareError);

impl From<InfraError> for WayfareError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<WayfareError> for InfraError {
    fn from(value: WayfareError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoWayfareError {
    fn into_wayfare(self) -> WayfareError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → WayfareError */
/* -------------------------------------------------------------------------- */

impl IntoWayfareError for HttpError {
    fn into_wayfare(self) -> WayfareError {
        if self.is_timeout() {
            return WayfareError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return WayfareError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return WayfareError::Serialization(format!("HTTP body could not be decoded: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => WayfareError::Unavailable(message),
                404 => WayfareError::NotFound(message),
                400..=499 if code != 429 => WayfareError::InvalidInput(message),
                _ => WayfareError::Network(message),
            };
        }

        WayfareError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_wayfare())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json / toml / url → WayfareError */
/* -------------------------------------------------------------------------- */

impl IntoWayfareError for JsonError {
    fn into_wayfare(self) -> WayfareError {
        WayfareError::Serialization(format!("invalid JSON at line {}: {}", self.line(), self))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_wayfare())
    }
}

impl IntoWayfareError for toml::de::Error {
    fn into_wayfare(self) -> WayfareError {
        WayfareError::Config(format!("Invalid TOML format: {}", self.message()))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(value.into_wayfare())
    }
}

impl IntoWayfareError for UrlError {
    fn into_wayfare(self) -> WayfareError {
        WayfareError::Config(format!("invalid collector URL: {self}"))
    }
}

impl From<UrlError> for InfraError {
    fn from(value: UrlError) -> Self {
        InfraError(value.into_wayfare())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use reqwest::{Client, StatusCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn json_error_maps_to_serialization() {
        let err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let mapped: WayfareError = InfraError::from(err).into();
        assert!(matches!(mapped, WayfareError::Serialization(msg) if msg.contains("line 1")));
    }

    #[test]
    fn url_error_maps_to_config() {
        let err = url::Url::parse("not a url").unwrap_err();
        let mapped: WayfareError = InfraError::from(err).into();
        assert!(matches!(mapped, WayfareError::Config(_)));
    }

    #[test]
    fn toml_error_maps_to_config() {
        let err = toml::from_str::<toml::Table>("[sync\ninterval = ").unwrap_err();
        let mapped: WayfareError = InfraError::from(err).into();
        assert!(matches!(mapped, WayfareError::Config(msg) if msg.contains("TOML")));
    }

    #[tokio::test]
    async fn http_status_404_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::NOT_FOUND))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        let mapped: WayfareError = InfraError::from(error).into();
        match mapped {
            WayfareError::NotFound(msg) => assert!(msg.contains("404")),
            other => panic!("expected not found, got {other:?}"),
        }
    }
}
