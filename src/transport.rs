// HTTP transport seam.
//
// `ApiClient` talks to the network only through `HttpTransport`. The default
// implementation wraps a blocking `reqwest` client; tests plug in a recorder.
// Transports report raw status + body, and `decode_response` turns that into
// JSON or a typed error.

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::params::QueryParams;
use reqwest::blocking::{multipart, Client};
use serde_json::Value;
use tracing::{debug, warn};

/// A completed HTTP exchange: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// A file to send as one multipart form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Minimal blocking HTTP interface used by the client.
///
/// Implementations return `Err(ApiError::Transport)` only when no response
/// was obtained; any received status, including >= 400, is returned as a
/// `RawResponse`.
pub trait HttpTransport {
    fn get(&self, url: &str) -> Result<RawResponse>;

    /// POST `form` as an `application/x-www-form-urlencoded` body.
    fn post_form(&self, url: &str, form: &QueryParams) -> Result<RawResponse>;

    fn post_multipart(&self, url: &str, part: FilePart) -> Result<RawResponse>;
}

/// Validate a completed exchange: status first, then JSON decoding.
pub fn decode_response(response: &RawResponse) -> Result<Value> {
    if response.status >= 400 {
        return Err(ApiError::Http {
            status: response.status,
        });
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::Decode {
        message: e.to_string(),
    })
}

/// `HttpTransport` backed by `reqwest::blocking`.
///
/// Redirects are followed and TLS certificates are validated (both reqwest
/// defaults).
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    fn finish(response: reqwest::blocking::Response) -> Result<RawResponse> {
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| e.to_string());
        settle(status, body)
    }
}

/// Pair a received status with its body. A failed body read is a transport
/// error unless the status is already an HTTP error, which then wins.
fn settle(status: u16, body: std::result::Result<String, String>) -> Result<RawResponse> {
    match body {
        Ok(body) => {
            debug!("response status={} bytes={}", status, body.len());
            Ok(RawResponse { status, body })
        }
        Err(e) if status >= 400 => {
            warn!("failed to read body of status {} response: {}", status, e);
            Ok(RawResponse {
                status,
                body: String::new(),
            })
        }
        Err(e) => {
            warn!("failed to read response body: {}", e);
            Err(ApiError::Transport(e))
        }
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str) -> Result<RawResponse> {
        let response = self.client.get(url).send()?;
        Self::finish(response)
    }

    fn post_form(&self, url: &str, form: &QueryParams) -> Result<RawResponse> {
        let pairs: Vec<(&str, &str)> = form.iter().collect();
        let response = self.client.post(url).form(&pairs).send()?;
        Self::finish(response)
    }

    fn post_multipart(&self, url: &str, part: FilePart) -> Result<RawResponse> {
        let FilePart {
            field,
            file_name,
            mime_type,
            bytes,
        } = part;
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(&mime_type)
            .map_err(|e| ApiError::invalid_input(format!("invalid MIME type {mime_type:?}: {e}")))?;
        let form = multipart::Form::new().part(field, part);
        let response = self.client.post(url).multipart(form).send()?;
        Self::finish(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_with_json_body_decodes() {
        let value = decode_response(&RawResponse::new(200, r#"{"status":200,"result":{"email":"a@b.c"}}"#)).unwrap();
        assert_eq!(value["result"]["email"], "a@b.c");
    }

    #[test]
    fn malformed_body_on_success_is_decode_error() {
        let err = decode_response(&RawResponse::new(200, "not-json")).unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }), "got {err:?}");
    }

    #[test]
    fn error_status_wins_over_valid_json() {
        let err = decode_response(&RawResponse::new(404, r#"{"status":404,"msg":"Not Found"}"#)).unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 404 }), "got {err:?}");
    }

    #[test]
    fn error_status_wins_over_malformed_body() {
        let err = decode_response(&RawResponse::new(500, "<html>oops</html>")).unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn scalar_and_array_bodies_are_accepted() {
        assert_eq!(decode_response(&RawResponse::new(200, "[1,2]")).unwrap(), serde_json::json!([1, 2]));
        assert_eq!(decode_response(&RawResponse::new(201, "true")).unwrap(), Value::Bool(true));
    }

    #[test]
    fn status_399_is_not_an_http_error() {
        assert!(decode_response(&RawResponse::new(399, "{}")).is_ok());
    }

    #[test]
    fn unreadable_body_after_error_status_stays_http_error() {
        let raw = settle(503, Err("connection reset".into())).unwrap();
        assert_eq!(raw, RawResponse::new(503, ""));
        let err = decode_response(&raw).unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 503 }), "got {err:?}");
    }

    #[test]
    fn unreadable_body_after_success_is_transport_error() {
        match settle(200, Err("connection reset".into())).unwrap_err() {
            ApiError::Transport(message) => assert_eq!(message, "connection reset"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn zero_timeout_is_rejected_before_building_a_client() {
        let config = ClientConfig::new(crate::config::Credentials::new("L", "K"), None)
            .with_timeout(std::time::Duration::ZERO);
        assert!(matches!(
            ReqwestTransport::new(&config),
            Err(ApiError::Config { .. })
        ));
    }

    #[test]
    fn invalid_mime_type_is_an_input_error() {
        let config = ClientConfig::new(crate::config::Credentials::new("L", "K"), None);
        let transport = ReqwestTransport::new(&config).unwrap();
        let part = FilePart {
            field: "file1".into(),
            file_name: "a.mp4".into(),
            mime_type: "not a mime".into(),
            bytes: vec![1, 2, 3],
        };
        let err = transport
            .post_multipart("http://127.0.0.1:9/unused", part)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput { .. }), "got {err:?}");
    }

    #[test]
    fn builds_client_from_config() {
        let config = ClientConfig::new(crate::config::Credentials::new("L", "K"), None)
            .with_timeout(std::time::Duration::from_millis(500))
            .with_user_agent("streamtape-cli-test");
        assert!(ReqwestTransport::new(&config).is_ok());
    }
}
