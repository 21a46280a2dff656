//! Outbound HTTP capability used by the network adapters.
//!
//! Adapters describe a request as an [`OutboundRequest`] and hand it to an
//! [`HttpTransport`]. The production implementation wraps a
//! `reqwest::Client`; the trait seam lets the router run without any network
//! capability, in which case dispatch fails with a transport-unavailable error.

use std::time::Duration;

use async_trait::async_trait;
use relay_types::RoutingError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde_json::{Map, Value};
use tracing::debug;

use crate::redact::{is_sensitive_key, redact_sensitive};

/// A fully described outbound HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    /// Header pairs in insertion order.
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl OutboundRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// A POST carrying `payload` as JSON.
    pub fn post_json(url: impl Into<String>, payload: &Value) -> Self {
        Self::new(Method::POST, url)
            .with_header("Content-Type", "application/json")
            .with_body(payload.to_string())
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Header map suitable for logging, with credentials masked.
    pub fn redacted_headers(&self) -> Map<String, Value> {
        self.headers
            .iter()
            .map(|(name, value)| {
                let shown = if is_sensitive_key(name) {
                    "<redacted>".to_string()
                } else {
                    redact_sensitive(value)
                };
                (name.clone(), Value::String(shown))
            })
            .collect()
    }
}

/// Status and body text of a backend response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub text: String,
}

impl RawResponse {
    pub fn new(status: u16, text: impl Into<String>) -> Self {
        Self {
            status,
            text: text.into(),
        }
    }
}

/// Sends one request and returns the raw response. Implementations must not retry.
#[async_trait]
pub trait HttpTransport: Send + Sync + std::fmt::Debug {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, RoutingError>;
}

/// [`HttpTransport`] backed by `reqwest`.
///
/// Only a connect timeout is configured; the overall request latency is left
/// to the caller at the transport boundary.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, RoutingError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|error| RoutingError::transport_unavailable(format!("HTTP client unavailable: {error}")))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, RoutingError> {
        let headers = build_header_map(&request.headers)?;
        debug!(
            method = %request.method,
            url = %request.url,
            headers = ?request.redacted_headers(),
            "sending backend request"
        );

        let mut builder = self.client.request(request.method.clone(), request.url.as_str()).headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|error| {
            RoutingError::transport_unavailable(format!("request to {} failed: {error}", request.url)).with_dest(request.url.clone())
        })?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|error| {
            RoutingError::transport_unavailable(format!("failed to read response from {}: {error}", request.url))
                .with_dest(request.url.clone())
        })?;
        debug!(url = %request.url, status, bytes = text.len(), "backend responded");
        Ok(RawResponse { status, text })
    }
}

fn build_header_map(headers: &[(String, String)]) -> Result<HeaderMap, RoutingError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid_header(name))?;
        let header_value = HeaderValue::from_str(value).map_err(|_| invalid_header(name))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

fn invalid_header(name: &str) -> RoutingError {
    let mut data = Map::new();
    data.insert("header".into(), Value::String(name.to_string()));
    RoutingError::validation_with("request headers must be valid HTTP header names and values", data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_types::ErrorKind;
    use serde_json::json;

    #[test]
    fn post_json_sets_content_type_and_body() {
        let request = OutboundRequest::post_json("https://hooks.example/run", &json!({ "command": "run" }));
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.body.as_deref(), Some(r#"{"command":"run"}"#));
    }

    #[test]
    fn redacted_headers_hide_credentials() {
        let request = OutboundRequest::new(Method::POST, "https://api.example")
            .with_header("Authorization", "Bearer secret-token")
            .with_header("User-Agent", "relay");
        let headers = request.redacted_headers();
        assert_eq!(headers["Authorization"], "<redacted>");
        assert_eq!(headers["User-Agent"], "relay");
    }

    #[test]
    fn invalid_header_names_are_rejected() {
        let error = build_header_map(&[("bad header".into(), "x".into())]).expect_err("invalid");
        assert_eq!(error.kind(), ErrorKind::Validation);
        assert_eq!(error.data()["header"], "bad header");
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_unavailable() {
        let transport = ReqwestTransport::new().expect("client");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let address = listener.local_addr().expect("address");
        drop(listener);

        let url = format!("http://{address}/hook");
        let error = transport
            .send(OutboundRequest::post_json(url.clone(), &json!({})))
            .await
            .expect_err("connection refused");
        assert_eq!(error.kind(), ErrorKind::TransportUnavailable);
        assert_eq!(error.status(), 500);
        assert_eq!(error.dest(), Some(url.as_str()));
    }
}
