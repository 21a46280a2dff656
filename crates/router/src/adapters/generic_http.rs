//! Generic HTTP adapter: the caller supplies URL, method, headers and body.

use relay_types::{CommandInvocation, DispatchResult, RoutingError};
use reqwest::Method;
use serde_json::{Map, Value};
use url::Url;

use crate::normalizer::BackendReply;
use crate::transport::{HttpTransport, OutboundRequest};

const FAILURE_LABEL: &str = "HTTP request failed with";

/// Build the outbound request described by `invocation.args`.
///
/// Fails with a 400 when `args.url` is not an `http(s)://` URL or
/// `args.method` is not a valid method token.
pub fn build_request(invocation: &CommandInvocation) -> Result<OutboundRequest, RoutingError> {
    let args = &invocation.args;
    let url = validated_url(args.get("url"))?;
    let method = method_of(args.get("method"))?;

    let mut request = OutboundRequest::new(method, url);
    if let Some(Value::Object(headers)) = args.get("headers") {
        for (name, value) in headers {
            match value {
                Value::String(text) => request = request.with_header(name.clone(), text.clone()),
                Value::Number(_) | Value::Bool(_) => request = request.with_header(name.clone(), value.to_string()),
                Value::Null | Value::Array(_) | Value::Object(_) => {}
            }
        }
    }

    match args.get("body") {
        None | Some(Value::Null) => {}
        Some(Value::Object(body)) => {
            if request.header("content-type").is_none() {
                request = request.with_header("Content-Type", "application/json");
            }
            request = request.with_body(Value::Object(body.clone()).to_string());
        }
        Some(Value::String(text)) => request = request.with_body(text.clone()),
        // Arrays and scalars go out as their JSON text with no content type.
        Some(other) => request = request.with_body(other.to_string()),
    }
    Ok(request)
}

fn validated_url(value: Option<&Value>) -> Result<String, RoutingError> {
    let candidate = value.and_then(Value::as_str);
    let accepted = candidate
        .filter(|text| {
            let lowered = text.to_ascii_lowercase();
            lowered.starts_with("http://") || lowered.starts_with("https://")
        })
        .filter(|text| Url::parse(text).is_ok());
    match accepted {
        Some(url) => Ok(url.to_string()),
        None => {
            let mut data = Map::new();
            data.insert("providedUrl".into(), value.cloned().unwrap_or(Value::Null));
            Err(RoutingError::validation_with("args.url must be a valid HTTP URL", data))
        }
    }
}

fn method_of(value: Option<&Value>) -> Result<Method, RoutingError> {
    let name = match value {
        None | Some(Value::Null) => return Ok(Method::POST),
        Some(Value::String(text)) if !text.trim().is_empty() => text.trim().to_ascii_uppercase(),
        Some(_) => return Err(invalid_method(value)),
    };
    Method::from_bytes(name.as_bytes()).map_err(|_| invalid_method(value))
}

fn invalid_method(value: Option<&Value>) -> RoutingError {
    let mut data = Map::new();
    data.insert("providedMethod".into(), value.cloned().unwrap_or(Value::Null));
    RoutingError::validation_with("args.method must be an HTTP method name", data)
}

/// Send the caller-described request. `data` additionally carries the method.
pub async fn invoke(
    transport: &dyn HttpTransport,
    request: OutboundRequest,
    invocation: &CommandInvocation,
) -> Result<DispatchResult, RoutingError> {
    let url = request.url.clone();
    let mut extras = Map::new();
    extras.insert("method".into(), Value::String(request.method.to_string()));
    let raw = transport.send(request).await?;
    BackendReply::from_raw(raw).into_outcome(&invocation.command, &url, &extras, FAILURE_LABEL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_types::ErrorKind;
    use serde_json::json;

    fn invocation(args: Value) -> CommandInvocation {
        CommandInvocation {
            command: "http".into(),
            base: "http".into(),
            args: args.as_object().cloned().unwrap_or_default(),
            actor: "ops".into(),
        }
    }

    #[test]
    fn rejects_non_http_urls_and_echoes_them() {
        let error = build_request(&invocation(json!({ "url": "ftp://x" }))).expect_err("ftp");
        assert_eq!(error.status(), 400);
        assert_eq!(error.kind(), ErrorKind::Validation);
        assert_eq!(error.data()["providedUrl"], "ftp://x");

        let missing = build_request(&invocation(json!({}))).expect_err("missing");
        assert_eq!(missing.data()["providedUrl"], Value::Null);

        let numeric = build_request(&invocation(json!({ "url": 5 }))).expect_err("numeric");
        assert_eq!(numeric.data()["providedUrl"], 5);
    }

    #[test]
    fn scheme_check_is_case_insensitive() {
        let request = build_request(&invocation(json!({ "url": "HTTPS://example.com/x" }))).expect("valid");
        assert_eq!(request.url, "HTTPS://example.com/x");
    }

    #[test]
    fn defaults_to_post_and_upper_cases_method() {
        let request = build_request(&invocation(json!({ "url": "https://example.com" }))).expect("valid");
        assert_eq!(request.method, Method::POST);
        assert!(request.body.is_none());

        let request = build_request(&invocation(json!({ "url": "https://example.com", "method": "patch" }))).expect("valid");
        assert_eq!(request.method, Method::PATCH);
    }

    #[test]
    fn rejects_non_string_method() {
        let error = build_request(&invocation(json!({ "url": "https://example.com", "method": 3 }))).expect_err("method");
        assert_eq!(error.status(), 400);
        assert_eq!(error.data()["providedMethod"], 3);
    }

    #[test]
    fn object_body_is_json_with_injected_content_type() {
        let request = build_request(&invocation(json!({
            "url": "https://example.com",
            "headers": { "X-Trace": "abc", "X-Retry": 2, "X-Nested": { "a": 1 } },
            "body": { "ping": true }
        })))
        .expect("valid");
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("x-trace"), Some("abc"));
        assert_eq!(request.header("x-retry"), Some("2"));
        assert_eq!(request.header("x-nested"), None);
        assert_eq!(request.body.as_deref(), Some(r#"{"ping":true}"#));
    }

    #[test]
    fn caller_content_type_is_preserved() {
        let request = build_request(&invocation(json!({
            "url": "https://example.com",
            "headers": { "content-type": "application/vnd.api+json" },
            "body": { "ping": true }
        })))
        .expect("valid");
        let content_types: Vec<_> = request
            .headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .collect();
        assert_eq!(content_types.len(), 1);
        assert_eq!(request.header("content-type"), Some("application/vnd.api+json"));
    }

    #[test]
    fn scalar_bodies_are_coerced_to_text() {
        let text = build_request(&invocation(json!({ "url": "https://example.com", "body": "raw" }))).expect("valid");
        assert_eq!(text.body.as_deref(), Some("raw"));
        assert_eq!(text.header("content-type"), None);

        let number = build_request(&invocation(json!({ "url": "https://example.com", "body": 12 }))).expect("valid");
        assert_eq!(number.body.as_deref(), Some("12"));

        let flag = build_request(&invocation(json!({ "url": "https://example.com", "body": false }))).expect("valid");
        assert_eq!(flag.body.as_deref(), Some("false"));
    }

    #[test]
    fn array_body_is_sent_as_json_text_without_content_type() {
        let request = build_request(&invocation(json!({ "url": "https://example.com", "body": [1, 2] }))).expect("valid");
        assert_eq!(request.body.as_deref(), Some("[1,2]"));
        assert_eq!(request.header("content-type"), None);
    }
}
