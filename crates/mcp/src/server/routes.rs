//! HTTP routes of the relay shell.

use std::any::Any;

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW, CONNECTION};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header::CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodRouter, get, post};
use axum::{Json, Router, middleware};
use futures_util::StreamExt;
use relay_types::{DispatchRequest, RoutingError};
use serde_json::{Map, Value, json};
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::error;

use crate::server::auth::{TOKEN_HEADER, check_token, require_token};
use crate::server::http::mcp_service;
use crate::server::sse;
use crate::server::state::AppState;

/// Largest accepted command request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

pub const PING_MESSAGE: &str = "relay handshake success";
pub const HEALTH_MESSAGE: &str = "MCP connector ready";
pub const BANNER: &str = "relay MCP proxy is running";

/// Assemble the full application router.
///
/// Cancelling `cancellation` ends open SSE and MCP streams.
pub fn build_app(state: AppState, cancellation: CancellationToken) -> Router {
    let state = state.with_shutdown(cancellation.clone());
    let command_routes = Router::new()
        .route("/api/command", command_route())
        .route("/api/anis", command_route())
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST,OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type,x-mcp-token"),
        ));

    let mcp_routes = Router::new()
        .nest_service("/mcp", mcp_service(&state, cancellation))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/", get(banner))
        .route("/api/ping", get(ping))
        .route("/health", get(health))
        .route("/sse", get(sse::heartbeat_stream))
        .merge(mcp_routes)
        .layer(cors_layer())
        .merge(command_routes)
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

fn command_route() -> MethodRouter<AppState> {
    post(dispatch_command).options(preflight).fallback(method_not_allowed)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(TOKEN_HEADER)])
}

/// Render a routing error as its status code and failure envelope.
pub fn error_response(error: &RoutingError, command: Option<&str>, actor: Option<&str>) -> Response {
    let status = StatusCode::from_u16(error.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(error.to_envelope(command, actor))).into_response()
}

/// A panicking handler answers with the generic internal error envelope.
fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    error!("request handler panicked");
    error_response(&RoutingError::internal(), None, None)
}

async fn dispatch_command(State(state): State<AppState>, headers: HeaderMap, body: Body) -> Response {
    let request = match read_json_body(body).await {
        Ok(value) => into_dispatch_request(value),
        Err(error) => return error_response(&error, None, None),
    };
    let command = request.command_text().map(str::to_string);
    let actor = request.actor_text().map(str::to_string);

    if let Err(error) = check_token(&state, &headers) {
        return error_response(&error, command.as_deref(), actor.as_deref());
    }

    match state.router().dispatch(request).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(error) => error_response(&error, command.as_deref(), actor.as_deref()),
    }
}

async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(ALLOW, "POST,OPTIONS")],
        Json(json!({
            "ok": false,
            "command": null,
            "dest": null,
            "data": { "error": "Method not allowed" }
        })),
    )
        .into_response()
}

async fn ping() -> Json<Value> {
    Json(json!({ "ok": true, "message": PING_MESSAGE }))
}

async fn health() -> Response {
    ([(CONNECTION, "close")], Json(json!({ "ok": true, "message": HEALTH_MESSAGE }))).into_response()
}

async fn banner() -> &'static str {
    BANNER
}

/// Read the body as JSON, enforcing [`MAX_BODY_BYTES`]. A blank body reads as `{}`.
async fn read_json_body(body: Body) -> Result<Value, RoutingError> {
    let mut stream = body.into_data_stream();
    let mut buffer = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| {
            error!(error = %err, "failed to read request body");
            RoutingError::validation("Body must be valid JSON")
        })?;
        if buffer.len() + chunk.len() > MAX_BODY_BYTES {
            return Err(RoutingError::payload_too_large());
        }
        buffer.extend_from_slice(&chunk);
    }

    let raw = String::from_utf8_lossy(&buffer);
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(raw).map_err(|_| RoutingError::validation("Body must be valid JSON"))
}

/// Non-object bodies carry no fields, so they fail command validation downstream.
fn into_dispatch_request(value: Value) -> DispatchRequest {
    match value {
        Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
        _ => DispatchRequest::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower::ServiceExt;

    async fn explode() -> Response {
        panic!("handler failure")
    }

    #[tokio::test]
    async fn panicking_handler_renders_internal_error() {
        let app: Router = Router::new()
            .route("/explode", get(explode))
            .layer(CatchPanicLayer::custom(panic_response));

        let response = app
            .oneshot(axum::http::Request::get("/explode").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let envelope: Value = serde_json::from_slice(&bytes).expect("json envelope");
        assert_eq!(envelope["ok"], false);
        assert_eq!(envelope["data"]["error"], "Internal server error");
        assert_eq!(envelope["data"]["details"]["message"], "Unexpected error");
    }

    #[tokio::test]
    async fn blank_body_reads_as_empty_object() {
        let value = read_json_body(Body::from("  \n ")).await.expect("blank body");
        assert_eq!(value, json!({}));
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let error = read_json_body(Body::from(vec![b' '; MAX_BODY_BYTES + 1]))
            .await
            .expect_err("too large");
        assert_eq!(error.status(), 413);
        assert_eq!(error.message(), "Request body too large");
    }

    #[tokio::test]
    async fn malformed_body_is_a_validation_error() {
        let error = read_json_body(Body::from("{nope")).await.expect_err("invalid json");
        assert_eq!(error.status(), 400);
        assert_eq!(error.message(), "Body must be valid JSON");
    }

    #[test]
    fn non_object_bodies_have_no_command() {
        assert_eq!(into_dispatch_request(json!([1, 2])), DispatchRequest::default());
        let request = into_dispatch_request(json!({ "command": "help", "actor": "ops" }));
        assert_eq!(request.command_text(), Some("help"));
        assert_eq!(request.actor_text(), Some("ops"));
    }
}
