//! Shared-token authentication for the command route and `/mcp`.
//!
//! A token is required only when `MCP_TOKEN` is configured. Without one, any
//! `x-mcp-token` header a caller sends is ignored.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use relay_types::RoutingError;
use tracing::warn;

use crate::server::routes::error_response;
use crate::server::state::AppState;

/// Header carrying the caller's shared token.
pub const TOKEN_HEADER: &str = "x-mcp-token";

/// Check the request headers against the configured token.
pub fn check_token(state: &AppState, headers: &HeaderMap) -> Result<(), RoutingError> {
    let Some(expected) = state.expected_token() else {
        return Ok(());
    };
    let provided = headers.get(TOKEN_HEADER).and_then(|value| value.to_str().ok());
    if provided == Some(expected.as_str()) {
        Ok(())
    } else {
        warn!(present = provided.is_some(), "rejected request with invalid token");
        Err(RoutingError::unauthorized())
    }
}

/// Middleware form of [`check_token`].
pub async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    match check_token(&state, request.headers()) {
        Ok(()) => next.run(request).await,
        Err(error) => error_response(&error, None, None).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use relay_router::{ConfigKey, DispatchRouter, ErrorKind, StaticConfig};
    use std::sync::Arc;

    fn state(token: Option<&str>) -> AppState {
        let config = match token {
            Some(token) => StaticConfig::new().with(ConfigKey::ProtocolAuthToken, token),
            None => StaticConfig::new(),
        };
        AppState::new(DispatchRouter::without_transport(Arc::new(config)))
    }

    fn headers(token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            headers.insert(TOKEN_HEADER, HeaderValue::from_str(token).expect("header value"));
        }
        headers
    }

    #[test]
    fn open_when_no_token_is_configured() {
        assert!(check_token(&state(None), &headers(None)).is_ok());
        assert!(check_token(&state(None), &headers(Some("anything"))).is_ok());
    }

    #[test]
    fn configured_token_must_match() {
        let state = state(Some("s3cret"));
        assert!(check_token(&state, &headers(Some("s3cret"))).is_ok());

        let missing = check_token(&state, &headers(None)).expect_err("missing token");
        assert_eq!(missing.kind(), ErrorKind::Unauthorized);
        assert_eq!(missing.status(), 401);

        let wrong = check_token(&state, &headers(Some("nope"))).expect_err("wrong token");
        assert_eq!(wrong.message(), "Unauthorized");
    }
}
