//! Source-control dispatch adapter (`repository_dispatch` events).

use relay_types::{CommandInvocation, DispatchResult, RoutingError};
use serde_json::{Map, Value, json};

use crate::normalizer::BackendReply;
use crate::transport::{HttpTransport, OutboundRequest};

pub const USER_AGENT: &str = "relay-mcp-proxy";
const ACCEPT: &str = "application/vnd.github+json";
const FAILURE_LABEL: &str = "GitHub API responded with";

/// Credentials and location of the dispatch endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTarget {
    pub api_base: String,
    pub repository: String,
    pub token: String,
}

impl DispatchTarget {
    pub fn dispatch_url(&self) -> String {
        format!("{}/repos/{}/dispatches", self.api_base, self.repository)
    }
}

/// Event type tag: characters outside `[A-Za-z0-9_.-]` become `_`, then lower-cased.
pub fn event_type(command: &str) -> String {
    command
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

pub fn build_request(target: &DispatchTarget, invocation: &CommandInvocation) -> OutboundRequest {
    let payload = json!({
        "event_type": event_type(&invocation.command),
        "client_payload": invocation.forward_payload(),
    });
    OutboundRequest::post_json(target.dispatch_url(), &payload)
        .with_header("Accept", ACCEPT)
        .with_header("Authorization", format!("Bearer {}", target.token))
        .with_header("User-Agent", USER_AGENT)
}

/// Trigger a dispatch event. `data` carries the repository on success and failure.
pub async fn invoke(
    transport: &dyn HttpTransport,
    target: &DispatchTarget,
    invocation: &CommandInvocation,
) -> Result<DispatchResult, RoutingError> {
    let url = target.dispatch_url();
    let raw = transport.send(build_request(target, invocation)).await?;
    let mut extras = Map::new();
    extras.insert("repository".into(), Value::String(target.repository.clone()));
    BackendReply::from_raw(raw).into_outcome(&invocation.command, &url, &extras, FAILURE_LABEL)
}
