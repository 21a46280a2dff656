//! Workflow-webhook and webhook-relay adapter: POST the command and relay the answer.

use relay_types::{CommandInvocation, DispatchResult, RoutingError};
use serde_json::Map;

use crate::normalizer::BackendReply;
use crate::transport::{HttpTransport, OutboundRequest};

pub(crate) const FAILURE_LABEL: &str = "Webhook responded with";

/// The POST sent to a webhook: `{command, args, actor}` as JSON.
pub fn build_request(url: &str, invocation: &CommandInvocation) -> OutboundRequest {
    OutboundRequest::post_json(url, &invocation.forward_payload())
}

/// Forward `invocation` to `url` with a single attempt.
pub async fn invoke(
    transport: &dyn HttpTransport,
    url: &str,
    invocation: &CommandInvocation,
) -> Result<DispatchResult, RoutingError> {
    let raw = transport.send(build_request(url, invocation)).await?;
    BackendReply::from_raw(raw).into_outcome(&invocation.command, url, &Map::new(), FAILURE_LABEL)
}
