use std::sync::Arc;

use relay_router::DispatchRouter;
use relay_types::{DispatchRequest, RoutingError};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ErrorData, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo};
use rmcp::{ServerHandler, tool, tool_handler, tool_router};
use serde_json::Value;
use tracing::{debug, info};

use crate::server::log_payload::{build_log_payload, parsed_text_content};
use crate::server::schemas::{DispatchCommandParam, IntegrationStatusParam};

/// MCP tool server exposing the dispatch router.
///
/// One instance is created per MCP session; all instances share the router.
#[derive(Clone)]
pub struct RelayMcpCore {
    tool_router: ToolRouter<Self>,
    router: Arc<DispatchRouter>,
}

#[tool_router]
impl RelayMcpCore {
    pub fn new(router: Arc<DispatchRouter>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            router,
        }
    }

    #[tool(
        annotations(open_world_hint = true),
        description = "Route a command to its integration. 'status' and 'help' answer locally; 'run', 'report', 'summary', 'email' and 'sheet' go to the n8n webhook; 'zap:*' to the Zapier webhook; 'git:*' triggers a GitHub repository_dispatch; 'http' sends args.url/method/headers/body as a custom request. Failures return the error envelope with its HTTP-style status."
    )]
    async fn dispatch_command(&self, param: Parameters<DispatchCommandParam>) -> Result<CallToolResult, ErrorData> {
        let request_log = serde_json::to_value(&param.0).unwrap_or(Value::Null);
        let response = self.dispatch(param.0.into()).await?;
        self.emit_log("dispatch_command", Some(request_log), &response);
        Ok(response)
    }

    #[tool(
        annotations(read_only_hint = true),
        description = "Report which integrations are configured (n8n, zapier, github, mcpToken) without contacting any of them."
    )]
    async fn integration_status(&self, param: Parameters<IntegrationStatusParam>) -> Result<CallToolResult, ErrorData> {
        let mut request = DispatchRequest::new("status");
        if let Some(actor) = param.0.actor.clone() {
            request = request.with_actor(actor);
        }
        let response = self.dispatch(request).await?;
        self.emit_log(
            "integration_status",
            Some(serde_json::to_value(&param.0).unwrap_or(Value::Null)),
            &response,
        );
        Ok(response)
    }

    #[tool(
        annotations(read_only_hint = true),
        description = "List supported commands with a usage example for each integration family."
    )]
    async fn list_commands(&self) -> Result<CallToolResult, ErrorData> {
        let response = self.dispatch(DispatchRequest::new("help")).await?;
        self.emit_log("list_commands", None, &response);
        Ok(response)
    }

    async fn dispatch(&self, request: DispatchRequest) -> Result<CallToolResult, ErrorData> {
        let command = request.command_text().map(str::to_string);
        let actor = request.actor_text().map(str::to_string);
        match self.router.dispatch(request).await {
            Ok(result) => {
                let structured = serde_json::to_value(&result)
                    .map_err(|error| ErrorData::internal_error(format!("failed to serialize dispatch result: {error}"), None))?;
                Ok(CallToolResult::structured(structured))
            }
            Err(error) => routing_failure(&error, command.as_deref(), actor.as_deref()),
        }
    }

    fn emit_log(&self, tool_name: &str, request: Option<Value>, response: &CallToolResult) {
        let response = serde_json::to_value(response).ok();
        let payload = build_log_payload(request.as_ref(), response.as_ref()).unwrap_or(Value::Null);
        info!(tool = tool_name, payload = %payload, "MCP tool call");
        if let Some(parsed) = response.as_ref().and_then(parsed_text_content) {
            debug!(tool = tool_name, parsed = %parsed, "MCP tool call response text");
        }
    }
}

/// Tool-level error result carrying the failure envelope plus its status.
fn routing_failure(error: &RoutingError, command: Option<&str>, actor: Option<&str>) -> Result<CallToolResult, ErrorData> {
    let mut envelope = serde_json::to_value(error.to_envelope(command, actor))
        .map_err(|err| ErrorData::internal_error(format!("failed to serialize error envelope: {err}"), None))?;
    if let Value::Object(map) = &mut envelope {
        map.insert("status".into(), Value::from(error.status()));
    }
    let content = Content::json(envelope).map_err(|_| ErrorData::internal_error("failed to encode error envelope", None))?;
    Ok(CallToolResult::error(vec![content]))
}

#[tool_handler]
impl ServerHandler for RelayMcpCore {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            protocol_version: ProtocolVersion::LATEST,
            server_info: Implementation {
                name: "relay".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Relay MCP proxy".to_string()),
                ..Default::default()
            },
            instructions: Some(
                "Forwards automation commands to n8n, Zapier, GitHub or arbitrary HTTP endpoints.\n1) Call list_commands to see what is supported.\n2) Call integration_status to check which integrations are configured.\n3) Call dispatch_command with {command, args?, actor?}."
                    .to_string(),
            ),
        }
    }
}
