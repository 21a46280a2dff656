//! The dispatch router: validate, classify, route, invoke.

use std::sync::Arc;

use relay_types::{CommandInvocation, DEFAULT_ACTOR, DispatchRequest, DispatchResult, RoutingError};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::adapters::{DispatchTarget, generic_http, local, source_control, webhook};
use crate::classifier::base_of;
use crate::config::{self, ConfigProvider, EnvConfig};
use crate::routes::{self, Route, RouteHandler};
use crate::transport::{HttpTransport, ReqwestTransport};

/// Routes commands to their backend integration.
///
/// Holds only shared immutable state, so one router serves any number of
/// concurrent dispatch calls. Each call performs at most one backend request
/// and never retries.
#[derive(Debug, Clone)]
pub struct DispatchRouter {
    config: Arc<dyn ConfigProvider>,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl DispatchRouter {
    pub fn new(config: Arc<dyn ConfigProvider>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config,
            transport: Some(transport),
        }
    }

    /// A router with no outbound HTTP capability; network-bound commands fail
    /// with a transport-unavailable error.
    pub fn without_transport(config: Arc<dyn ConfigProvider>) -> Self {
        Self { config, transport: None }
    }

    /// Router backed by the process environment and a `reqwest` client.
    pub fn from_env() -> Result<Self, RoutingError> {
        Ok(Self::new(Arc::new(EnvConfig), Arc::new(ReqwestTransport::new()?)))
    }

    pub fn config(&self) -> &dyn ConfigProvider {
        self.config.as_ref()
    }

    /// Dispatch one command.
    ///
    /// Errors from adapters are returned unchanged.
    pub async fn dispatch(&self, request: DispatchRequest) -> Result<DispatchResult, RoutingError> {
        let invocation = validate(request)?;
        let route = routes::resolve(&invocation.base)
            .ok_or_else(|| RoutingError::unsupported_command(&invocation.command, routes::supported_commands()))?;
        debug!(command = %invocation.command, target = %route.target, actor = %invocation.actor, "routing command");

        let outcome = self.invoke(route, &invocation).await;
        match &outcome {
            Ok(result) => info!(command = %result.command, dest = %result.dest, "command dispatched"),
            Err(error) => warn!(
                command = %invocation.command,
                status = error.status(),
                dest = error.dest().unwrap_or("-"),
                error = %error,
                "command dispatch failed"
            ),
        }
        outcome
    }

    async fn invoke(&self, route: &Route, invocation: &CommandInvocation) -> Result<DispatchResult, RoutingError> {
        match route.handler {
            RouteHandler::Status => Ok(local::status(invocation, self.config())),
            RouteHandler::Help => Ok(local::help(invocation)),
            RouteHandler::Webhook => {
                let url = self.required_credential(route)?;
                webhook::invoke(self.transport()?, &url, invocation).await
            }
            RouteHandler::SourceControlDispatch => {
                let target = DispatchTarget {
                    token: self.required_credential(route)?,
                    api_base: config::source_control_api_base(self.config()),
                    repository: config::source_control_repository(self.config()),
                };
                source_control::invoke(self.transport()?, &target, invocation).await
            }
            RouteHandler::GenericHttp => {
                let request = generic_http::build_request(invocation)?;
                generic_http::invoke(self.transport()?, request, invocation).await
            }
        }
    }

    /// The value of the route's required configuration key.
    fn required_credential(&self, route: &Route) -> Result<String, RoutingError> {
        let key = route.required.ok_or_else(RoutingError::internal)?;
        config::require(self.config(), key)
    }

    fn transport(&self) -> Result<&dyn HttpTransport, RoutingError> {
        self.transport
            .as_deref()
            .ok_or_else(|| RoutingError::transport_unavailable("HTTP transport is not available in this runtime"))
    }
}

/// Validate a raw request into a routable invocation.
///
/// Checks run in order and the first failure wins: command, args, actor.
pub fn validate(request: DispatchRequest) -> Result<CommandInvocation, RoutingError> {
    let command = match request.command {
        Some(Value::String(text)) => text.trim().to_string(),
        _ => return Err(RoutingError::validation("command must be a non-empty string")),
    };
    if command.is_empty() {
        return Err(RoutingError::validation("command must contain non-whitespace text"));
    }

    let args = match request.args {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map,
        Some(other) => {
            let mut data = Map::new();
            data.insert("receivedType".into(), Value::String(json_type_name(&other).into()));
            return Err(RoutingError::validation_with("args must be an object if provided", data));
        }
    };

    let actor = match request.actor {
        None | Some(Value::Null) => DEFAULT_ACTOR.to_string(),
        Some(Value::String(text)) if !text.trim().is_empty() => text,
        Some(_) => return Err(RoutingError::validation("actor must be a non-empty string")),
    };

    Ok(CommandInvocation {
        base: base_of(&command),
        command,
        args,
        actor,
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
