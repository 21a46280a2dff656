use relay_types::DispatchRequest;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameters for `dispatch_command`.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DispatchCommandParam {
    /// Command text; the token before the first ':' or whitespace selects the integration.
    #[schemars(description = "Command to route, for example 'status', 'run', 'zap:send_report', 'git:sync' or 'http'.")]
    pub command: String,
    /// Free-form arguments forwarded to the backend.
    #[schemars(description = "Optional arguments object forwarded to the backend. For 'http': url, method, headers, body.")]
    pub args: Option<Map<String, Value>>,
    #[schemars(description = "Optional name of the caller recorded with the command. Defaults to 'operator'.")]
    pub actor: Option<String>,
}

impl From<DispatchCommandParam> for DispatchRequest {
    fn from(param: DispatchCommandParam) -> Self {
        DispatchRequest {
            command: Some(Value::String(param.command)),
            args: param.args.map(Value::Object),
            actor: param.actor.map(Value::String),
        }
    }
}

/// Parameters for `integration_status`.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct IntegrationStatusParam {
    #[schemars(description = "Optional name of the caller echoed in the report.")]
    pub actor: Option<String>,
}
