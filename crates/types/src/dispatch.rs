//! Request and result value objects for a single dispatch call.
//!
//! Everything in this module is request-scoped: a [`DispatchRequest`] is
//! deserialized from the inbound body, validated into a [`CommandInvocation`],
//! and answered with a [`DispatchResult`]. Nothing here outlives one call.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Actor recorded when the caller does not identify itself.
pub const DEFAULT_ACTOR: &str = "operator";

/// Destination marker for commands answered without a network call.
pub const LOCAL_DEST: &str = "local";

/// Raw inbound command request.
///
/// Fields are kept as loose JSON values so that type mistakes (an array for
/// `args`, a number for `command`) surface as routing validation errors rather
/// than as deserialization failures. A JSON `null` is treated the same as an
/// absent field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchRequest {
    #[serde(default)]
    pub command: Option<Value>,
    #[serde(default)]
    pub args: Option<Value>,
    #[serde(default)]
    pub actor: Option<Value>,
}

impl DispatchRequest {
    /// Create a request for the given command with no args and the default actor.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: Some(Value::String(command.into())),
            args: None,
            actor: None,
        }
    }

    /// Attach an args payload.
    pub fn with_args(mut self, args: Value) -> Self {
        self.args = Some(args);
        self
    }

    /// Attach an actor.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(Value::String(actor.into()));
        self
    }

    /// The command as supplied, when it is a string.
    pub fn command_text(&self) -> Option<&str> {
        self.command.as_ref().and_then(Value::as_str)
    }

    /// The actor as supplied, when it is a string.
    pub fn actor_text(&self) -> Option<&str> {
        self.actor.as_ref().and_then(Value::as_str)
    }
}

/// A validated command ready to be routed.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandInvocation {
    /// Trimmed command text, forwarded verbatim to backends.
    pub command: String,
    /// Lower-cased routing key extracted from the command prefix.
    pub base: String,
    /// Opaque caller arguments; empty when none were supplied.
    pub args: Map<String, Value>,
    /// Audit identity of the caller.
    pub actor: String,
}

impl CommandInvocation {
    /// The `{command, args, actor}` payload forwarded to backends.
    pub fn forward_payload(&self) -> Value {
        serde_json::json!({
            "command": self.command,
            "args": self.args,
            "actor": self.actor,
        })
    }
}

/// Backend family that owns a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntegrationTarget {
    WorkflowWebhook,
    WebhookRelay,
    SourceControlDispatch,
    GenericHttp,
    Local,
}

impl IntegrationTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WorkflowWebhook => "workflow-webhook",
            Self::WebhookRelay => "webhook-relay",
            Self::SourceControlDispatch => "source-control-dispatch",
            Self::GenericHttp => "generic-http",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for IntegrationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform success envelope returned for every command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchResult {
    pub ok: bool,
    pub command: String,
    /// Backend URL, or [`LOCAL_DEST`] for locally answered commands.
    pub dest: String,
    pub data: Map<String, Value>,
}

impl DispatchResult {
    pub fn new(command: impl Into<String>, dest: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            ok: true,
            command: command.into(),
            dest: dest.into(),
            data,
        }
    }

    /// Result for a command answered without any network call.
    pub fn local(command: impl Into<String>, data: Map<String, Value>) -> Self {
        Self::new(command, LOCAL_DEST, data)
    }

    pub fn is_local(&self) -> bool {
        self.dest == LOCAL_DEST
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_fields_deserialize_as_absent() {
        let request: DispatchRequest = serde_json::from_value(json!({
            "command": "run",
            "args": null,
            "actor": null
        }))
        .expect("request");
        assert_eq!(request.command_text(), Some("run"));
        assert!(request.args.is_none());
        assert!(request.actor.is_none());
    }

    #[test]
    fn non_string_command_is_kept_for_validation() {
        let request: DispatchRequest = serde_json::from_value(json!({ "command": 7 })).expect("request");
        assert_eq!(request.command, Some(json!(7)));
        assert_eq!(request.command_text(), None);
    }

    #[test]
    fn forward_payload_carries_all_three_fields() {
        let invocation = CommandInvocation {
            command: "zap:send_report".into(),
            base: "zap".into(),
            args: json!({ "report": "daily" }).as_object().cloned().unwrap_or_default(),
            actor: "ops".into(),
        };
        assert_eq!(
            invocation.forward_payload(),
            json!({ "command": "zap:send_report", "args": { "report": "daily" }, "actor": "ops" })
        );
    }

    #[test]
    fn result_serializes_with_ok_flag() {
        let result = DispatchResult::local("status", Map::new());
        let value = serde_json::to_value(&result).expect("serialize");
        assert_eq!(value, json!({ "ok": true, "command": "status", "dest": "local", "data": {} }));
        assert!(result.is_local());
    }
}
