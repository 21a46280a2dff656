//! Routing error taxonomy and its serialized failure envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Category of a routing failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed command, args, actor, body or URL.
    Validation,
    /// Missing or mismatched caller token.
    Unauthorized,
    /// Inbound body exceeded the size limit.
    PayloadTooLarge,
    /// A required integration credential is not configured.
    Configuration,
    /// No routing table entry matched the command.
    UnsupportedCommand,
    /// The selected backend answered with a non-success status.
    Backend,
    /// No usable outbound HTTP capability.
    TransportUnavailable,
    /// Unexpected fault, reported without detail.
    Internal,
}

/// Typed failure raised by the router and its adapters.
///
/// Constructed once at the point of failure and propagated unchanged to the
/// transport boundary, where it is serialized with [`RoutingError::to_envelope`].
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct RoutingError {
    kind: ErrorKind,
    message: String,
    status: u16,
    dest: Option<String>,
    data: Map<String, Value>,
}

impl RoutingError {
    fn new(kind: ErrorKind, status: u16, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status,
            dest: None,
            data: Map::new(),
        }
    }

    /// 400 for malformed input.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, 400, message)
    }

    /// 400 for malformed input, with structured detail.
    pub fn validation_with(message: impl Into<String>, data: Map<String, Value>) -> Self {
        Self::validation(message).with_data(data)
    }

    pub fn unauthorized() -> Self {
        Self::new(ErrorKind::Unauthorized, 401, "Unauthorized")
    }

    pub fn payload_too_large() -> Self {
        Self::new(ErrorKind::PayloadTooLarge, 413, "Request body too large")
    }

    /// 500 naming the configuration key that is absent.
    pub fn missing_configuration(key: &str) -> Self {
        let mut data = Map::new();
        data.insert("integration".into(), Value::String(key.to_string()));
        Self::new(ErrorKind::Configuration, 500, format!("{key} is not configured")).with_data(data)
    }

    /// 400 carrying the full supported-command catalog.
    pub fn unsupported_command(command: &str, supported: &[&str]) -> Self {
        let mut data = Map::new();
        data.insert("command".into(), Value::String(command.to_string()));
        data.insert(
            "supported".into(),
            Value::Array(supported.iter().map(|entry| Value::String((*entry).to_string())).collect()),
        );
        Self::new(ErrorKind::UnsupportedCommand, 400, "Unsupported command").with_data(data)
    }

    /// Mirrors the backend's own status code.
    pub fn backend(message: impl Into<String>, status: u16, dest: impl Into<String>, data: Map<String, Value>) -> Self {
        Self::new(ErrorKind::Backend, status, message)
            .with_dest(dest)
            .with_data(data)
    }

    pub fn transport_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransportUnavailable, 500, message)
    }

    /// Generic 500 used when an unexpected fault must not leak its detail.
    pub fn internal() -> Self {
        let mut data = Map::new();
        data.insert("message".into(), Value::String("Unexpected error".into()));
        Self::new(ErrorKind::Internal, 500, "Internal server error").with_data(data)
    }

    pub fn with_dest(mut self, dest: impl Into<String>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn dest(&self) -> Option<&str> {
        self.dest.as_deref()
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Serialize into the failure envelope returned to callers.
    pub fn to_envelope(&self, command: Option<&str>, actor: Option<&str>) -> ErrorEnvelope {
        ErrorEnvelope {
            ok: false,
            command: command.map(str::to_string),
            dest: self.dest.clone(),
            data: ErrorEnvelopeData {
                error: self.message.clone(),
                actor: actor.map(str::to_string),
                details: self.data.clone(),
            },
        }
    }
}

/// Serialized form of a [`RoutingError`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub ok: bool,
    pub command: Option<String>,
    pub dest: Option<String>,
    pub data: ErrorEnvelopeData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelopeData {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(default)]
    pub details: Map<String, Value>,
}
