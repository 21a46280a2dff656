//! Response normalization shared by all network adapters.
//!
//! Backends answer with JSON objects, JSON scalars, plain text or nothing at
//! all. [`BackendReply::from_raw`] folds those shapes into a single
//! `{status, body}` pair before anything is merged into a result, so the
//! router only ever sees a [`DispatchResult`] or a [`RoutingError`].

use relay_types::{DispatchResult, RoutingError};
use serde_json::{Map, Value};

use crate::transport::RawResponse;

/// Parse a response body into a JSON object.
///
/// - empty (or whitespace-only) text becomes `{}`
/// - a JSON object is returned as is
/// - any other JSON value is wrapped as `{message: value}`
/// - unparseable text is wrapped as `{message: text}`
pub fn parse_body(text: &str) -> Map<String, Value> {
    if text.trim().is_empty() {
        return Map::new();
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => map,
        Ok(other) => wrap_message(other),
        Err(_) => wrap_message(Value::String(text.to_string())),
    }
}

fn wrap_message(value: Value) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("message".into(), value);
    map
}

/// A backend response with its body already parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendReply {
    pub status: u16,
    pub body: Map<String, Value>,
}

impl BackendReply {
    pub fn from_raw(raw: RawResponse) -> Self {
        Self {
            status: raw.status,
            body: parse_body(&raw.text),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body merged with the numeric status and any adapter-specific extras.
    ///
    /// `status` and the extras overwrite same-named body fields.
    pub fn merged_data(&self, extras: &Map<String, Value>) -> Map<String, Value> {
        let mut data = self.body.clone();
        data.insert("status".into(), Value::from(self.status));
        for (key, value) in extras {
            data.insert(key.clone(), value.clone());
        }
        data
    }

    /// The backend's own `error` or `message` text, if it supplied one.
    pub fn failure_message(&self) -> Option<String> {
        ["error", "message"]
            .iter()
            .filter_map(|key| self.body.get(*key))
            .find_map(|value| match value {
                Value::String(text) if !text.is_empty() => Some(text.clone()),
                Value::String(_) | Value::Null | Value::Bool(false) => None,
                other => Some(other.to_string()),
            })
    }

    /// Convert into the dispatch outcome for `command` sent to `dest`.
    ///
    /// `fallback_label` names the backend in the generic failure message,
    /// e.g. `"Webhook responded with"`.
    pub fn into_outcome(
        self,
        command: &str,
        dest: &str,
        extras: &Map<String, Value>,
        fallback_label: &str,
    ) -> Result<DispatchResult, RoutingError> {
        let data = self.merged_data(extras);
        if self.is_success() {
            return Ok(DispatchResult::new(command, dest, data));
        }
        let message = self
            .failure_message()
            .unwrap_or_else(|| format!("{fallback_label} {}", self.status));
        Err(RoutingError::backend(message, self.status, dest, data))
    }
}
