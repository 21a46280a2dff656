//! Payload shaping for MCP tool log events.
//!
//! Tool requests and responses are logged as JSON. Everything passes through
//! [`redact_value`] first so tokens in args or headers never reach the log.

use relay_router::redact_value;
use serde_json::{Map, Value};

/// Responses whose text content exceeds this are not re-parsed for logging.
const MAX_TEXT_PARSE_BYTES: usize = 64 * 1024;

/// `{request?, response?}` with secrets masked, or `None` when both are absent.
pub(crate) fn build_log_payload(request: Option<&Value>, response: Option<&Value>) -> Option<Value> {
    let mut payload = Map::new();
    if let Some(request) = request {
        payload.insert("request".into(), redact_value(request));
    }
    if let Some(response) = response {
        payload.insert("response".into(), redact_value(response));
    }
    (!payload.is_empty()).then_some(Value::Object(payload))
}

/// The first `text` content item of a tool result parsed back into JSON.
///
/// Tool results carry their envelope as serialized text; this recovers it so
/// the log shows structure instead of an escaped string.
pub(crate) fn parsed_text_content(response: &Value) -> Option<Value> {
    let text = response
        .get("content")?
        .as_array()?
        .iter()
        .find_map(|item| item.get("text").and_then(Value::as_str))?;
    if text.len() > MAX_TEXT_PARSE_BYTES {
        return None;
    }
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(Value::is_object)
        .map(|parsed| redact_value(&parsed))
}
