//! Secret redaction for log output.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static SECRET_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(bearer )([\w\-\.=:/+]+)",
        r"(?i)(authorization: )([\w\-\.=:/+]+)",
        r"(?i)([A-Z0-9_]*?(?:KEY|TOKEN|SECRET|PASSWORD)=)([^\s]+)",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

const SENSITIVE_KEY_FRAGMENTS: &[&str] = &["authorization", "token", "secret", "password", "api_key", "apikey"];

/// Redacts values that look like secrets in a string.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in SECRET_PATTERNS.iter() {
        redacted = pattern
            .replace_all(&redacted, |caps: &regex::Captures| {
                let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}<redacted>")
            })
            .to_string();
    }
    redacted
}

/// Whether a header or field name usually carries a credential.
pub fn is_sensitive_key(name: &str) -> bool {
    let lowered = name.to_ascii_lowercase();
    SENSITIVE_KEY_FRAGMENTS.iter().any(|fragment| lowered.contains(fragment))
}

/// Returns a copy of a JSON value with credential-like fields masked.
pub fn redact_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, nested)| {
                    let masked = if is_sensitive_key(key) && nested.is_string() {
                        Value::String("<redacted>".into())
                    } else {
                        redact_value(nested)
                    };
                    (key.clone(), masked)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_value).collect()),
        Value::String(text) => Value::String(redact_sensitive(text)),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masks_authorization_and_env_style_secrets() {
        let line = "Authorization: Bearer abc123 GH_TOKEN=ghp_secret other=value";
        let redacted = redact_sensitive(line);
        assert!(!redacted.contains("abc123"));
        assert!(!redacted.contains("ghp_secret"));
        assert!(redacted.contains("other=value"));
    }

    #[test]
    fn masks_sensitive_json_fields_recursively() {
        let value = json!({
            "headers": { "Authorization": "Bearer abc", "Accept": "application/json" },
            "items": [{ "api_key": "k" }],
            "x-mcp-token": null
        });
        let redacted = redact_value(&value);
        assert_eq!(redacted["headers"]["Authorization"], "<redacted>");
        assert_eq!(redacted["headers"]["Accept"], "application/json");
        assert_eq!(redacted["items"][0]["api_key"], "<redacted>");
        assert_eq!(redacted["x-mcp-token"], Value::Null);
    }
}
