//! Locally answered commands: `status` and `help`. Neither touches the network.

use chrono::{SecondsFormat, Utc};
use relay_types::{CommandInvocation, DispatchResult};
use serde_json::{Map, Value, json};

use crate::config::{ConfigKey, ConfigProvider};
use crate::routes::{supported_commands, usage_examples};

/// Integration snapshot: which credentials are configured, plus a timestamp.
pub fn status(invocation: &CommandInvocation, config: &dyn ConfigProvider) -> DispatchResult {
    let mut data = Map::new();
    data.insert(
        "timestamp".into(),
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    data.insert("actor".into(), Value::String(invocation.actor.clone()));
    data.insert(
        "integrations".into(),
        json!({
            "n8n": config.is_configured(ConfigKey::WorkflowWebhookUrl),
            "zapier": config.is_configured(ConfigKey::RelayWebhookUrl),
            "github": config.is_configured(ConfigKey::SourceControlToken),
            "mcpToken": config.is_configured(ConfigKey::ProtocolAuthToken),
        }),
    );
    DispatchResult::local("status", data)
}

/// Static catalog of supported command families with one usage example each.
pub fn help(invocation: &CommandInvocation) -> DispatchResult {
    let mut data = Map::new();
    data.insert("actor".into(), Value::String(invocation.actor.clone()));
    data.insert("supported".into(), json!(supported_commands()));
    data.insert("usage".into(), Value::Object(usage_examples()));
    DispatchResult::local("help", data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticConfig;
    use chrono::DateTime;

    fn invocation(command: &str) -> CommandInvocation {
        CommandInvocation {
            command: command.into(),
            base: command.into(),
            args: Map::new(),
            actor: "ops".into(),
        }
    }

    #[test]
    fn status_reports_configured_integrations() {
        let config = StaticConfig::new()
            .with(ConfigKey::WorkflowWebhookUrl, "https://n8n.example/hook")
            .with(ConfigKey::ProtocolAuthToken, "secret");
        let result = status(&invocation("status"), &config);
        assert_eq!(result.dest, "local");
        assert_eq!(result.command, "status");
        assert_eq!(result.data["actor"], "ops");
        assert_eq!(
            result.data["integrations"],
            json!({ "n8n": true, "zapier": false, "github": false, "mcpToken": true })
        );
        let timestamp = result.data["timestamp"].as_str().unwrap_or_default();
        assert!(DateTime::parse_from_rfc3339(timestamp).is_ok(), "timestamp: {timestamp}");
    }

    #[test]
    fn help_lists_catalog_and_usage() {
        let result = help(&invocation("help"));
        assert_eq!(result.command, "help");
        assert_eq!(result.data["supported"], json!(supported_commands()));
        assert_eq!(result.data["usage"]["http"]["dest"], "HTTP");
    }
}
