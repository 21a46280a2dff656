//! The routing table.
//!
//! Routing is data: an ordered list of [`Route`] entries, each pairing a
//! base-token matcher with a handler, the configuration key it requires and
//! the catalog lines it contributes. The help catalog and the
//! unsupported-command error are both derived from this one table.

use once_cell::sync::Lazy;
use relay_types::IntegrationTarget;
use serde_json::{Map, Value, json};

use crate::config::ConfigKey;

/// Verbs forwarded to the workflow-engine webhook.
pub const WORKFLOW_VERBS: &[&str] = &["run", "report", "summary", "email", "sheet"];

/// Which base tokens a route accepts.
#[derive(Debug, Clone, Copy)]
pub enum BaseMatch {
    Exact(&'static str),
    AnyOf(&'static [&'static str]),
}

impl BaseMatch {
    pub fn matches(&self, base: &str) -> bool {
        match self {
            BaseMatch::Exact(token) => token.eq_ignore_ascii_case(base),
            BaseMatch::AnyOf(tokens) => tokens.iter().any(|token| token.eq_ignore_ascii_case(base)),
        }
    }
}

/// How a matched command is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteHandler {
    Status,
    Help,
    /// POST-and-relay to the URL held by the route's required key.
    Webhook,
    SourceControlDispatch,
    GenericHttp,
}

/// One help usage example.
#[derive(Debug, Clone, Copy)]
pub struct UsageExample {
    pub name: &'static str,
    pub dest: &'static str,
    pub sample: fn() -> Value,
}

/// A routing table entry.
#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub matcher: BaseMatch,
    pub target: IntegrationTarget,
    pub handler: RouteHandler,
    /// Configuration that must be present before the handler runs.
    pub required: Option<ConfigKey>,
    pub descriptors: &'static [&'static str],
    pub usage: Option<UsageExample>,
}

pub static ROUTES: &[Route] = &[
    Route {
        matcher: BaseMatch::AnyOf(WORKFLOW_VERBS),
        target: IntegrationTarget::WorkflowWebhook,
        handler: RouteHandler::Webhook,
        required: Some(ConfigKey::WorkflowWebhookUrl),
        descriptors: &["run (n8n)", "report (n8n)", "summary (n8n)", "email (n8n)", "sheet (n8n)"],
        usage: Some(UsageExample {
            name: "run",
            dest: "n8n",
            sample: || json!({ "command": "run", "args": { "workflow": "email_executive_assistant" } }),
        }),
    },
    Route {
        matcher: BaseMatch::Exact("git"),
        target: IntegrationTarget::SourceControlDispatch,
        handler: RouteHandler::SourceControlDispatch,
        required: Some(ConfigKey::SourceControlToken),
        descriptors: &["git:* (GitHub repository_dispatch)"],
        usage: Some(UsageExample {
            name: "git",
            dest: "GitHub",
            sample: || json!({ "command": "git:sync" }),
        }),
    },
    Route {
        matcher: BaseMatch::Exact("zap"),
        target: IntegrationTarget::WebhookRelay,
        handler: RouteHandler::Webhook,
        required: Some(ConfigKey::RelayWebhookUrl),
        descriptors: &["zap:* (Zapier webhook)"],
        usage: Some(UsageExample {
            name: "zap",
            dest: "Zapier",
            sample: || json!({ "command": "zap:send_report", "args": { "report": "daily" } }),
        }),
    },
    Route {
        matcher: BaseMatch::Exact("http"),
        target: IntegrationTarget::GenericHttp,
        handler: RouteHandler::GenericHttp,
        required: None,
        descriptors: &["http (custom HTTP request)"],
        usage: Some(UsageExample {
            name: "http",
            dest: "HTTP",
            sample: || {
                json!({
                    "command": "http",
                    "args": { "url": "https://example.com", "method": "POST", "body": { "ping": true } }
                })
            },
        }),
    },
    Route {
        matcher: BaseMatch::Exact("status"),
        target: IntegrationTarget::Local,
        handler: RouteHandler::Status,
        required: None,
        descriptors: &["status (integration health)"],
        usage: None,
    },
    Route {
        matcher: BaseMatch::Exact("help"),
        target: IntegrationTarget::Local,
        handler: RouteHandler::Help,
        required: None,
        descriptors: &["help (this message)"],
        usage: None,
    },
];

static SUPPORTED: Lazy<Vec<&'static str>> =
    Lazy::new(|| ROUTES.iter().flat_map(|route| route.descriptors.iter().copied()).collect());

/// First route whose matcher accepts `base`.
pub fn resolve(base: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|route| route.matcher.matches(base))
}

/// Every supported command descriptor, in table order.
pub fn supported_commands() -> &'static [&'static str] {
    SUPPORTED.as_slice()
}

/// `{name: {dest, sample}}` usage examples, one per command family.
pub fn usage_examples() -> Map<String, Value> {
    ROUTES
        .iter()
        .filter_map(|route| route.usage)
        .map(|usage| {
            (
                usage.name.to_string(),
                json!({ "dest": usage.dest, "sample": (usage.sample)() }),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_each_family() {
        assert_eq!(resolve("status").map(|r| r.handler), Some(RouteHandler::Status));
        assert_eq!(resolve("help").map(|r| r.handler), Some(RouteHandler::Help));
        for verb in WORKFLOW_VERBS {
            assert_eq!(resolve(verb).map(|r| r.target), Some(IntegrationTarget::WorkflowWebhook));
        }
        assert_eq!(resolve("zap").map(|r| r.target), Some(IntegrationTarget::WebhookRelay));
        assert_eq!(resolve("git").map(|r| r.target), Some(IntegrationTarget::SourceControlDispatch));
        assert_eq!(resolve("http").map(|r| r.target), Some(IntegrationTarget::GenericHttp));
        assert!(resolve("bogus").is_none());
        assert!(resolve("").is_none());
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(resolve("ZAP").map(|r| r.target), Some(IntegrationTarget::WebhookRelay));
    }

    #[test]
    fn catalog_lists_every_descriptor_once() {
        let supported = supported_commands();
        let total: usize = ROUTES.iter().map(|route| route.descriptors.len()).sum();
        assert_eq!(supported.len(), total);
        assert!(supported.contains(&"git:* (GitHub repository_dispatch)"));
        assert!(supported.contains(&"help (this message)"));
    }

    #[test]
    fn catalog_lists_network_commands_before_local_ones() {
        assert_eq!(
            supported_commands(),
            [
                "run (n8n)",
                "report (n8n)",
                "summary (n8n)",
                "email (n8n)",
                "sheet (n8n)",
                "git:* (GitHub repository_dispatch)",
                "zap:* (Zapier webhook)",
                "http (custom HTTP request)",
                "status (integration health)",
                "help (this message)",
            ]
        );
    }

    #[test]
    fn usage_has_one_example_per_network_family() {
        let usage = usage_examples();
        let mut names: Vec<_> = usage.keys().cloned().collect();
        names.sort();
        assert_eq!(names, vec!["git", "http", "run", "zap"]);
        assert_eq!(usage["git"]["sample"]["command"], "git:sync");
    }

    #[test]
    fn required_configuration_matches_handlers() {
        for route in ROUTES {
            let needs_credential = matches!(route.handler, RouteHandler::Webhook | RouteHandler::SourceControlDispatch);
            assert_eq!(route.required.is_some(), needs_credential);
        }
        assert_eq!(resolve("run").and_then(|r| r.required), Some(ConfigKey::WorkflowWebhookUrl));
        assert_eq!(resolve("zap").and_then(|r| r.required), Some(ConfigKey::RelayWebhookUrl));
        assert_eq!(resolve("git").and_then(|r| r.required), Some(ConfigKey::SourceControlToken));
        assert_eq!(resolve("http").and_then(|r| r.required), None);
    }
}
