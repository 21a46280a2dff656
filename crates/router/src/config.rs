//! Configuration lookup for integration credentials and URLs.
//!
//! The router never reads the process environment directly. A
//! [`ConfigProvider`] is injected at construction time, which keeps dispatch
//! testable without mutating process-wide state. [`EnvConfig`] is the
//! production provider; [`StaticConfig`] backs tests and embedding.

use std::collections::HashMap;
use std::env;
use std::fmt::Debug;

use relay_types::RoutingError;

/// Repository used for source-control dispatch when `GH_REPO` is unset.
pub const DEFAULT_REPOSITORY: &str = "alrouf/n8n-automation-";

/// Source-control API base used when `GH_API_BASE` is unset.
pub const DEFAULT_SOURCE_CONTROL_API_BASE: &str = "https://api.github.com";

/// Recognized configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    WorkflowWebhookUrl,
    RelayWebhookUrl,
    SourceControlToken,
    SourceControlRepository,
    SourceControlApiBase,
    ProtocolAuthToken,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 6] = [
        ConfigKey::WorkflowWebhookUrl,
        ConfigKey::RelayWebhookUrl,
        ConfigKey::SourceControlToken,
        ConfigKey::SourceControlRepository,
        ConfigKey::SourceControlApiBase,
        ConfigKey::ProtocolAuthToken,
    ];

    /// Environment variable backing this key.
    pub const fn env_var(&self) -> &'static str {
        match self {
            ConfigKey::WorkflowWebhookUrl => "N8N_WEBHOOK_URL",
            ConfigKey::RelayWebhookUrl => "ZAPIER_WEBHOOK_URL",
            ConfigKey::SourceControlToken => "GH_TOKEN",
            ConfigKey::SourceControlRepository => "GH_REPO",
            ConfigKey::SourceControlApiBase => "GH_API_BASE",
            ConfigKey::ProtocolAuthToken => "MCP_TOKEN",
        }
    }

    pub fn from_env_var(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.env_var() == name)
    }
}

/// Opaque key-value lookup for integration configuration.
pub trait ConfigProvider: Send + Sync + Debug {
    /// Returns the configured value, or `None` when absent or blank.
    fn get(&self, key: ConfigKey) -> Option<String>;

    fn is_configured(&self, key: ConfigKey) -> bool {
        self.get(key).is_some()
    }
}

/// Reads configuration from the process environment on every lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConfig;

impl ConfigProvider for EnvConfig {
    fn get(&self, key: ConfigKey) -> Option<String> {
        env::var(key.env_var()).ok().filter(|value| !value.trim().is_empty())
    }
}

/// Fixed in-memory configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticConfig {
    values: HashMap<ConfigKey, String>,
}

impl StaticConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous one.
    pub fn with(mut self, key: ConfigKey, value: impl Into<String>) -> Self {
        self.values.insert(key, value.into());
        self
    }
}

impl FromIterator<(ConfigKey, String)> for StaticConfig {
    fn from_iter<T: IntoIterator<Item = (ConfigKey, String)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl ConfigProvider for StaticConfig {
    fn get(&self, key: ConfigKey) -> Option<String> {
        self.values.get(&key).filter(|value| !value.trim().is_empty()).cloned()
    }
}

/// Look up a required key, failing with a configuration error naming it.
pub fn require(config: &dyn ConfigProvider, key: ConfigKey) -> Result<String, RoutingError> {
    config
        .get(key)
        .ok_or_else(|| RoutingError::missing_configuration(key.env_var()))
}

/// Source-control repository, falling back to [`DEFAULT_REPOSITORY`].
pub fn source_control_repository(config: &dyn ConfigProvider) -> String {
    config
        .get(ConfigKey::SourceControlRepository)
        .unwrap_or_else(|| DEFAULT_REPOSITORY.to_string())
}

/// Source-control API base without a trailing slash.
pub fn source_control_api_base(config: &dyn ConfigProvider) -> String {
    config
        .get(ConfigKey::SourceControlApiBase)
        .map(|base| base.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_SOURCE_CONTROL_API_BASE.to_string())
}
