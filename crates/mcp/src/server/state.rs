//! Shared state handed to every HTTP handler and MCP session.

use std::sync::Arc;
use std::time::Duration;

use relay_router::{ConfigKey, DispatchRouter};
use tokio_util::sync::CancellationToken;

/// Interval between SSE heartbeat events unless overridden.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Immutable per-server state. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    router: Arc<DispatchRouter>,
    heartbeat_interval: Duration,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(router: DispatchRouter) -> Self {
        Self {
            router: Arc::new(router),
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub(crate) fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Cancelled when the hosting server shuts down; ends open streams.
    pub(crate) fn shutdown(&self) -> &CancellationToken {
        &self.shutdown
    }

    pub fn router(&self) -> &DispatchRouter {
        &self.router
    }

    pub(crate) fn shared_router(&self) -> Arc<DispatchRouter> {
        Arc::clone(&self.router)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        self.heartbeat_interval
    }

    /// The token callers must present, when one is configured.
    pub fn expected_token(&self) -> Option<String> {
        self.router.config().get(ConfigKey::ProtocolAuthToken)
    }
}
