//! Server host: binding, the MCP service and graceful shutdown.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::server::core::RelayMcpCore;
use crate::server::routes::build_app;
use crate::server::state::AppState;

/// Port used when neither a bind address nor `PORT` is given.
pub const DEFAULT_PORT: u16 = 3000;

/// Stateless streamable-HTTP MCP service; every request gets a fresh core.
pub(crate) fn mcp_service(state: &AppState, cancellation: CancellationToken) -> StreamableHttpService<RelayMcpCore, LocalSessionManager> {
    let router = state.shared_router();
    StreamableHttpService::new(
        move || Ok(RelayMcpCore::new(Arc::clone(&router))),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig {
            stateful_mode: false,
            sse_keep_alive: None,
            cancellation_token: cancellation,
            ..Default::default()
        },
    )
}

/// Host configuration for one relay server instance.
#[derive(Debug, Clone)]
pub struct RelayHttpServer {
    bind_address: SocketAddr,
    state: AppState,
}

impl RelayHttpServer {
    pub fn new(bind_address: SocketAddr, state: AppState) -> Self {
        Self { bind_address, state }
    }

    /// Bind and start serving; returns a handle for inspection and shutdown.
    pub async fn start(self) -> Result<RunningRelayHttpServer> {
        let cancellation_token = CancellationToken::new();
        let app = build_app(self.state, cancellation_token.child_token());
        let listener = tokio::net::TcpListener::bind(self.bind_address)
            .await
            .with_context(|| format!("failed to bind {}", self.bind_address))?;
        let bound_address = listener.local_addr()?;
        info!(address = %bound_address, "relay server listening");

        let server_handle = tokio::spawn({
            let shutdown = cancellation_token.child_token();
            async move {
                let _ = axum::serve(listener, app)
                    .with_graceful_shutdown(async move {
                        shutdown.cancelled().await;
                    })
                    .await;
            }
        });

        Ok(RunningRelayHttpServer {
            bind_address: bound_address,
            cancellation_token,
            server_handle,
        })
    }
}

/// Runtime handle for a running server.
#[derive(Debug)]
pub struct RunningRelayHttpServer {
    bind_address: SocketAddr,
    cancellation_token: CancellationToken,
    server_handle: JoinHandle<()>,
}

impl RunningRelayHttpServer {
    pub fn bound_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Stop accepting connections and wait for in-flight requests to drain.
    pub async fn stop(self) -> Result<()> {
        self.cancellation_token.cancel();
        self.server_handle
            .await
            .map_err(|error| anyhow!("relay server task failed: {error}"))?;
        info!(address = %self.bind_address, "relay server stopped");
        Ok(())
    }
}

/// Resolve the listen address: explicit `bind_address`, else `0.0.0.0:$PORT`.
pub fn resolve_bind_address(bind_address: Option<&str>) -> Result<SocketAddr> {
    if let Some(address) = bind_address {
        return address
            .parse()
            .map_err(|error| anyhow!("invalid bind address '{address}': {error}"));
    }
    let port = match env::var("PORT") {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<u16>()
            .map_err(|error| anyhow!("invalid PORT '{value}': {error}"))?,
        _ => DEFAULT_PORT,
    };
    Ok(SocketAddr::from(([0, 0, 0, 0], port)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_router::{DispatchRouter, StaticConfig};

    #[test]
    fn explicit_bind_address_wins() {
        temp_env::with_var("PORT", Some("9999"), || {
            let address = resolve_bind_address(Some("127.0.0.1:4100")).expect("address");
            assert_eq!(address, "127.0.0.1:4100".parse().expect("socket address"));
        });
    }

    #[test]
    fn port_variable_and_default() {
        temp_env::with_var("PORT", Some("8088"), || {
            assert_eq!(resolve_bind_address(None).expect("address").port(), 8088);
        });
        temp_env::with_var_unset("PORT", || {
            let address = resolve_bind_address(None).expect("address");
            assert_eq!(address.port(), DEFAULT_PORT);
            assert!(address.ip().is_unspecified());
        });
        temp_env::with_var("PORT", Some("not-a-port"), || {
            assert!(resolve_bind_address(None).is_err());
        });
    }

    #[tokio::test]
    async fn starts_and_stops_on_an_ephemeral_port() {
        let state = AppState::new(DispatchRouter::without_transport(Arc::new(StaticConfig::new())));
        let address = resolve_bind_address(Some("127.0.0.1:0")).expect("address");
        let running = RelayHttpServer::new(address, state).start().await.expect("server starts");
        assert_ne!(running.bound_address().port(), 0);
        running.stop().await.expect("server stops");
    }
}
