//! HTTP shell and Model Context Protocol (MCP) tool server for the relay proxy.
//!
//! [`RelayHttpServer`] serves the command route, the liveness endpoints and a
//! stateless streamable-HTTP MCP endpoint at `/mcp`, all backed by one shared
//! [`relay_router::DispatchRouter`].

pub mod server;

pub use server::{
    AppState, DEFAULT_HEARTBEAT_INTERVAL, DEFAULT_PORT, LIVENESS_MESSAGE, RelayHttpServer, RelayMcpCore, RunningRelayHttpServer,
    build_app, resolve_bind_address,
};
