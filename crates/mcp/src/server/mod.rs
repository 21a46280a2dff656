mod auth;
mod core;
mod http;
mod log_payload;
mod routes;
mod schemas;
mod sse;
mod state;

pub use auth::TOKEN_HEADER;
pub use core::RelayMcpCore;
pub use http::{DEFAULT_PORT, RelayHttpServer, RunningRelayHttpServer, resolve_bind_address};
pub use routes::{BANNER, HEALTH_MESSAGE, MAX_BODY_BYTES, PING_MESSAGE, build_app};
pub use schemas::{DispatchCommandParam, IntegrationStatusParam};
pub use sse::LIVENESS_MESSAGE;
pub use state::{AppState, DEFAULT_HEARTBEAT_INTERVAL};
