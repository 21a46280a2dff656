//! Command classification and dispatch for the relay proxy.
//!
//! A caller hands [`DispatchRouter::dispatch`] a `{command, args, actor}`
//! request. The router validates it, extracts the command's base token with
//! [`classifier::base_of`], looks the token up in the [`routes`] table and
//! invokes the matching adapter:
//!
//! - `status` / `help` are answered locally
//! - workflow verbs and `zap:*` are POSTed to a configured webhook
//! - `git:*` triggers a source-control `repository_dispatch` event
//! - `http` sends a caller-described request to any HTTP endpoint
//!
//! Every backend response is normalized into a [`DispatchResult`], and every
//! failure is a [`RoutingError`] carrying an HTTP-style status.
//!
//! ```ignore
//! use relay_router::DispatchRouter;
//! use relay_types::DispatchRequest;
//!
//! let router = DispatchRouter::from_env()?;
//! let result = router.dispatch(DispatchRequest::new("status")).await?;
//! assert_eq!(result.dest, "local");
//! ```

pub mod adapters;
pub mod classifier;
pub mod config;
pub mod normalizer;
pub mod redact;
mod router;
pub mod routes;
pub mod transport;

pub use classifier::base_of;
pub use config::{ConfigKey, ConfigProvider, EnvConfig, StaticConfig};
pub use redact::{redact_sensitive, redact_value};
pub use relay_types::{DispatchRequest, DispatchResult, ErrorEnvelope, ErrorKind, RoutingError};
pub use router::{DispatchRouter, validate};
pub use transport::{HttpTransport, OutboundRequest, RawResponse, ReqwestTransport};
