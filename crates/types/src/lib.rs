//! Shared value types for the relay command router and its HTTP shell.

mod dispatch;
mod error;

pub use dispatch::{CommandInvocation, DEFAULT_ACTOR, DispatchRequest, DispatchResult, IntegrationTarget, LOCAL_DEST};
pub use error::{ErrorEnvelope, ErrorEnvelopeData, ErrorKind, RoutingError};
