//! Backend adapters, one per integration family.
//!
//! Network adapters split into a pure `build_request` step and an async
//! `invoke` step, so request-shape validation happens before any transport
//! is required.

pub mod generic_http;
pub mod local;
pub mod source_control;
pub mod webhook;

pub use source_control::DispatchTarget;
