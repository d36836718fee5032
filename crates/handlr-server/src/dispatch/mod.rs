//! Dispatch module exports.
//!
//! Re-exports the handler trait and the lifecycle wrapper so downstream
//! consumers can depend on this module directly.

pub mod base;
pub mod handler;

pub use base::{HandlerSettings, HttpHandlerBase};
pub use handler::HttpHandler;
