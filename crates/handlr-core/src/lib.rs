//! handlr core: transport-agnostic request model, error types, and the
//! lock-free statistics primitives used by the dispatch core.
//!
//! This crate carries no transport or HTTP server dependencies so the
//! statistics and request model can be reused by any front end.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `HandlrError`/`Result`; the request
//! hot path must never bring the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod http;
pub mod method;
pub mod statistics;

/// Shared result type.
pub use error::{HandlrError, Result};
pub use method::HttpMethod;
