//! handlr server library entry.
//!
//! Wires the dispatch core (handler lifecycle, auth checkpoint, statistics
//! registry), config, built-in handlers and the axum transport adapter. It is
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod auth;
pub mod config;
pub mod dispatch;
pub mod obs;
pub mod ops;
pub mod router;
pub mod services;
pub mod transport;
