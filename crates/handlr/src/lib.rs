//! Top-level facade crate for handlr.
//!
//! Re-exports the core types and the server library so users can depend on a single crate.

pub mod core {
    pub use handlr_core::*;
}

pub mod server {
    pub use handlr_server::*;
}
