//! Transport layer bindings.

pub mod http;
