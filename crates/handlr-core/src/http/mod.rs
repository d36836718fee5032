//! Transport-agnostic request/response model.
//!
//! The transport layer produces an [`HttpRequest`] plus a fresh
//! [`RequestContext`] per request and consumes the [`HttpResponse`] the
//! dispatch core hands back.

pub mod context;
pub mod request;
pub mod response;

pub use context::{CancelHandle, RequestContext};
pub use request::HttpRequest;
pub use response::HttpResponse;
