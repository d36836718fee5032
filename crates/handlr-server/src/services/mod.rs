//! Built-in handlers selectable from config.

pub mod echo;
pub mod ping;

use std::sync::Arc;

pub use echo::EchoHandler;
pub use ping::PingHandler;

use crate::config::HandlerKind;
use crate::dispatch::HttpHandler;

pub fn build_handler(kind: HandlerKind, name: &str) -> Arc<dyn HttpHandler> {
    match kind {
        HandlerKind::Ping => Arc::new(PingHandler::new(name)),
        HandlerKind::Echo => Arc::new(EchoHandler::new(name)),
    }
}
