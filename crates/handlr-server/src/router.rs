//! Axum router wiring.
//!
//! Ops endpoints plus one catch-all-method route per configured handler.

use std::sync::Arc;

use axum::{
    extract::Request,
    routing::{any, get},
    Router,
};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    let max_body_bytes = state.cfg().server.max_body_bytes;

    let mut router: Router = Router::new()
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route(&state.cfg().server.statistics_path, get(ops::statistics))
        .with_state(state.clone());

    for mounted in state.handlers() {
        let handler = Arc::clone(&mounted.handler);
        router = router.route(
            &mounted.path,
            any(move |req: Request| {
                let handler = Arc::clone(&handler);
                async move { transport::http::serve(handler, max_body_bytes, req).await }
            }),
        );
    }

    router
}
