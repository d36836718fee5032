//! Operational HTTP endpoints.
//!
//! - `/healthz`    : liveness
//! - `/readyz`     : readiness (503 when draining)
//! - statistics path (default `/statistics`): JSON report, optional `?prefix=`

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::obs::StatisticsRequest;

#[derive(Debug, Default, Deserialize)]
pub struct StatisticsQuery {
    pub prefix: Option<String>,
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    if state.is_draining() {
        (StatusCode::SERVICE_UNAVAILABLE, "draining")
    } else {
        (StatusCode::OK, "ready")
    }
}

pub async fn statistics(State(state): State<AppState>, Query(q): Query<StatisticsQuery>) -> impl IntoResponse {
    let request = StatisticsRequest { prefix: q.prefix };
    Json(state.storage().collect(&request))
}
