//! `GET /api/health`, `GET /api/info` (spec §6).

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    node_id: String,
    uptime_s: u64,
    version: &'static str,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        node_id: state.node_id.to_string(),
        uptime_s: state.uptime_secs(),
        version: state.version,
    })
}

#[derive(Serialize)]
pub struct InfoResponse {
    node_quid: String,
    managed_domains: Vec<String>,
    block_height: u64,
    version: &'static str,
}

pub async fn info(State(state): State<Arc<AppState>>) -> Json<InfoResponse> {
    let domains = state.domains.read().await;
    let managed_domains: Vec<String> = domains.keys().cloned().collect();
    let mut block_height = 0u64;
    for name in domains.keys() {
        block_height += state.chain.height(name).await;
    }

    Json(InfoResponse { node_quid: state.self_quid.to_string(), managed_domains, block_height, version: state.version })
}
