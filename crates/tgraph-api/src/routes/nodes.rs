//! `GET /api/nodes` (spec §6, §4.7 discovery).

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use tgraph_core::Peer;

use crate::state::AppState;

#[derive(Serialize)]
pub struct NodesResponse {
    nodes: Vec<Peer>,
}

pub async fn list_nodes(State(state): State<Arc<AppState>>) -> Json<NodesResponse> {
    Json(NodesResponse { nodes: state.peer_fabric.table.all().await })
}
