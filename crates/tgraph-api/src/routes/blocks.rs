//! `GET /api/blocks` (spec §6).

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use tgraph_core::Block;

use crate::state::AppState;

#[derive(Serialize)]
pub struct BlocksResponse {
    blocks: Vec<Block>,
}

pub async fn list_blocks(State(state): State<Arc<AppState>>) -> Json<BlocksResponse> {
    Json(BlocksResponse { blocks: state.chain.all_blocks().await })
}
