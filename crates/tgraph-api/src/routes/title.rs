//! `GET /api/title/{assetId}` (spec §6).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use tgraph_registry::TitleRecord;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn get_title(State(state): State<Arc<AppState>>, Path(asset_id): Path<String>) -> Result<Json<TitleRecord>, ApiError> {
    state
        .title_registry
        .get(&asset_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no title registered for asset {asset_id}")))
}
