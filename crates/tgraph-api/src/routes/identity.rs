//! `GET /api/identity/{quidId}` (spec §6).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use tgraph_core::Quid;
use tgraph_registry::IdentityRecord;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn get_identity(State(state): State<Arc<AppState>>, Path(quid_id): Path<String>) -> Result<Json<IdentityRecord>, ApiError> {
    let quid = Quid::parse(quid_id)?;
    state
        .identity_registry
        .get(&quid)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no identity registered for {quid}")))
}
