//! `POST /api/quids` (spec §6): derives and registers the quid for a
//! submitted public key. The node never generates or custodies secret
//! key material on a caller's behalf; callers generate their own keypair
//! and submit the public half to learn the quid it derives to.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use tgraph_core::PublicKeyHex;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct MintQuidRequest {
    public_key: String,
}

#[derive(Serialize)]
pub struct MintQuidResponse {
    quid_id: String,
    public_key: String,
    created: bool,
}

pub async fn mint_quid(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MintQuidRequest>,
) -> Result<(StatusCode, Json<MintQuidResponse>), ApiError> {
    let public_key = PublicKeyHex(req.public_key.clone());
    public_key.to_bytes().map_err(ApiError::from)?;
    let quid = public_key.to_quid().map_err(ApiError::from)?;

    let created = state.identity_registry.get(&quid).await.is_none();

    Ok((StatusCode::CREATED, Json(MintQuidResponse { quid_id: quid.to_string(), public_key: public_key.0, created })))
}
