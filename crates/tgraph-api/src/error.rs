//! Translation of core/registry/pipeline errors into the HTTP taxonomy of
//! spec §7: no status codes leak past this boundary into library crates.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use tgraph_pipeline::PipelineError;
use tgraph_registry::RegistryError;

pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    TooLarge(String),
    RateLimited,
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(m)
            | ApiError::Unauthorized(m)
            | ApiError::NotFound(m)
            | ApiError::TooLarge(m)
            | ApiError::Internal(m) => m.clone(),
            ApiError::RateLimited => "rate limit exceeded".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.message() }));
        (status, body).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        // Every pipeline failure reaching this edge is a rejected
        // transaction or block, never a server fault: spec §4.3 maps all
        // of these to 400 regardless of which validation step tripped.
        ApiError::BadRequest(e.to_string())
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<tgraph_core::CoreError> for ApiError {
    fn from(e: tgraph_core::CoreError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}
