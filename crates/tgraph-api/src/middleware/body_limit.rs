//! Oversize-body guard for POST/PUT/PATCH (spec §4.2): 413 beyond the cap.

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tower::{Layer, Service};

#[derive(Clone)]
pub struct BodyLimitLayer {
    max_bytes: usize,
}

impl BodyLimitLayer {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }
}

impl<S> Layer<S> for BodyLimitLayer {
    type Service = BodyLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BodyLimitService { inner, max_bytes: self.max_bytes }
    }
}

#[derive(Clone)]
pub struct BodyLimitService<S> {
    inner: S,
    max_bytes: usize,
}

impl<S> Service<Request<Body>> for BodyLimitService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let max_bytes = self.max_bytes;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let guarded = matches!(*req.method(), Method::POST | Method::PUT | Method::PATCH);
            if !guarded {
                return inner.call(req).await;
            }

            let (parts, body) = req.into_parts();
            let bytes = match axum::body::to_bytes(body, max_bytes + 1).await {
                Ok(b) => b,
                Err(_) => return Ok(too_large_response()),
            };
            if bytes.len() > max_bytes {
                return Ok(too_large_response());
            }

            inner.call(Request::from_parts(parts, Body::from(bytes))).await
        })
    }
}

fn too_large_response() -> Response {
    (StatusCode::PAYLOAD_TOO_LARGE, axum::Json(json!({ "error": "request body too large" }))).into_response()
}
