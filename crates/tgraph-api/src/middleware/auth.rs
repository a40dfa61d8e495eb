//! Node-to-node HMAC request authentication (spec §4.1).
//!
//! Gates any path matching `/api/(v\d+/)?transactions/(trust|identity|title|event)`
//! or `/api/v1/gossip/domains`. Skipped entirely when `required` is false.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use tower::{Layer, Service};

use crate::state::AuthConfig;

static NODE_TO_NODE_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/api/(v\d+/)?transactions/(trust|identity|title|event)$|^/api/v1/gossip/domains$").unwrap());

pub fn is_node_to_node_path(path: &str) -> bool {
    NODE_TO_NODE_PATH.is_match(path)
}

#[derive(Clone)]
pub struct AuthLayer {
    config: Arc<AuthConfig>,
}

impl AuthLayer {
    pub fn new(config: AuthConfig) -> Self {
        Self { config: Arc::new(config) }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService { inner, config: Arc::clone(&self.config) }
    }
}

#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    config: Arc<AuthConfig>,
}

impl<S> Service<Request<Body>> for AuthService<S>
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
        let config = Arc::clone(&self.config);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let path = req.uri().path().to_string();
            if !config.required || !is_node_to_node_path(&path) {
                return inner.call(req).await;
            }

            let method = req.method().as_str().to_string();
            let (parts, body) = req.into_parts();
            let sig = parts.headers.get("x-node-signature").and_then(|v| v.to_str().ok()).map(str::to_string);
            let ts = parts
                .headers
                .get("x-node-timestamp")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<i64>().ok());

            let bytes = match axum::body::to_bytes(body, usize::MAX).await {
                Ok(b) => b,
                Err(_) => return Ok(unauthorized_response("could not read request body")),
            };

            let (Some(sig), Some(ts), Some(secret)) = (sig, ts, config.secret.as_ref()) else {
                return Ok(unauthorized_response("missing node signature headers"));
            };

            let now = tgraph_core::now_unix();
            if tgraph_crypto::verify_request(secret, &method, &path, ts, &bytes, &sig, now).is_err() {
                return Ok(unauthorized_response("invalid node signature"));
            }

            let req = Request::from_parts(parts, Body::from(bytes));
            inner.call(req).await
        })
    }
}

fn unauthorized_response(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, axum::Json(json!({ "error": message }))).into_response()
}
