//! Per-IP token bucket rate limiter (spec §4.2).
//!
//! Rate = `requests_per_minute / 60` per second, burst = `requests_per_minute`.
//! Source IP: `X-Forwarded-For` (first hop) > `X-Real-IP` > connection remote.

use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use serde_json::json;
use tower::{Layer, Service};

type Bucket = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

struct Entry {
    bucket: Bucket,
    last_access: std::time::Instant,
}

pub struct RateLimitState {
    buckets: DashMap<IpAddr, Entry>,
    requests_per_minute: u32,
    rejections: prometheus::IntCounterVec,
}

impl RateLimitState {
    pub fn new(requests_per_minute: u32, rejections: prometheus::IntCounterVec) -> Self {
        Self { buckets: DashMap::new(), requests_per_minute, rejections }
    }

    fn quota(&self) -> Quota {
        let per_minute = NonZeroU32::new(self.requests_per_minute.max(1)).expect("checked max(1) above");
        Quota::per_minute(per_minute).allow_burst(per_minute)
    }

    fn check(&self, ip: IpAddr, path: &str) -> Result<(), ()> {
        let mut entry = self.buckets.entry(ip).or_insert_with(|| Entry {
            bucket: RateLimiter::direct(self.quota()),
            last_access: std::time::Instant::now(),
        });
        entry.last_access = std::time::Instant::now();
        match entry.bucket.check() {
            Ok(()) => Ok(()),
            Err(_) => {
                self.rejections.with_label_values(&[path]).inc();
                Err(())
            }
        }
    }

    pub fn cleanup(&self, max_age: std::time::Duration) {
        let now = std::time::Instant::now();
        self.buckets.retain(|_, e| now.duration_since(e.last_access) <= max_age);
    }
}

#[derive(Clone)]
pub struct RateLimitLayer {
    state: Arc<RateLimitState>,
}

impl RateLimitLayer {
    pub fn new(state: Arc<RateLimitState>) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitService { inner, state: Arc::clone(&self.state) }
    }
}

#[derive(Clone)]
pub struct RateLimitService<S> {
    inner: S,
    state: Arc<RateLimitState>,
}

impl<S> Service<Request<Body>> for RateLimitService<S>
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
        let state = Arc::clone(&self.state);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let ip = extract_client_ip(&req);
            let path = req.uri().path().to_string();
            let remaining = state.requests_per_minute;

            match state.check(ip, &path) {
                Ok(()) => {
                    let mut resp = inner.call(req).await?;
                    resp.headers_mut().insert(
                        "X-RateLimit-Remaining",
                        remaining.to_string().parse().expect("decimal string is a valid header value"),
                    );
                    Ok(resp)
                }
                Err(()) => Ok(rate_limited_response()),
            }
        })
    }
}

fn extract_client_ip<B>(req: &Request<B>) -> IpAddr {
    if let Some(forwarded) = req.headers().get("x-forwarded-for") {
        if let Ok(s) = forwarded.to_str() {
            if let Some(first) = s.split(',').next() {
                if let Ok(ip) = first.trim().parse::<IpAddr>() {
                    return ip;
                }
            }
        }
    }
    if let Some(real_ip) = req.headers().get("x-real-ip") {
        if let Ok(s) = real_ip.to_str() {
            if let Ok(ip) = s.parse::<IpAddr>() {
                return ip;
            }
        }
    }
    if let Some(connect_info) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return connect_info.0.ip();
    }
    IpAddr::from([127, 0, 0, 1])
}

fn rate_limited_response() -> Response {
    let body = json!({ "error": "rate limit exceeded" });
    let mut resp = (StatusCode::TOO_MANY_REQUESTS, axum::Json(body)).into_response();
    resp.headers_mut().insert("X-RateLimit-Remaining", "0".parse().expect("literal header value"));
    resp
}

pub async fn cleanup_task(state: Arc<RateLimitState>, interval: std::time::Duration, max_age: std::time::Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        state.cleanup(max_age);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(rpm: u32) -> RateLimitState {
        let counter = prometheus::IntCounterVec::new(
            prometheus::Opts::new("test_rate_limit_rejections", "test"),
            &["path"],
        )
        .unwrap();
        RateLimitState::new(rpm, counter)
    }

    #[test]
    fn allows_within_burst_then_denies() {
        let s = state(2);
        let ip = IpAddr::from([10, 0, 0, 1]);
        assert!(s.check(ip, "/api/health").is_ok());
        assert!(s.check(ip, "/api/health").is_ok());
        assert!(s.check(ip, "/api/health").is_err());
    }

    #[test]
    fn separate_ips_have_separate_buckets() {
        let s = state(1);
        assert!(s.check(IpAddr::from([10, 0, 0, 1]), "/x").is_ok());
        assert!(s.check(IpAddr::from([10, 0, 0, 2]), "/x").is_ok());
    }
}
