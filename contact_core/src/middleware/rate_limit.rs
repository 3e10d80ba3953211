//! Per-IP sliding-window throttle for contact submissions

use crate::config::RateLimitConfig;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

#[derive(Clone)]
pub struct RateLimiter {
    requests: Arc<Mutex<HashMap<IpAddr, Vec<Instant>>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            requests: Arc::new(Mutex::new(HashMap::new())),
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_seconds),
        }
    }

    pub fn check(&self, ip: IpAddr) -> Result<usize, RateLimitError> {
        self.check_at(ip, Instant::now())
    }

    fn check_at(&self, ip: IpAddr, now: Instant) -> Result<usize, RateLimitError> {
        let mut requests = self.requests.lock();

        let entries = requests.entry(ip).or_default();
        entries.retain(|&instant| now.duration_since(instant) < self.window);

        if entries.len() >= self.max_requests {
            let oldest = entries.first().copied().unwrap_or(now);
            let reset_in = self.window.saturating_sub(now.duration_since(oldest));

            return Err(RateLimitError {
                retry_after_seconds: reset_in.as_secs().max(1),
                limit: self.max_requests,
            });
        }

        entries.push(now);

        Ok(self.max_requests - entries.len())
    }

    /// Drops addresses whose window has fully elapsed.
    pub fn prune(&self) {
        let now = Instant::now();
        self.requests.lock().retain(|_, entries| {
            entries.retain(|&instant| now.duration_since(instant) < self.window);
            !entries.is_empty()
        });
    }
}

#[derive(Debug)]
pub struct RateLimitError {
    pub retry_after_seconds: u64,
    pub limit: usize,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": format!(
                "Too many messages. Please retry after {} seconds",
                self.retry_after_seconds
            ),
            "status": StatusCode::TOO_MANY_REQUESTS.as_u16(),
            "retry_after": self.retry_after_seconds,
        }));

        let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();

        response
            .headers_mut()
            .insert("X-RateLimit-Limit", HeaderValue::from(self.limit));
        response
            .headers_mut()
            .insert("X-RateLimit-Remaining", HeaderValue::from(0u32));
        response
            .headers_mut()
            .insert("Retry-After", HeaderValue::from(self.retry_after_seconds));

        response
    }
}

/// Only POSTs count against the limit so preflights never get throttled.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    if request.method() != Method::POST {
        return Ok(next.run(request).await);
    }

    let ip = client_ip(&request);
    let remaining = limiter.check(ip).inspect_err(|err| {
        warn!(%ip, retry_after = err.retry_after_seconds, "contact submission throttled");
    })?;

    let mut response = next.run(request).await;

    response
        .headers_mut()
        .insert("X-RateLimit-Limit", HeaderValue::from(limiter.max_requests));
    response
        .headers_mut()
        .insert("X-RateLimit-Remaining", HeaderValue::from(remaining));

    Ok(response)
}

/// Peer address from the connection, or the first `X-Forwarded-For` hop when
/// the server runs behind a proxy. Requests with neither share one bucket.
pub fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .or_else(|| forwarded_for(request.headers()))
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

pub fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|first| first.trim().parse().ok())
}
