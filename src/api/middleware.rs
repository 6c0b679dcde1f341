//! API Middleware (Rate Limiting, Logging)

use axum::{
    extract::{Request, State},
    http::{header::RETRY_AFTER, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::types::{ApiError, ApiResponse};
use crate::models::RateLimitConfig;

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Seconds until the oldest request in the window expires
    pub reset_secs: u64,
}

/// Sliding-window rate limiter keyed by caller identity.
/// Owned by the router state; one instance per server.
pub struct RateLimiter {
    /// Request instants inside the current window, per caller
    requests: DashMap<String, VecDeque<Instant>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            requests: DashMap::new(),
            config,
        }
    }

    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    /// Check and record a request at `now`
    pub fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let window = self.config.window;
        let limit = self.config.max_requests;

        let mut entry = self.requests.entry(key.to_string()).or_default();
        while let Some(&oldest) = entry.front() {
            if now.saturating_duration_since(oldest) >= window {
                entry.pop_front();
            } else {
                break;
            }
        }

        let reset_secs = |entry: &VecDeque<Instant>| {
            entry
                .front()
                .map(|oldest| {
                    let remaining = window.saturating_sub(now.saturating_duration_since(*oldest));
                    // Round up so clients never retry a fraction too early
                    remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
                })
                .unwrap_or(0)
        };

        if entry.len() as u32 >= limit {
            return RateDecision {
                allowed: false,
                remaining: 0,
                reset_secs: reset_secs(&*entry).max(1),
            };
        }

        entry.push_back(now);
        RateDecision {
            allowed: true,
            remaining: limit.saturating_sub(entry.len() as u32),
            reset_secs: reset_secs(&*entry),
        }
    }

    /// Drop callers with no requests inside the window
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let window = self.config.window;
        let before = self.requests.len();
        self.requests.retain(|_, hits| {
            hits.back()
                .map(|last| now.saturating_duration_since(*last) < window)
                .unwrap_or(false)
        });
        before.saturating_sub(self.requests.len())
    }

    pub fn tracked_callers(&self) -> usize {
        self.requests.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

/// Periodically evict idle callers
pub fn start_cleanup_task(limiter: Arc<RateLimiter>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let removed = limiter.cleanup();
            if removed > 0 {
                debug!("🧹 Rate limiter cleanup: {} idle callers removed", removed);
            }
        }
    })
}

/// API key, else forwarded IP, else "unknown"
pub fn caller_identity(headers: &HeaderMap) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(key) = header("x-api-key") {
        return format!("key:{}", key);
    }
    if let Some(forwarded) = header("x-forwarded-for") {
        // First hop is the client
        if let Some(ip) = forwarded.split(',').next().map(str::trim).filter(|s| !s.is_empty()) {
            return format!("ip:{}", ip);
        }
    }
    if let Some(ip) = header("x-real-ip") {
        return format!("ip:{}", ip);
    }
    "unknown".to_string()
}

fn is_health_path(path: &str) -> bool {
    matches!(path, "/" | "/health" | "/v1/health")
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    if is_health_path(request.uri().path()) {
        return next.run(request).await;
    }

    let caller = caller_identity(request.headers());
    let decision = limiter.check(&caller);

    if !decision.allowed {
        warn!(caller = %caller, "Rate limit exceeded");
        let body = ApiResponse::error(ApiError::rate_limited(decision.reset_secs), 0.0);
        let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(decision.reset_secs));
        return response;
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(decision.remaining));
    headers.insert("X-RateLimit-Reset", HeaderValue::from(decision.reset_secs));
    response
}

/// Request logging middleware
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        status = %status.as_u16(),
        latency_ms = %latency.as_millis(),
        "Request completed"
    );

    response
}
