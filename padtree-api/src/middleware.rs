//! Axum Middleware
//!
//! Rate limiting keyed by client IP. Requests over the configured rate
//! receive 429 Too Many Requests with a `Retry-After` header. There is no
//! authentication layer: pads are world-readable and world-writable by
//! design.

use std::net::IpAddr;
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use governor::{clock::DefaultClock, Quota, RateLimiter};

use crate::config::ApiConfig;

/// Type alias for the rate limiter we use.
type DirectRateLimiter =
    RateLimiter<governor::state::NotKeyed, governor::state::InMemoryState, DefaultClock>;

/// State for rate limiting middleware.
#[derive(Clone)]
pub struct RateLimitState {
    config: Arc<ApiConfig>,
    /// Per-IP rate limiters - DashMap for lock-free concurrent access.
    limiters: Arc<DashMap<IpAddr, Arc<DirectRateLimiter>>>,
}

impl RateLimitState {
    /// Create new rate limit state from API configuration.
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config: Arc::new(config),
            limiters: Arc::new(DashMap::new()),
        }
    }

    /// Get or create a rate limiter for the given client IP.
    fn get_or_create_limiter(&self, ip: IpAddr) -> Arc<DirectRateLimiter> {
        let limiter = self.limiters.entry(ip).or_insert_with(|| {
            let quota = Quota::per_minute(
                NonZeroU32::new(self.config.rate_limit_per_minute).unwrap_or(NonZeroU32::MIN),
            )
            .allow_burst(
                NonZeroU32::new(self.config.rate_limit_burst).unwrap_or(NonZeroU32::MIN),
            );
            Arc::new(RateLimiter::direct(quota))
        });
        limiter.clone()
    }
}

/// Error type for rate limit middleware.
pub struct RateLimitError {
    /// Seconds until the rate limit resets.
    pub retry_after: u64,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let error = crate::error::ApiError::too_many_requests(Some(self.retry_after));
        let mut response = (StatusCode::TOO_MANY_REQUESTS, axum::Json(error)).into_response();
        response.headers_mut().insert(
            HeaderName::from_static("retry-after"),
            HeaderValue::from_str(&self.retry_after.to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("60")),
        );
        response
    }
}

/// Extract client IP from request, considering proxy headers.
fn extract_client_ip(request: &Request, fallback: std::net::SocketAddr) -> IpAddr {
    // X-Forwarded-For can contain multiple IPs; the first is the client.
    if let Some(forwarded_for) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
    {
        if let Some(first_ip) = forwarded_for.split(',').next() {
            if let Ok(ip) = first_ip.trim().parse() {
                return ip;
            }
        }
    }

    if let Some(real_ip) = request
        .headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
    {
        if let Ok(ip) = real_ip.trim().parse() {
            return ip;
        }
    }

    fallback.ip()
}

/// Rate limiting middleware.
///
/// Enforces the per-IP request budget from [`ApiConfig`]; disabled
/// configurations pass every request through untouched.
pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    ConnectInfo(addr): ConnectInfo<std::net::SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    if !state.config.rate_limit_enabled {
        return Ok(next.run(request).await);
    }

    let ip = extract_client_ip(&request, addr);
    let limiter = state.get_or_create_limiter(ip);

    match limiter.check() {
        Ok(_) => {
            let mut response = next.run(request).await;
            response.headers_mut().insert(
                HeaderName::from_static("x-ratelimit-limit"),
                HeaderValue::from_str(&state.config.rate_limit_per_minute.to_string())
                    .unwrap_or_else(|_| HeaderValue::from_static("100")),
            );
            Ok(response)
        }
        Err(not_until) => {
            let retry_after = not_until
                .wait_time_from(governor::clock::Clock::now(&DefaultClock::default()))
                .as_secs()
                .max(1);
            Err(RateLimitError { retry_after })
        }
    }
}
