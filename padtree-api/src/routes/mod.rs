//! REST API Routes Module
//!
//! Router assembly for the pad server:
//! - Pad content CRUD and child listings
//! - SSE event streams
//! - Health check endpoints
//! - CORS, request tracing, rate limiting, and body-size limits

pub mod events;
pub mod health;
pub mod pad;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, header::HeaderName, HeaderValue, Method},
    middleware::from_fn_with_state,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use padtree_storage::PadStore;

use crate::config::ApiConfig;
use crate::middleware::{rate_limit_middleware, RateLimitState};
use crate::service::PadService;

/// Per-request deadline for the non-streaming routes. Event streams are
/// long-lived and exempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Build the complete application router.
///
/// # Middleware Order (outer to inner)
/// 1. CORS (outermost) - handles preflight requests
/// 2. Request tracing
/// 3. Rate limiting - rejects floods before any work
/// 4. Body size limit - bounds pad payloads
pub fn create_api_router(
    service: Arc<PadService>,
    store: Arc<dyn PadStore>,
    config: &ApiConfig,
) -> Router {
    let pad_state = Arc::new(pad::PadState::new(
        service.clone(),
        config.max_content_bytes,
    ));
    let events_state = Arc::new(events::EventsState::new(service, config.sse_keepalive));

    let pads = pad::create_router(pad_state)
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .merge(events::create_router(events_state));

    let rate_limit_state = RateLimitState::new(config.clone());
    let cors = build_cors_layer(config);

    Router::new()
        .nest("/api/pads", pads)
        .nest("/health", health::create_router(store))
        // The JSON envelope around pad content needs a little headroom.
        .layer(DefaultBodyLimit::max(config.max_content_bytes + 1024))
        .layer(from_fn_with_state(rate_limit_state, rate_limit_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// In development mode (empty origins), allows all origins.
/// In production mode, only allows configured origins.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .expose_headers([
            HeaderName::from_static("x-ratelimit-limit"),
            HeaderName::from_static("retry-after"),
        ]);

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: allowing all origins");
        cors.allow_origin(Any).allow_headers(Any)
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS: restricting origins");
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        cors.allow_origin(origins)
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
    }
}
