//! Padtree API - HTTP/SSE Layer
//!
//! This crate provides the HTTP surface of the padtree pad server: REST
//! endpoints for pad content and child listings, Server-Sent Event
//! streams for live updates, and the write coordinator tying the durable
//! store, the TTL cache, and the topic broadcaster together.

pub mod broadcast;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod service;
pub mod telemetry;

// Re-export commonly used types
pub use broadcast::{BroadcastStats, BroadcasterConfig, PadBroadcaster, Subscription};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_api_router;
pub use service::PadService;
