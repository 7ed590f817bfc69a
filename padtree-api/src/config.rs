//! API Configuration Module
//!
//! Configuration is loaded from environment variables with sensible
//! defaults for development. Every knob the core consumes (cache TTL,
//! subscriber caps, keepalive interval) lives here.

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{ApiError, ApiResult};

/// Server and core configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address (default `0.0.0.0`).
    pub bind: String,
    /// Listen port (default `8080`).
    pub port: u16,

    /// Directory holding the LMDB environment.
    pub data_dir: String,
    /// LMDB map size in megabytes.
    pub db_map_size_mb: usize,

    /// TTL for cached pads.
    pub cache_ttl: Duration,
    /// Cadence of the background cache sweep.
    pub cache_sweep_interval: Duration,

    /// Maximum live subscribers per pad topic.
    pub sse_max_subscribers: usize,
    /// Bounded queue slots per subscriber.
    pub sse_queue_capacity: usize,
    /// Keepalive comment interval for idle event streams.
    pub sse_keepalive: Duration,

    /// Maximum accepted pad body size in bytes.
    pub max_content_bytes: usize,

    /// Whether rate limiting is enabled.
    pub rate_limit_enabled: bool,
    /// Requests per minute per client IP.
    pub rate_limit_per_minute: u32,
    /// Burst capacity beyond the steady rate.
    pub rate_limit_burst: u32,

    /// Allowed CORS origins (empty = allow all, dev mode).
    pub cors_origins: Vec<String>,

    /// Default tracing filter directive (overridden by `PADTREE_LOG`).
    pub log_filter: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            data_dir: "./data".to_string(),
            db_map_size_mb: 512,
            cache_ttl: Duration::from_secs(300),
            cache_sweep_interval: Duration::from_secs(60),
            sse_max_subscribers: 50,
            sse_queue_capacity: 16,
            sse_keepalive: Duration::from_secs(30),
            max_content_bytes: 1_048_576, // 1 MiB
            rate_limit_enabled: true,
            rate_limit_per_minute: 100,
            rate_limit_burst: 10,
            cors_origins: Vec::new(),
            log_filter: "info".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables (all optional):
    /// - `PADTREE_BIND`, `PADTREE_PORT`
    /// - `PADTREE_DATA_DIR`, `PADTREE_DB_MAP_SIZE_MB`
    /// - `PADTREE_CACHE_TTL_SECS`, `PADTREE_CACHE_SWEEP_INTERVAL_SECS`
    /// - `PADTREE_SSE_MAX_SUBSCRIBERS`, `PADTREE_SSE_QUEUE_CAPACITY`,
    ///   `PADTREE_SSE_KEEPALIVE_SECS`
    /// - `PADTREE_MAX_CONTENT_BYTES`
    /// - `PADTREE_RATE_LIMIT_ENABLED`, `PADTREE_RATE_LIMIT_PER_MINUTE`,
    ///   `PADTREE_RATE_LIMIT_BURST`
    /// - `PADTREE_CORS_ORIGINS` (comma-separated; empty = allow all)
    /// - `PADTREE_LOG`
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            bind: env_or("PADTREE_BIND", defaults.bind),
            port: env_parsed("PADTREE_PORT", defaults.port),
            data_dir: env_or("PADTREE_DATA_DIR", defaults.data_dir),
            db_map_size_mb: env_parsed("PADTREE_DB_MAP_SIZE_MB", defaults.db_map_size_mb),
            cache_ttl: Duration::from_secs(env_parsed(
                "PADTREE_CACHE_TTL_SECS",
                defaults.cache_ttl.as_secs(),
            )),
            cache_sweep_interval: Duration::from_secs(env_parsed(
                "PADTREE_CACHE_SWEEP_INTERVAL_SECS",
                defaults.cache_sweep_interval.as_secs(),
            )),
            sse_max_subscribers: env_parsed(
                "PADTREE_SSE_MAX_SUBSCRIBERS",
                defaults.sse_max_subscribers,
            ),
            sse_queue_capacity: env_parsed(
                "PADTREE_SSE_QUEUE_CAPACITY",
                defaults.sse_queue_capacity,
            ),
            sse_keepalive: Duration::from_secs(env_parsed(
                "PADTREE_SSE_KEEPALIVE_SECS",
                defaults.sse_keepalive.as_secs(),
            )),
            max_content_bytes: env_parsed("PADTREE_MAX_CONTENT_BYTES", defaults.max_content_bytes),
            rate_limit_enabled: std::env::var("PADTREE_RATE_LIMIT_ENABLED")
                .ok()
                .map(|s| s.to_lowercase() != "false")
                .unwrap_or(defaults.rate_limit_enabled),
            rate_limit_per_minute: env_parsed(
                "PADTREE_RATE_LIMIT_PER_MINUTE",
                defaults.rate_limit_per_minute,
            ),
            rate_limit_burst: env_parsed("PADTREE_RATE_LIMIT_BURST", defaults.rate_limit_burst),
            cors_origins: std::env::var("PADTREE_CORS_ORIGINS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            log_filter: env_or("PADTREE_LOG", defaults.log_filter),
        }
    }

    /// The socket address to bind.
    pub fn socket_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
