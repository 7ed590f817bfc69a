//! Tracing initialization.
//!
//! Call once at startup before any tracing occurs. The filter directive
//! comes from configuration (itself fed by `PADTREE_LOG`).

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global tracing subscriber.
pub fn init_tracing(filter_directive: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::new(filter_directive))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
