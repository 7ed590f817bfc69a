//! Router-level smoke tests.
//!
//! Exercise the assembled application router end to end against the
//! in-memory store: content CRUD, child listings, validation failures,
//! payload limits, health checks, and the subscriber cap on the event
//! stream endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt; // for `oneshot`

use padtree_api::{
    broadcast::BroadcasterConfig, create_api_router, ApiConfig, PadBroadcaster, PadService,
};
use padtree_core::Pad;
use padtree_storage::{CacheConfig, MemoryPadStore, PadCache, PadStore};

fn test_config() -> ApiConfig {
    ApiConfig {
        // Rate limiting is covered by its own unit tests; keep it out of
        // the smoke tests so request counts never matter here.
        rate_limit_enabled: false,
        max_content_bytes: 1024,
        sse_max_subscribers: 1,
        ..ApiConfig::default()
    }
}

fn test_app() -> (Router, Arc<PadService>) {
    let config = test_config();
    let store: Arc<dyn PadStore> = Arc::new(MemoryPadStore::new());
    let cache = Arc::new(PadCache::new(CacheConfig::default()));
    let broadcaster = Arc::new(PadBroadcaster::new(BroadcasterConfig {
        max_subscribers_per_topic: config.sse_max_subscribers,
        queue_capacity: config.sse_queue_capacity,
    }));
    let service = Arc::new(PadService::new(store.clone(), cache, broadcaster));

    let app = create_api_router(service.clone(), store, &config)
        .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));
    (app, service)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

async fn put(app: &Router, uri: &str, content: &str) -> StatusCode {
    let body = serde_json::json!({ "content": content }).to_string();
    let response = app
        .clone()
        .oneshot(
            Request::put(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    response.status()
}

async fn delete(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::delete(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health_endpoints() {
    let (app, _) = test_app();

    let response = app
        .clone()
        .oneshot(Request::get("/health/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = get(&app, "/health/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_read_before_write_returns_implicit_pad() {
    let (app, _) = test_app();

    let (status, body) = get(&app, "/api/pads/content/never/written").await;
    assert_eq!(status, StatusCode::OK);

    let pad: Pad = serde_json::from_value(body).unwrap();
    assert_eq!(pad.path, "never/written");
    assert_eq!(pad.content, "");
    assert_eq!(pad.updated_at, 0);
}

#[tokio::test]
async fn test_write_then_read_last_write_wins() {
    let (app, _) = test_app();

    assert_eq!(put(&app, "/api/pads/content/a/b", "x").await, StatusCode::OK);
    let (_, body) = get(&app, "/api/pads/content/a/b").await;
    assert_eq!(body["content"], "x");

    assert_eq!(put(&app, "/api/pads/content/a/b", "y").await, StatusCode::OK);
    let (_, body) = get(&app, "/api/pads/content/a/b").await;
    assert_eq!(body["content"], "y");
}

#[tokio::test]
async fn test_delete_subtree_counts_and_is_idempotent() {
    let (app, _) = test_app();

    put(&app, "/api/pads/content/a", "1").await;
    put(&app, "/api/pads/content/a/b", "2").await;
    put(&app, "/api/pads/content/a/b/c", "3").await;

    let (status, body) = delete(&app, "/api/pads/content/a").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 3);

    let (_, body) = get(&app, "/api/pads/content/a/b").await;
    assert_eq!(body["content"], "");

    let (_, body) = delete(&app, "/api/pads/content/a").await;
    assert_eq!(body["deleted"], 0);
}

#[tokio::test]
async fn test_children_listing_is_direct_and_ordered() {
    let (app, _) = test_app();

    put(&app, "/api/pads/content/a/c", "").await;
    put(&app, "/api/pads/content/a/b", "").await;
    put(&app, "/api/pads/content/a/b/d", "").await;

    let (status, body) = get(&app, "/api/pads/children/a").await;
    assert_eq!(status, StatusCode::OK);

    let paths: Vec<&str> = body["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|child| child["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["a/b", "a/c"]);
}

#[tokio::test]
async fn test_invalid_path_is_rejected() {
    let (app, _) = test_app();

    let (status, body) = get(&app, "/api/pads/content/bad!segment").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PATH");

    let (status, _) = get(&app, "/api/pads/content/api/reserved").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_content_is_rejected() {
    let (app, _) = test_app();

    let big = "z".repeat(2048);
    let status = put(&app, "/api/pads/content/big", &big).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_event_stream_opens_and_enforces_capacity() {
    let (app, service) = test_app();

    // First viewer occupies the single configured slot.
    let _viewer = service.subscribe("watched").unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/pads/events/watched")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // A different pad still has room; the stream opens without draining it.
    let response = app
        .clone()
        .oneshot(
            Request::get("/api/pads/events/other")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("text/event-stream")
    );
}

#[tokio::test]
async fn test_write_notifies_live_subscriber() {
    let (app, service) = test_app();

    let mut subscription = service.subscribe("watched/pad").unwrap();
    put(&app, "/api/pads/content/watched/pad?actor=me", "hello").await;

    let event = subscription.recv().await.unwrap();
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "update");
    assert_eq!(json["content"], "hello");
    assert_eq!(json["actor_id"], "me");
}
