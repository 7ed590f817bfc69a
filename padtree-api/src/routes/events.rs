//! Live Event Streaming Routes
//!
//! SSE endpoint for watching a pad. Each connection registers one
//! bounded-queue subscription on the pad's topic; the serving loop drains
//! exactly one source per iteration - the next queued event or the
//! keepalive timer - and ends permanently when the queue closes or the
//! client disconnects (which drops the subscription and releases its
//! slot).
//!
//! Keepalives are SSE comment frames, invisible to conformant consumers,
//! emitted only when no real event arrived within the interval so
//! intermediaries do not tear down an idle stream.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, Sse},
    routing::get,
    Router,
};
use futures_util::Stream;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::error::ApiResult;
use crate::service::PadService;

use super::pad::{resolve_path, ActorQuery};

// ============================================================================
// SHARED STATE
// ============================================================================

/// Shared state for event-stream routes.
#[derive(Clone)]
pub struct EventsState {
    pub service: Arc<PadService>,
    pub keepalive: Duration,
}

impl EventsState {
    pub fn new(service: Arc<PadService>, keepalive: Duration) -> Self {
        Self { service, keepalive }
    }
}

// ============================================================================
// HANDLER
// ============================================================================

/// GET /api/pads/events[/*path] - Subscribe to a pad's live updates.
///
/// Returns 429 when the pad already has the maximum number of viewers.
pub async fn subscribe_events(
    State(state): State<Arc<EventsState>>,
    path: Option<Path<String>>,
    Query(actor): Query<ActorQuery>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let topic = resolve_path(path)?;
    let mut subscription = state.service.subscribe(&topic)?;

    tracing::info!(
        topic = %topic,
        subscriber = %subscription.subscriber_id(),
        actor = actor.id(),
        "Event stream opened"
    );

    let keepalive = state.keepalive;
    let stream = stream! {
        let mut ticker = interval_at(Instant::now() + keepalive, keepalive);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                maybe_event = subscription.recv() => match maybe_event {
                    Some(event) => {
                        // Real traffic restarts the keepalive window.
                        ticker.reset();
                        match Event::default().json_data(&event) {
                            Ok(frame) => yield Ok::<Event, Infallible>(frame),
                            Err(error) => {
                                tracing::error!(%error, "Failed to serialize event");
                            }
                        }
                    }
                    None => break,
                },

                _ = ticker.tick() => {
                    yield Ok(Event::default().comment("keepalive"));
                }
            }
        }

        tracing::info!(
            topic = %subscription.topic(),
            subscriber = %subscription.subscriber_id(),
            "Event stream closed"
        );
    };

    Ok(Sse::new(stream))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router(state: Arc<EventsState>) -> Router {
    Router::new()
        .route("/events", get(subscribe_events))
        .route("/events/*path", get(subscribe_events))
        .with_state(state)
}
