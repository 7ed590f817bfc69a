//! Topic Event Broadcasting
//!
//! Fan-out of live pad updates to SSE subscribers. One topic per pad
//! path; a topic exists only while at least one subscriber is registered
//! and is removed the moment the last one cancels.
//!
//! ## Architecture
//!
//! - One bounded `mpsc` queue per subscriber (never shared)
//! - Delivery is `try_send`: a slow consumer loses its copy of an event,
//!   the publisher and every other subscriber proceed untouched
//! - Subscriptions clean up on drop, so a disconnecting client always
//!   releases its slot and closes its queue exactly once
//!
//! Reads of the topic table (publish, counts) take the read lock and run
//! concurrently; membership changes take the write lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use padtree_core::{is_in_subtree, PadEvent, SubscribeError};
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

/// Configuration for the broadcaster.
#[derive(Debug, Clone)]
pub struct BroadcasterConfig {
    /// Maximum live subscribers per topic.
    pub max_subscribers_per_topic: usize,
    /// Queue slots per subscriber.
    pub queue_capacity: usize,
}

impl Default for BroadcasterConfig {
    fn default() -> Self {
        Self {
            max_subscribers_per_topic: 50,
            queue_capacity: 16,
        }
    }
}

/// Statistics for broadcast operations.
#[derive(Debug, Clone, Default)]
pub struct BroadcastStats {
    /// Publish calls that found at least the topic table
    pub published: u64,
    /// Events actually enqueued to a subscriber
    pub delivered: u64,
    /// Events dropped because a subscriber's queue was full
    pub dropped: u64,
    /// Currently active topics
    pub topic_count: usize,
    /// Currently registered subscribers across all topics
    pub subscriber_count: usize,
}

type TopicTable = HashMap<String, HashMap<Uuid, mpsc::Sender<PadEvent>>>;

/// Per-topic event broadcaster with bounded subscriber queues.
#[derive(Debug)]
pub struct PadBroadcaster {
    topics: RwLock<TopicTable>,
    config: BroadcasterConfig,
    published: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl PadBroadcaster {
    pub fn new(config: BroadcasterConfig) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            config,
            published: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(BroadcasterConfig::default())
    }

    pub fn config(&self) -> &BroadcasterConfig {
        &self.config
    }

    // Nothing held under the lock can leave the table in a torn state, so
    // a poisoned lock is recoverable.
    fn read_topics(&self) -> RwLockReadGuard<'_, TopicTable> {
        self.topics.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_topics(&self) -> RwLockWriteGuard<'_, TopicTable> {
        self.topics.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a subscriber on `topic`.
    ///
    /// Creates the topic entry if absent. Fails with
    /// [`SubscribeError::CapacityExceeded`] when the topic already holds
    /// the configured maximum, protecting against runaway fan-out.
    ///
    /// Dropping (or [`Subscription::cancel`]-ing) the returned handle
    /// removes the subscriber, removes the topic entry if it was the last
    /// one, and closes the queue so a drain loop observes end-of-stream.
    pub fn subscribe(self: &Arc<Self>, topic: &str) -> Result<Subscription, SubscribeError> {
        let mut topics = self.write_topics();
        let subscribers = topics.entry(topic.to_string()).or_default();

        if subscribers.len() >= self.config.max_subscribers_per_topic {
            return Err(SubscribeError::CapacityExceeded {
                topic: topic.to_string(),
                limit: self.config.max_subscribers_per_topic,
            });
        }

        let subscriber_id = Uuid::now_v7();
        let (tx, rx) = mpsc::channel(self.config.queue_capacity);
        subscribers.insert(subscriber_id, tx);

        tracing::debug!(
            topic,
            subscriber = %subscriber_id,
            subscribers = subscribers.len(),
            "Subscriber registered"
        );

        Ok(Subscription {
            topic: topic.to_string(),
            subscriber_id,
            rx,
            broadcaster: Arc::clone(self),
        })
    }

    /// Remove one subscriber, dropping the topic entry when it empties.
    fn unsubscribe(&self, topic: &str, subscriber_id: Uuid) {
        let mut topics = self.write_topics();
        if let Some(subscribers) = topics.get_mut(topic) {
            if subscribers.remove(&subscriber_id).is_some() {
                tracing::debug!(
                    topic,
                    subscriber = %subscriber_id,
                    remaining = subscribers.len(),
                    "Subscriber removed"
                );
            }
            if subscribers.is_empty() {
                topics.remove(topic);
            }
        }
        // The sender just dropped out of the table was the queue's only
        // writer; the subscriber's drain loop now observes end-of-stream.
    }

    /// Deliver `event` to every subscriber of `topic`.
    ///
    /// Non-blocking per subscriber: a full queue drops that subscriber's
    /// copy (logged, counted) without stalling anyone else. An absent
    /// topic is a no-op, not an error. Returns how many queues accepted
    /// the event.
    pub fn publish(&self, topic: &str, event: &PadEvent) -> usize {
        let topics = self.read_topics();
        let Some(subscribers) = topics.get(topic) else {
            return 0;
        };
        self.deliver(topic, subscribers, event)
    }

    /// Deliver `event` to `prefix` and every active strict-descendant
    /// topic, so watchers of a deleted subtree all learn of the removal.
    pub fn publish_subtree(&self, prefix: &str, event: &PadEvent) -> usize {
        let topics = self.read_topics();
        let mut accepted = 0;
        for (topic, subscribers) in topics.iter() {
            if is_in_subtree(prefix, topic) {
                accepted += self.deliver(topic, subscribers, event);
            }
        }
        accepted
    }

    fn deliver(
        &self,
        topic: &str,
        subscribers: &HashMap<Uuid, mpsc::Sender<PadEvent>>,
        event: &PadEvent,
    ) -> usize {
        self.published.fetch_add(1, Ordering::Relaxed);

        let mut accepted = 0;
        for (subscriber_id, tx) in subscribers {
            match tx.try_send(event.clone()) {
                Ok(()) => accepted += 1,
                Err(TrySendError::Full(_)) => {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        topic,
                        subscriber = %subscriber_id,
                        event_type = event.event_type(),
                        "Dropped event for slow subscriber"
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    // Subscriber is tearing down; its drop handler removes
                    // the entry.
                }
            }
        }
        self.delivered.fetch_add(accepted as u64, Ordering::Relaxed);
        accepted
    }

    /// Number of active topics.
    pub fn topic_count(&self) -> usize {
        self.read_topics().len()
    }

    /// Number of live subscribers on `topic` (0 if absent).
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.read_topics()
            .get(topic)
            .map(|subscribers| subscribers.len())
            .unwrap_or(0)
    }

    pub fn stats(&self) -> BroadcastStats {
        let topics = self.read_topics();
        BroadcastStats {
            published: self.published.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            topic_count: topics.len(),
            subscriber_count: topics.values().map(|subscribers| subscribers.len()).sum(),
        }
    }
}

/// A live registration on one topic.
///
/// Owns the receiving half of the subscriber's queue. Dropping the
/// subscription (client disconnect) or calling [`Subscription::cancel`]
/// deterministically releases the slot.
#[derive(Debug)]
pub struct Subscription {
    topic: String,
    subscriber_id: Uuid,
    rx: mpsc::Receiver<PadEvent>,
    broadcaster: Arc<PadBroadcaster>,
}

impl Subscription {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn subscriber_id(&self) -> Uuid {
        self.subscriber_id
    }

    /// Next queued event; `None` once the queue is closed.
    pub async fn recv(&mut self) -> Option<PadEvent> {
        self.rx.recv().await
    }

    /// Non-blocking variant of [`Subscription::recv`].
    pub fn try_recv(&mut self) -> Option<PadEvent> {
        self.rx.try_recv().ok()
    }

    /// Explicitly end the subscription.
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.broadcaster.unsubscribe(&self.topic, self.subscriber_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(content: &str) -> PadEvent {
        PadEvent::Update {
            content: content.to_string(),
            actor_id: "tester".to_string(),
        }
    }

    fn small_broadcaster(max_subscribers: usize, queue_capacity: usize) -> Arc<PadBroadcaster> {
        Arc::new(PadBroadcaster::new(BroadcasterConfig {
            max_subscribers_per_topic: max_subscribers,
            queue_capacity,
        }))
    }

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let broadcaster = PadBroadcaster::with_defaults();
        let broadcaster = Arc::new(broadcaster);
        let mut sub = broadcaster.subscribe("a/b").unwrap();

        assert_eq!(broadcaster.publish("a/b", &update("hi")), 1);
        assert_eq!(sub.recv().await, Some(update("hi")));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let broadcaster = Arc::new(PadBroadcaster::with_defaults());
        assert_eq!(broadcaster.publish("ghost", &update("x")), 0);
        assert_eq!(broadcaster.topic_count(), 0);
    }

    #[tokio::test]
    async fn test_capacity_exceeded_then_retry_succeeds() {
        let broadcaster = small_broadcaster(2, 16);
        let _a = broadcaster.subscribe("pad").unwrap();
        let b = broadcaster.subscribe("pad").unwrap();

        let err = broadcaster.subscribe("pad").unwrap_err();
        assert_eq!(
            err,
            SubscribeError::CapacityExceeded {
                topic: "pad".to_string(),
                limit: 2,
            }
        );

        drop(b);
        assert!(broadcaster.subscribe("pad").is_ok());
    }

    #[tokio::test]
    async fn test_slow_subscriber_drops_without_blocking_others() {
        let broadcaster = small_broadcaster(10, 1);
        let mut slow = broadcaster.subscribe("pad").unwrap();
        let mut fast = broadcaster.subscribe("pad").unwrap();

        assert_eq!(broadcaster.publish("pad", &update("one")), 2);
        // Only the fast subscriber drains its queue.
        assert_eq!(fast.recv().await, Some(update("one")));

        // The slow queue is still full, so its copy is dropped; the fast
        // subscriber receives the event within the same call.
        assert_eq!(broadcaster.publish("pad", &update("two")), 1);
        assert_eq!(fast.recv().await, Some(update("two")));

        assert_eq!(slow.recv().await, Some(update("one")));
        assert_eq!(broadcaster.stats().dropped, 1);
    }

    #[tokio::test]
    async fn test_last_unsubscribe_removes_topic() {
        let broadcaster = small_broadcaster(10, 16);
        let a = broadcaster.subscribe("pad").unwrap();
        let b = broadcaster.subscribe("pad").unwrap();
        assert_eq!(broadcaster.topic_count(), 1);
        assert_eq!(broadcaster.subscriber_count("pad"), 2);

        drop(a);
        assert_eq!(broadcaster.topic_count(), 1);
        assert_eq!(broadcaster.subscriber_count("pad"), 1);

        b.cancel();
        assert_eq!(broadcaster.topic_count(), 0);
        assert_eq!(broadcaster.subscriber_count("pad"), 0);
    }

    #[tokio::test]
    async fn test_queue_closes_exactly_once_on_cancel() {
        let broadcaster = small_broadcaster(10, 16);
        let mut keeper = broadcaster.subscribe("pad").unwrap();
        broadcaster.publish("pad", &update("before"));

        // Simulate the serving loop ending: all senders for this queue
        // are dropped once the table entry goes away.
        broadcaster.unsubscribe("pad", keeper.subscriber_id());
        assert_eq!(keeper.recv().await, Some(update("before")));
        assert_eq!(keeper.recv().await, None);
    }

    #[tokio::test]
    async fn test_publish_subtree_is_segment_aligned() {
        let broadcaster = small_broadcaster(10, 16);
        let mut foo = broadcaster.subscribe("foo").unwrap();
        let mut child = broadcaster.subscribe("foo/x").unwrap();
        let mut lookalike = broadcaster.subscribe("foobar").unwrap();

        let event = PadEvent::Delete {
            path: "foo".to_string(),
            actor_id: "tester".to_string(),
        };
        assert_eq!(broadcaster.publish_subtree("foo", &event), 2);

        assert_eq!(foo.recv().await, Some(event.clone()));
        assert_eq!(child.recv().await, Some(event));
        assert!(lookalike.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_independent_topics_do_not_interfere() {
        let broadcaster = small_broadcaster(10, 16);
        let mut a = broadcaster.subscribe("a").unwrap();
        let mut b = broadcaster.subscribe("b").unwrap();

        broadcaster.publish("a", &update("for-a"));
        assert_eq!(a.recv().await, Some(update("for-a")));
        assert!(b.try_recv().is_none());
    }
}
