//! Pad Service - the write coordinator.
//!
//! Thin orchestration over the store, cache, and broadcaster. The
//! ordering store → cache → broadcast is an invariant: a change is never
//! announced before it is durable and cache-consistent. Cache and
//! broadcast steps are best-effort and cannot roll back a completed
//! store write.

use std::sync::Arc;

use padtree_core::{parent_path, ChildEntry, Pad, PadEvent, SubscribeError};
use padtree_storage::{PadCache, PadStore};

use crate::broadcast::{PadBroadcaster, Subscription};
use crate::error::ApiResult;

/// Coordinates every pad operation exposed to the request layer.
#[derive(Clone)]
pub struct PadService {
    store: Arc<dyn PadStore>,
    cache: Arc<PadCache>,
    broadcaster: Arc<PadBroadcaster>,
}

impl PadService {
    pub fn new(
        store: Arc<dyn PadStore>,
        cache: Arc<PadCache>,
        broadcaster: Arc<PadBroadcaster>,
    ) -> Self {
        Self {
            store,
            cache,
            broadcaster,
        }
    }

    pub fn store(&self) -> &Arc<dyn PadStore> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<PadCache> {
        &self.cache
    }

    pub fn broadcaster(&self) -> &Arc<PadBroadcaster> {
        &self.broadcaster
    }

    /// Read the pad at `path`, populating the cache on a miss.
    ///
    /// Every syntactically valid path is a valid read target: a path with
    /// no materialized record yields the implicit empty pad.
    pub async fn read(&self, path: &str) -> ApiResult<Pad> {
        if let Some(pad) = self.cache.get(path) {
            return Ok(pad);
        }

        let pad = self
            .store
            .get(path)
            .await?
            .unwrap_or_else(|| Pad::implicit(path));
        self.cache.set(path, pad.clone());
        Ok(pad)
    }

    /// Write `content` to the pad at `path`.
    ///
    /// Upserts the store record (parents never need to pre-exist), makes
    /// the cache consistent, then announces the update on the pad's topic
    /// and a `ChildrenChanged` on its parent's topic.
    pub async fn write(&self, path: &str, content: &str, actor_id: &str) -> ApiResult<Pad> {
        let pad = self.store.upsert(path, content).await?;

        self.cache.invalidate(path);
        self.cache.set(path, pad.clone());

        self.broadcaster.publish(
            path,
            &PadEvent::Update {
                content: content.to_string(),
                actor_id: actor_id.to_string(),
            },
        );
        self.broadcaster.publish(
            parent_path(path),
            &PadEvent::ChildrenChanged {
                actor_id: actor_id.to_string(),
            },
        );

        Ok(pad)
    }

    /// Delete the pad at `path` and every strict descendant.
    ///
    /// Returns the number of records removed; 0 when nothing existed
    /// (delete is idempotent, never an error). Watchers of the deleted
    /// pad and of every active descendant topic receive the `Delete`
    /// event; the parent's watchers get `ChildrenChanged`.
    pub async fn delete(&self, path: &str, actor_id: &str) -> ApiResult<u64> {
        let deleted = self.store.delete_subtree(path).await?;

        self.cache.invalidate_prefix(path);

        self.broadcaster.publish_subtree(
            path,
            &PadEvent::Delete {
                path: path.to_string(),
                actor_id: actor_id.to_string(),
            },
        );
        self.broadcaster.publish(
            parent_path(path),
            &PadEvent::ChildrenChanged {
                actor_id: actor_id.to_string(),
            },
        );

        Ok(deleted)
    }

    /// Direct, materialized children of `path` in ascending lexicographic
    /// order.
    pub async fn list_children(&self, path: &str) -> ApiResult<Vec<ChildEntry>> {
        Ok(self.store.list_children(path).await?)
    }

    /// Register a live subscriber on the topic for `path`.
    pub fn subscribe(&self, path: &str) -> Result<Subscription, SubscribeError> {
        self.broadcaster.subscribe(path)
    }
}
