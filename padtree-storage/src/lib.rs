//! Padtree Storage - Store Trait, Backends, and TTL Cache
//!
//! Defines the durable storage abstraction for pads plus two
//! implementations: an ordered in-memory store (the reference
//! implementation and test double) and an LMDB-backed store for
//! production. The read-through TTL cache and its background sweeper
//! also live here.
//!
//! The store is deliberately an opaque ordered key/value collaborator:
//! callers only see `get`, `upsert`, `delete_subtree`, and
//! `list_children`, all keyed by normalized paths.

pub mod cache;
pub mod lmdb;
pub mod memory;

pub use cache::{spawn_sweeper, sweeper_task, CacheConfig, CacheStats, PadCache, SweeperHandle};
pub use lmdb::LmdbPadStore;
pub use memory::MemoryPadStore;

use async_trait::async_trait;
use padtree_core::{ChildEntry, Pad, StoreError};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Durable pad storage.
///
/// Implementations are keyed by normalized path and must preserve
/// ascending lexicographic order for listings. A missing record is not an
/// error: `get` returns `None` and the caller substitutes the implicit
/// pad.
#[async_trait]
pub trait PadStore: Send + Sync {
    /// Fetch the materialized record at `path`, if any.
    async fn get(&self, path: &str) -> StoreResult<Option<Pad>>;

    /// Insert or update the pad at `path`.
    ///
    /// Assigns `updated_at` (and `created_at` on first write). Parent
    /// records are never required to exist.
    async fn upsert(&self, path: &str, content: &str) -> StoreResult<Pad>;

    /// Remove `path` and every strict descendant in one atomic operation.
    ///
    /// Returns the number of records removed; 0 means nothing existed,
    /// which is success (delete is idempotent). An empty path removes
    /// every record.
    async fn delete_subtree(&self, path: &str) -> StoreResult<u64>;

    /// All records whose derived parent equals `parent`, excluding
    /// `parent` itself, in ascending lexicographic order by path.
    async fn list_children(&self, parent: &str) -> StoreResult<Vec<ChildEntry>>;

    /// Verify the backend is reachable.
    async fn health_check(&self) -> StoreResult<()>;
}
