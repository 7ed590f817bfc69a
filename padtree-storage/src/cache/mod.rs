//! Read-through TTL cache for pads.
//!
//! The cache is purely an optimization: it must never be the source of
//! truth, and losing every entry at any moment changes nothing about the
//! store's authoritative state. Entries expire lazily on lookup and are
//! purged by the background sweeper.

mod sweeper;
mod ttl;

pub use sweeper::{spawn_sweeper, sweeper_task, SweeperHandle};
pub use ttl::{CacheConfig, CacheStats, PadCache};
