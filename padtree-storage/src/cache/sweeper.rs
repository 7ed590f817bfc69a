//! Background sweep task for the pad cache.
//!
//! Runs on a fixed interval independent of request traffic, so entries
//! that are read once and never touched again still get purged. The task
//! is owned through a [`SweeperHandle`]: started explicitly by whoever
//! constructs the cache and stopped deterministically at teardown, never
//! a detached unmanaged loop.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::ttl::PadCache;

/// Handle to a running sweeper task.
pub struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<u64>,
}

impl SweeperHandle {
    /// Signal shutdown and wait for the task to finish.
    ///
    /// Returns the total number of entries purged over the task's
    /// lifetime.
    pub async fn shutdown(self) -> u64 {
        let _ = self.shutdown_tx.send(true);
        self.handle.await.unwrap_or(0)
    }
}

/// Spawn the sweep loop for `cache` on the current runtime.
pub fn spawn_sweeper(cache: Arc<PadCache>) -> SweeperHandle {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(sweeper_task(cache, shutdown_rx));
    SweeperHandle {
        shutdown_tx,
        handle,
    }
}

/// Periodically purge expired cache entries until shutdown is signalled.
///
/// Returns the total number of entries purged.
pub async fn sweeper_task(cache: Arc<PadCache>, mut shutdown_rx: watch::Receiver<bool>) -> u64 {
    let mut tick = interval(cache.config().sweep_interval);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::debug!(
        interval_secs = cache.config().sweep_interval.as_secs(),
        "Cache sweeper started"
    );

    let mut total_purged = 0u64;
    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                // A dropped sender counts as shutdown.
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }

            _ = tick.tick() => {
                let purged = cache.sweep();
                total_purged += purged as u64;
                if purged > 0 {
                    tracing::debug!(purged, "Cache sweep purged expired entries");
                }
            }
        }
    }

    tracing::debug!(total_purged, "Cache sweeper stopped");
    total_purged
}
