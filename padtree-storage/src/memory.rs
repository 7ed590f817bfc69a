//! In-memory pad store.
//!
//! An ordered `BTreeMap` behind an `RwLock`. This is the reference
//! implementation of [`PadStore`] and the backend used throughout the
//! test suites; the LMDB store mirrors its semantics.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use padtree_core::{is_in_subtree, parent_path, ChildEntry, Pad, StoreError};

use crate::{PadStore, StoreResult};

#[derive(Debug, Clone)]
struct PadRecord {
    content: String,
    updated_at: i64,
    created_at: i64,
}

/// Ordered in-memory implementation of [`PadStore`].
#[derive(Debug, Default)]
pub struct MemoryPadStore {
    pads: RwLock<BTreeMap<String, PadRecord>>,
}

impl MemoryPadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of materialized records.
    pub fn len(&self) -> usize {
        self.pads.read().map(|pads| pads.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record_to_pad(path: &str, record: &PadRecord) -> Pad {
        Pad {
            path: path.to_string(),
            content: record.content.clone(),
            updated_at: record.updated_at,
            created_at: record.created_at,
        }
    }
}

#[async_trait]
impl PadStore for MemoryPadStore {
    async fn get(&self, path: &str) -> StoreResult<Option<Pad>> {
        let pads = self.pads.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(pads
            .get(path)
            .map(|record| Self::record_to_pad(path, record)))
    }

    async fn upsert(&self, path: &str, content: &str) -> StoreResult<Pad> {
        let now = Utc::now().timestamp();
        let mut pads = self.pads.write().map_err(|_| StoreError::LockPoisoned)?;

        let record = pads
            .entry(path.to_string())
            .and_modify(|record| {
                record.content = content.to_string();
                record.updated_at = now;
            })
            .or_insert_with(|| PadRecord {
                content: content.to_string(),
                updated_at: now,
                created_at: now,
            });

        Ok(Self::record_to_pad(path, record))
    }

    async fn delete_subtree(&self, path: &str) -> StoreResult<u64> {
        let mut pads = self.pads.write().map_err(|_| StoreError::LockPoisoned)?;
        let before = pads.len();
        if path.is_empty() {
            pads.clear();
        } else {
            pads.retain(|key, _| !is_in_subtree(path, key));
        }
        Ok((before - pads.len()) as u64)
    }

    async fn list_children(&self, parent: &str) -> StoreResult<Vec<ChildEntry>> {
        let pads = self.pads.read().map_err(|_| StoreError::LockPoisoned)?;

        // BTreeMap iteration order is the required lexicographic order.
        let children = pads
            .iter()
            .filter(|(key, _)| key.as_str() != parent && parent_path(key) == parent)
            .map(|(key, record)| ChildEntry {
                path: key.clone(),
                updated_at: record.updated_at,
            })
            .collect();

        Ok(children)
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.pads
            .read()
            .map(|_| ())
            .map_err(|_| StoreError::LockPoisoned)
    }
}
