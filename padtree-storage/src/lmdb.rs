//! LMDB-backed pad store.
//!
//! Uses the heed crate (Rust bindings for LMDB) for a memory-mapped,
//! transactional key/value store. Keys are normalized path bytes, so LMDB
//! iteration order is exactly the ascending lexicographic order the
//! listings require; values are JSON-encoded records.
//!
//! Read transactions serve `get` and `list_children`; each mutation runs
//! in a single write transaction, which makes subtree deletion atomic.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use padtree_core::{is_in_subtree, parent_path, ChildEntry, Pad, StoreError};
use serde::{Deserialize, Serialize};

use crate::{PadStore, StoreResult};

/// On-disk record layout. The path lives in the key only.
#[derive(Debug, Serialize, Deserialize)]
struct StoredPad {
    content: String,
    updated_at: i64,
    created_at: i64,
}

/// LMDB-backed implementation of [`PadStore`].
pub struct LmdbPadStore {
    env: Env,
    db: Database<Bytes, Bytes>,
}

impl LmdbPadStore {
    /// Open (or create) the store under `dir`.
    ///
    /// `map_size_mb` bounds the database size; LMDB maps the whole region
    /// up front.
    pub fn open<P: AsRef<Path>>(dir: P, map_size_mb: usize) -> StoreResult<Self> {
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::Unavailable {
            reason: format!("create data directory: {}", e),
        })?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size_mb * 1024 * 1024)
                .max_dbs(1)
                .open(dir.as_ref())
        }
        .map_err(|e| StoreError::Unavailable {
            reason: format!("open LMDB environment: {}", e),
        })?;

        let mut wtxn = env.write_txn().map_err(txn_err)?;
        let db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| StoreError::Unavailable {
                reason: format!("open database: {}", e),
            })?;
        wtxn.commit().map_err(txn_err)?;

        Ok(Self { env, db })
    }

    fn decode(path: &str, bytes: &[u8]) -> StoreResult<Pad> {
        let record: StoredPad =
            serde_json::from_slice(bytes).map_err(|e| StoreError::Serialization {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Pad {
            path: path.to_string(),
            content: record.content,
            updated_at: record.updated_at,
            created_at: record.created_at,
        })
    }

    fn encode(path: &str, record: &StoredPad) -> StoreResult<Vec<u8>> {
        serde_json::to_vec(record).map_err(|e| StoreError::Serialization {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// Collect every key in the subtree rooted at `path`.
    fn collect_subtree_keys(&self, rtxn: &heed::RoTxn<'_>, path: &str) -> StoreResult<Vec<Vec<u8>>> {
        let mut keys = Vec::new();
        let iter = self.db.iter(rtxn).map_err(txn_err)?;
        for result in iter {
            let (key, _) = result.map_err(txn_err)?;
            if let Ok(key_str) = std::str::from_utf8(key) {
                if is_in_subtree(path, key_str) {
                    keys.push(key.to_vec());
                }
            }
        }
        Ok(keys)
    }
}

fn txn_err(e: heed::Error) -> StoreError {
    StoreError::TransactionFailed {
        reason: e.to_string(),
    }
}

#[async_trait]
impl PadStore for LmdbPadStore {
    async fn get(&self, path: &str) -> StoreResult<Option<Pad>> {
        let rtxn = self.env.read_txn().map_err(txn_err)?;
        match self.db.get(&rtxn, path.as_bytes()).map_err(txn_err)? {
            Some(bytes) => Ok(Some(Self::decode(path, bytes)?)),
            None => Ok(None),
        }
    }

    async fn upsert(&self, path: &str, content: &str) -> StoreResult<Pad> {
        let now = Utc::now().timestamp();
        let mut wtxn = self.env.write_txn().map_err(txn_err)?;

        // Keep created_at from the existing record, if any.
        let created_at = match self.db.get(&wtxn, path.as_bytes()).map_err(txn_err)? {
            Some(bytes) => Self::decode(path, bytes)?.created_at,
            None => now,
        };

        let record = StoredPad {
            content: content.to_string(),
            updated_at: now,
            created_at,
        };
        let bytes = Self::encode(path, &record)?;
        self.db
            .put(&mut wtxn, path.as_bytes(), &bytes)
            .map_err(txn_err)?;
        wtxn.commit().map_err(txn_err)?;

        Ok(Pad {
            path: path.to_string(),
            content: record.content,
            updated_at: record.updated_at,
            created_at: record.created_at,
        })
    }

    async fn delete_subtree(&self, path: &str) -> StoreResult<u64> {
        let mut wtxn = self.env.write_txn().map_err(txn_err)?;

        if path.is_empty() {
            let count = self.db.len(&wtxn).map_err(txn_err)?;
            self.db.clear(&mut wtxn).map_err(txn_err)?;
            wtxn.commit().map_err(txn_err)?;
            return Ok(count);
        }

        let keys = self.collect_subtree_keys(&wtxn, path)?;
        let mut removed = 0u64;
        for key in &keys {
            if self.db.delete(&mut wtxn, key).map_err(txn_err)? {
                removed += 1;
            }
        }
        wtxn.commit().map_err(txn_err)?;
        Ok(removed)
    }

    async fn list_children(&self, parent: &str) -> StoreResult<Vec<ChildEntry>> {
        let rtxn = self.env.read_txn().map_err(txn_err)?;
        let mut children = Vec::new();

        let iter = self.db.iter(&rtxn).map_err(txn_err)?;
        for result in iter {
            let (key, value) = result.map_err(txn_err)?;
            let Ok(key_str) = std::str::from_utf8(key) else {
                continue;
            };
            if key_str == parent || parent_path(key_str) != parent {
                continue;
            }
            let pad = Self::decode(key_str, value)?;
            children.push(ChildEntry {
                path: pad.path,
                updated_at: pad.updated_at,
            });
        }

        Ok(children)
    }

    async fn health_check(&self) -> StoreResult<()> {
        let rtxn = self.env.read_txn().map_err(txn_err)?;
        self.db.len(&rtxn).map(|_| ()).map_err(txn_err)
    }
}
