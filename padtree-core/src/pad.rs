//! Pad record types.

use serde::{Deserialize, Serialize};

/// A single pad document addressed by a hierarchical path.
///
/// Timestamps are Unix seconds. A pad that has never been written reads as
/// "implicit": empty content with both timestamps zero. Identity is the
/// path; there is exactly one pad per normalized path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pad {
    /// Normalized path ("" denotes the root pad).
    pub path: String,
    /// Pad text content.
    pub content: String,
    /// Unix seconds of the last write (0 for implicit pads).
    pub updated_at: i64,
    /// Unix seconds of the first write (0 for implicit pads).
    pub created_at: i64,
}

impl Pad {
    /// The canonical empty pad for a path with no materialized record.
    pub fn implicit(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: String::new(),
            updated_at: 0,
            created_at: 0,
        }
    }

    /// Whether this pad has ever been written.
    pub fn is_materialized(&self) -> bool {
        self.created_at != 0
    }
}

/// Lightweight representation of a direct child for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildEntry {
    pub path: String,
    pub updated_at: i64,
}
