//! Error types for padtree operations

use thiserror::Error;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Storage backend unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Serialization failed for pad {path:?}: {reason}")]
    Serialization { path: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Path validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("Path exceeds maximum length of {max} characters")]
    TooLong { max: usize },

    #[error("Path exceeds maximum depth of {max} segments")]
    TooDeep { max: usize },

    #[error("Path contains an empty segment")]
    EmptySegment,

    #[error("Segment '{segment}' exceeds maximum length of {max} characters")]
    SegmentTooLong { segment: String, max: usize },

    #[error(
        "Segment '{segment}' contains invalid characters \
         (allowed: lowercase alphanumeric, hyphen, underscore)"
    )]
    InvalidSegment { segment: String },

    #[error("Path '{segment}' is reserved")]
    Reserved { segment: String },
}

/// Subscription errors from the topic broadcaster.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubscribeError {
    #[error("Topic {topic:?} already has the maximum of {limit} subscribers")]
    CapacityExceeded { topic: String, limit: usize },
}
