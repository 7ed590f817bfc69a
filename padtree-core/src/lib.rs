//! Padtree Core - Pad Types, Path Math, and Errors
//!
//! Pure data structures with no I/O. All other crates depend on this.
//! This crate contains the pad record types, the hierarchical path
//! helpers (normalization, validation, parent derivation, segment-aligned
//! subtree matching), the live-update event union, and the error taxonomy.

pub mod error;
pub mod event;
pub mod pad;
pub mod path;

pub use error::{PathError, StoreError, SubscribeError};
pub use event::PadEvent;
pub use pad::{ChildEntry, Pad};
pub use path::{
    is_in_subtree, normalize_path, parent_path, validate_path, MAX_DEPTH, MAX_PATH_LEN,
    MAX_SEGMENT_LEN, RESERVED_SEGMENTS,
};
