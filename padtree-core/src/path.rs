//! Path normalization, validation, and subtree math.
//!
//! Pads form a tree purely through their path strings: ownership is
//! positional (string prefix at a segment boundary), never an explicit
//! edge structure. Every path entering the cache, store, or broadcaster
//! must first pass through [`normalize_path`] and [`validate_path`]; the
//! segment-aligned checks below rely on that (no trailing separators, no
//! empty segments).

use crate::error::PathError;

/// Maximum number of segments in a pad path.
pub const MAX_DEPTH: usize = 10;

/// Maximum length of a single path segment.
pub const MAX_SEGMENT_LEN: usize = 64;

/// Maximum total path length in bytes.
pub const MAX_PATH_LEN: usize = 512;

/// First segments that collide with the HTTP surface and cannot name pads.
pub const RESERVED_SEGMENTS: &[&str] = &["api", "static", "health", "healthz", "favicon.ico"];

/// Lowercase and strip leading/trailing/duplicate slashes.
///
/// The empty string (the root pad) is already normalized.
pub fn normalize_path(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for segment in lowered.split('/').filter(|s| !s.is_empty()) {
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(segment);
    }
    out
}

/// Check that a normalized path is valid as a pad address.
pub fn validate_path(path: &str) -> Result<(), PathError> {
    // The root path is always valid.
    if path.is_empty() {
        return Ok(());
    }

    if path.len() > MAX_PATH_LEN {
        return Err(PathError::TooLong { max: MAX_PATH_LEN });
    }

    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() > MAX_DEPTH {
        return Err(PathError::TooDeep { max: MAX_DEPTH });
    }

    if RESERVED_SEGMENTS.contains(&segments[0]) {
        return Err(PathError::Reserved {
            segment: segments[0].to_string(),
        });
    }

    for segment in segments {
        if segment.is_empty() {
            return Err(PathError::EmptySegment);
        }
        if segment.len() > MAX_SEGMENT_LEN {
            return Err(PathError::SegmentTooLong {
                segment: segment.to_string(),
                max: MAX_SEGMENT_LEN,
            });
        }
        if !is_valid_segment(segment) {
            return Err(PathError::InvalidSegment {
                segment: segment.to_string(),
            });
        }
    }

    Ok(())
}

/// Segments are lowercase alphanumeric plus hyphen/underscore, and must
/// start with an alphanumeric character.
fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c.is_ascii_digit() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

/// Derive the parent path by truncating at the last separator.
///
/// The root's parent is itself ("" -> ""); a top-level pad's parent is the
/// root.
pub fn parent_path(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Segment-aligned subtree test: `path` equals `prefix`, or starts with
/// `prefix` followed by a separator. `"foo"` never matches `"foobar"`.
///
/// The empty prefix denotes the root and matches every path.
pub fn is_in_subtree(prefix: &str, path: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    if path == prefix {
        return true;
    }
    path.len() > prefix.len()
        && path.as_bytes()[prefix.len()] == b'/'
        && path.starts_with(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_and_collapses() {
        assert_eq!(normalize_path("/Notes//Todo/"), "notes/todo");
        assert_eq!(normalize_path("a/b"), "a/b");
        assert_eq!(normalize_path("///"), "");
        assert_eq!(normalize_path(""), "");
    }

    #[test]
    fn test_validate_accepts_root_and_nested() {
        assert!(validate_path("").is_ok());
        assert!(validate_path("notes").is_ok());
        assert!(validate_path("notes/2024/q1_plan").is_ok());
        assert!(validate_path("a-b_c/d0").is_ok());
    }

    #[test]
    fn test_validate_rejects_reserved_first_segment() {
        assert_eq!(
            validate_path("api/foo"),
            Err(PathError::Reserved {
                segment: "api".to_string()
            })
        );
        // Reserved names are fine below the first level.
        assert!(validate_path("notes/api").is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_segments() {
        assert!(matches!(
            validate_path("notes/Bad Name"),
            Err(PathError::InvalidSegment { .. })
        ));
        assert!(matches!(
            validate_path("-leading"),
            Err(PathError::InvalidSegment { .. })
        ));
        assert_eq!(validate_path("a//b"), Err(PathError::EmptySegment));
    }

    #[test]
    fn test_validate_rejects_oversized() {
        let deep = vec!["x"; MAX_DEPTH + 1].join("/");
        assert_eq!(validate_path(&deep), Err(PathError::TooDeep { max: MAX_DEPTH }));

        let long_segment = "x".repeat(MAX_SEGMENT_LEN + 1);
        assert!(matches!(
            validate_path(&long_segment),
            Err(PathError::SegmentTooLong { .. })
        ));

        let long_path = vec!["y".repeat(60); 9].join("/");
        assert!(long_path.len() > MAX_PATH_LEN);
        assert_eq!(
            validate_path(&long_path),
            Err(PathError::TooLong { max: MAX_PATH_LEN })
        );
    }

    #[test]
    fn test_parent_path() {
        assert_eq!(parent_path(""), "");
        assert_eq!(parent_path("notes"), "");
        assert_eq!(parent_path("notes/todo"), "notes");
        assert_eq!(parent_path("a/b/c"), "a/b");
    }

    #[test]
    fn test_is_in_subtree_is_segment_aligned() {
        assert!(is_in_subtree("foo", "foo"));
        assert!(is_in_subtree("foo", "foo/x"));
        assert!(is_in_subtree("foo", "foo/x/y"));
        assert!(!is_in_subtree("foo", "foobar"));
        assert!(!is_in_subtree("foo", "fo"));
        assert!(!is_in_subtree("foo/x", "foo"));
    }

    #[test]
    fn test_empty_prefix_matches_everything() {
        assert!(is_in_subtree("", ""));
        assert!(is_in_subtree("", "foo"));
        assert!(is_in_subtree("", "foo/bar"));
    }
}
