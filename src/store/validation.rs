//! Path validation for store lookups.
//!
//! Store paths are slash-separated and relative to the store root. A valid path
//! is either `.` (the root) or a sequence of non-empty elements, none of which
//! is `.` or `..`, with no leading or trailing slash.

use crate::error::{DecompFsError, Result};

/// Validate that `path` is usable as a store path
///
/// # Error Cases
/// - Empty path
/// - Leading or trailing slash (`/a`, `a/`)
/// - Empty element (`a//b`)
/// - `.` or `..` element anywhere except a lone `.`
/// - Backslash or NUL inside an element
pub fn validate_path(path: &str) -> Result<()> {
    if path == "." {
        return Ok(());
    }

    let valid = !path.is_empty()
        && path.split('/').all(|element| {
            !element.is_empty()
                && element != "."
                && element != ".."
                && !element.contains(['\\', '\0'])
        });

    if valid {
        Ok(())
    } else {
        Err(DecompFsError::InvalidPath {
            path: path.to_string(),
        })
    }
}

/// True when `path` names the store root
pub(crate) fn is_root(path: &str) -> bool {
    path == "."
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_validate_valid_paths() {
        for path in [".", "a", "a.txt.gz", "dir/sub/file", "..hidden", "a..b"] {
            assert!(validate_path(path).is_ok(), "{path} should be valid");
        }
    }

    #[test]
    fn test_validate_invalid_paths() {
        for path in ["", "/a", "a/", "a//b", "./a", "a/./b", "../a", "a/..", "a\\b"] {
            let err = validate_path(path).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::StoreFault, "{path}");
            match err {
                DecompFsError::InvalidPath { path: reported } => assert_eq!(reported, path),
                other => panic!("Expected InvalidPath, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_is_root() {
        assert!(is_root("."));
        assert!(!is_root("a"));
    }
}
