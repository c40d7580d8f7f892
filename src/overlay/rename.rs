//! Metadata rewriting for decompressed entries.

use crate::error::Result;
use crate::store::{Entry, Metadata};

/// Copy `metadata` with its name replaced by `name`
///
/// Every other field is carried over unchanged, including ones added to
/// [`Metadata`] later. The input is left untouched, so rewriting an already
/// rewritten value with the same name yields an equal value.
pub fn rewrite(metadata: &Metadata, name: &str) -> Metadata {
    Metadata {
        name: name.to_string(),
        ..metadata.clone()
    }
}

/// Directory entry exposing a compressed file under its decompressed name
#[derive(Debug, Clone)]
pub struct RenamedEntry {
    metadata: Metadata,
}

impl RenamedEntry {
    /// Rename the entry described by `metadata` to `name`
    pub fn new(metadata: &Metadata, name: &str) -> Self {
        Self {
            metadata: rewrite(metadata, name),
        }
    }
}

impl Entry for RenamedEntry {
    fn name(&self) -> &str {
        &self.metadata.name
    }

    fn is_dir(&self) -> bool {
        self.metadata.is_dir
    }

    fn metadata(&self) -> Result<Metadata> {
        Ok(self.metadata.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    fn sample() -> Metadata {
        Metadata {
            name: "access.log.zst".to_string(),
            size: 4096,
            mode: 0o640,
            modified: SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000),
            is_dir: false,
        }
    }

    #[test]
    fn test_rewrite_changes_only_name() {
        let original = sample();
        let renamed = rewrite(&original, "access.log");

        assert_eq!(renamed.name, "access.log");
        assert_eq!(renamed.size, original.size);
        assert_eq!(renamed.mode, original.mode);
        assert_eq!(renamed.modified, original.modified);
        assert_eq!(renamed.is_dir, original.is_dir);
        assert_eq!(original.name, "access.log.zst");
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let once = rewrite(&sample(), "access.log");
        let twice = rewrite(&once, "access.log");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_renamed_entry_composes() {
        let entry = RenamedEntry::new(&sample(), "access.log");
        assert_eq!(entry.name(), "access.log");
        assert!(!entry.is_dir());

        let nested = RenamedEntry::new(&entry.metadata().unwrap(), "access.log");
        assert_eq!(nested.metadata().unwrap(), entry.metadata().unwrap());
    }
}
