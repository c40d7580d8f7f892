//! Read-only file store abstraction.
//!
//! A [`FileStore`] is a hierarchical container of named byte streams queried by
//! slash-separated relative paths. decompfs consumes stores only through this
//! trait, and its own overlay implements it too, so overlays compose.
//!
//! Two stores ship with the crate:
//! - [`LocalFileStore`] serves a directory on disk
//! - [`MemoryStore`] serves an in-memory map, mostly for tests

use crate::error::Result;
use std::fmt;
use std::io::Read;
use std::sync::Arc;
use std::time::SystemTime;

pub mod local;
pub mod memory;
pub mod validation;

pub use local::LocalFileStore;
pub use memory::MemoryStore;
pub use validation::validate_path;

/// File metadata as reported by a store.
///
/// For files served through decompression, every field except `name` is taken
/// from the compressed entry, so `size` is the compressed size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Base name (no path separators)
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Permission bits
    pub mode: u32,
    /// Modification time
    pub modified: SystemTime,
    /// Whether the entry is a directory
    pub is_dir: bool,
}

/// An open byte stream handed out by [`FileStore::open`].
///
/// Implementations release their resources in `close`. Dropping a handle without
/// closing it must still release resources, but any error is lost.
pub trait StoreFile: Read + Send {
    /// Metadata of the opened entry
    fn metadata(&self) -> Result<Metadata>;

    /// Release the handle, reporting any failure
    fn close(self: Box<Self>) -> Result<()>;
}

/// One entry of a directory listing.
pub trait Entry: Send + Sync {
    /// Base name of the entry
    fn name(&self) -> &str;

    /// Whether the entry is a directory
    fn is_dir(&self) -> bool;

    /// Fetch the entry's metadata (may hit the store)
    fn metadata(&self) -> Result<Metadata>;
}

impl fmt::Debug for dyn Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("name", &self.name())
            .field("is_dir", &self.is_dir())
            .finish()
    }
}

/// Core trait for read-only store access.
///
/// Errors must report a missing path as [`DecompFsError::NotFound`] so callers
/// can tell it apart from every other failure.
///
/// [`DecompFsError::NotFound`]: crate::error::DecompFsError::NotFound
pub trait FileStore: Send + Sync {
    /// Open the file at `path` for sequential reading
    fn open(&self, path: &str) -> Result<Box<dyn StoreFile>>;

    /// List the directory at `path` in store order
    fn read_dir(&self, path: &str) -> Result<Vec<Box<dyn Entry>>>;
}

impl<S: FileStore + ?Sized> FileStore for &S {
    fn open(&self, path: &str) -> Result<Box<dyn StoreFile>> {
        (**self).open(path)
    }

    fn read_dir(&self, path: &str) -> Result<Vec<Box<dyn Entry>>> {
        (**self).read_dir(path)
    }
}

impl<S: FileStore + ?Sized> FileStore for Arc<S> {
    fn open(&self, path: &str) -> Result<Box<dyn StoreFile>> {
        (**self).open(path)
    }

    fn read_dir(&self, path: &str) -> Result<Vec<Box<dyn Entry>>> {
        (**self).read_dir(path)
    }
}

impl<S: FileStore + ?Sized> FileStore for Box<S> {
    fn open(&self, path: &str) -> Result<Box<dyn StoreFile>> {
        (**self).open(path)
    }

    fn read_dir(&self, path: &str) -> Result<Vec<Box<dyn Entry>>> {
        (**self).read_dir(path)
    }
}

/// Return the last element of a slash-separated path
pub(crate) fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("a/b/c.txt"), "c.txt");
        assert_eq!(base_name("c.txt"), "c.txt");
        assert_eq!(base_name("."), ".");
    }

    #[test]
    fn test_store_is_object_safe() {
        let store = MemoryStore::new();
        store.insert("a.txt", b"hello".to_vec()).unwrap();

        let shared: Arc<dyn FileStore> = Arc::new(store);
        let mut file = shared.open("a.txt").unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        assert_eq!(content, "hello");
        file.close().unwrap();
    }
}
