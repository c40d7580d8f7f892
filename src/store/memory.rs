//! In-memory file store.
//!
//! Files are kept in a sorted map from slash paths to contents. Parent
//! directories are synthesized from the file paths, so inserting `a/b/c.txt`
//! makes `a` and `a/b` listable directories.

use crate::error::{DecompFsError, Result};
use crate::store::validation::{is_root, validate_path};
use crate::store::{base_name, Entry, FileStore, Metadata, StoreFile};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::sync::Arc;
use std::time::SystemTime;

const DEFAULT_FILE_MODE: u32 = 0o644;
const DIR_MODE: u32 = 0o755;

#[derive(Debug, Clone)]
struct MemoryFile {
    data: Arc<[u8]>,
    mode: u32,
    modified: SystemTime,
}

/// A [`FileStore`] backed by a map of in-memory files
///
/// The map sits behind a lock so the store can change between calls while
/// overlays hold a shared reference to it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RwLock<BTreeMap<String, MemoryFile>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding `files`, each with default mode and the current time
    pub fn with_files<I, P, D>(files: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, D)>,
        P: Into<String>,
        D: Into<Vec<u8>>,
    {
        let store = Self::new();
        for (path, data) in files {
            store.insert(path, data)?;
        }
        Ok(store)
    }

    /// Insert or replace a file with default mode and the current time
    pub fn insert(&self, path: impl Into<String>, data: impl Into<Vec<u8>>) -> Result<()> {
        self.insert_with(path, data, DEFAULT_FILE_MODE, SystemTime::now())
    }

    /// Insert or replace a file with explicit mode and modification time
    ///
    /// The path must be a valid non-root store path, otherwise `open` could
    /// never reach the file.
    pub fn insert_with(
        &self,
        path: impl Into<String>,
        data: impl Into<Vec<u8>>,
        mode: u32,
        modified: SystemTime,
    ) -> Result<()> {
        let path = path.into();
        validate_path(&path)?;
        if is_root(&path) {
            return Err(DecompFsError::InvalidPath { path });
        }

        let data: Vec<u8> = data.into();
        let file = MemoryFile {
            data: Arc::from(data),
            mode,
            modified,
        };
        self.files.write().insert(path, file);
        Ok(())
    }

    /// Remove a file, returning whether it existed
    pub fn remove(&self, path: &str) -> bool {
        self.files.write().remove(path).is_some()
    }

    /// Number of files in the store
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    /// Whether the store holds no files
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }

    fn is_dir(files: &BTreeMap<String, MemoryFile>, path: &str) -> bool {
        if is_root(path) {
            return true;
        }
        let prefix = format!("{path}/");
        files
            .range(prefix.clone()..)
            .next()
            .is_some_and(|(key, _)| key.starts_with(&prefix))
    }

    fn file_metadata(path: &str, file: &MemoryFile) -> Metadata {
        Metadata {
            name: base_name(path).to_string(),
            size: file.data.len() as u64,
            mode: file.mode,
            modified: file.modified,
            is_dir: false,
        }
    }

    fn dir_metadata(name: &str, modified: SystemTime) -> Metadata {
        Metadata {
            name: name.to_string(),
            size: 0,
            mode: DIR_MODE,
            modified,
            is_dir: true,
        }
    }
}

impl FileStore for MemoryStore {
    fn open(&self, path: &str) -> Result<Box<dyn StoreFile>> {
        validate_path(path)?;
        let files = self.files.read();

        if let Some(file) = files.get(path) {
            return Ok(Box::new(MemoryHandle {
                cursor: Cursor::new(Arc::clone(&file.data)),
                metadata: Self::file_metadata(path, file),
            }));
        }

        if Self::is_dir(&files, path) {
            return Err(DecompFsError::NotAFile {
                path: path.to_string(),
            });
        }

        Err(DecompFsError::not_found(path))
    }

    fn read_dir(&self, path: &str) -> Result<Vec<Box<dyn Entry>>> {
        validate_path(path)?;
        let files = self.files.read();

        if files.contains_key(path) {
            return Err(DecompFsError::NotADirectory {
                path: path.to_string(),
            });
        }
        if !Self::is_dir(&files, path) {
            return Err(DecompFsError::not_found(path));
        }

        let prefix = if is_root(path) {
            String::new()
        } else {
            format!("{path}/")
        };

        // Children keyed by name so synthesized directories appear once
        let mut children: BTreeMap<String, Metadata> = BTreeMap::new();
        for (key, file) in files.range(prefix.clone()..) {
            let Some(rest) = key.strip_prefix(&prefix) else {
                break;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    let entry = children
                        .entry(dir.to_string())
                        .or_insert_with(|| Self::dir_metadata(dir, file.modified));
                    if file.modified > entry.modified {
                        entry.modified = file.modified;
                    }
                }
                None => {
                    children.insert(rest.to_string(), Self::file_metadata(rest, file));
                }
            }
        }

        Ok(children
            .into_values()
            .map(|metadata| Box::new(MemoryEntry { metadata }) as Box<dyn Entry>)
            .collect())
    }
}

/// Open handle on an in-memory file
struct MemoryHandle {
    cursor: Cursor<Arc<[u8]>>,
    metadata: Metadata,
}

impl Read for MemoryHandle {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl StoreFile for MemoryHandle {
    fn metadata(&self) -> Result<Metadata> {
        Ok(self.metadata.clone())
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Directory entry of a [`MemoryStore`] listing
struct MemoryEntry {
    metadata: Metadata,
}

impl Entry for MemoryEntry {
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
