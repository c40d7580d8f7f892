//! File store backed by a directory on the local filesystem.

use crate::error::{DecompFsError, Result};
use crate::store::validation::{is_root, validate_path};
use crate::store::{base_name, Entry, FileStore, Metadata, StoreFile};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A [`FileStore`] rooted at a local directory
///
/// Store paths are resolved relative to the root. Listings are sorted by name
/// since the operating system gives no ordering guarantee.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Create a store rooted at `root`
    ///
    /// # Errors
    /// * Root does not exist
    /// * Root is not a directory
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let display = root.display().to_string();
        let metadata = std::fs::metadata(&root).map_err(|e| DecompFsError::from_io(&display, e))?;

        if !metadata.is_dir() {
            return Err(DecompFsError::NotADirectory { path: display });
        }

        Ok(Self { root })
    }

    /// The directory this store serves
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        validate_path(path)?;
        if is_root(path) {
            return Ok(self.root.clone());
        }
        Ok(path.split('/').fold(self.root.clone(), |acc, element| acc.join(element)))
    }
}

fn convert_metadata(name: &str, metadata: &std::fs::Metadata) -> Metadata {
    Metadata {
        name: name.to_string(),
        size: metadata.len(),
        mode: permission_bits(metadata),
        modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        is_dir: metadata.is_dir(),
    }
}

#[cfg(unix)]
fn permission_bits(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &std::fs::Metadata) -> u32 {
    match (metadata.is_dir(), metadata.permissions().readonly()) {
        (true, _) => 0o755,
        (false, true) => 0o444,
        (false, false) => 0o644,
    }
}

impl FileStore for LocalFileStore {
    fn open(&self, path: &str) -> Result<Box<dyn StoreFile>> {
        let full_path = self.resolve(path)?;
        let file = File::open(&full_path).map_err(|e| DecompFsError::from_io(path, e))?;

        let metadata = file.metadata().map_err(|e| DecompFsError::from_io(path, e))?;
        if metadata.is_dir() {
            return Err(DecompFsError::NotAFile {
                path: path.to_string(),
            });
        }

        Ok(Box::new(LocalFile {
            file,
            name: base_name(path).to_string(),
            path: path.to_string(),
        }))
    }

    fn read_dir(&self, path: &str) -> Result<Vec<Box<dyn Entry>>> {
        let full_path = self.resolve(path)?;

        let metadata = std::fs::metadata(&full_path).map_err(|e| DecompFsError::from_io(path, e))?;
        if !metadata.is_dir() {
            return Err(DecompFsError::NotADirectory {
                path: path.to_string(),
            });
        }

        let mut entries = Vec::new();
        for dir_entry in std::fs::read_dir(&full_path).map_err(|e| DecompFsError::from_io(path, e))? {
            let dir_entry = dir_entry.map_err(|e| DecompFsError::from_io(path, e))?;
            let is_dir = dir_entry
                .file_type()
                .map_err(|e| DecompFsError::from_io(path, e))?
                .is_dir();
            let name = dir_entry.file_name().to_string_lossy().into_owned();
            entries.push(LocalEntry {
                name,
                is_dir,
                path: dir_entry.path(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(entries
            .into_iter()
            .map(|entry| Box::new(entry) as Box<dyn Entry>)
            .collect())
    }
}

/// Open handle on a local file
struct LocalFile {
    file: File,
    name: String,
    path: String,
}

impl Read for LocalFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

impl StoreFile for LocalFile {
    fn metadata(&self) -> Result<Metadata> {
        let metadata = self
            .file
            .metadata()
            .map_err(|e| DecompFsError::from_io(&self.path, e))?;
        Ok(convert_metadata(&self.name, &metadata))
    }

    fn close(self: Box<Self>) -> Result<()> {
        // Read-only handles have nothing to flush; dropping releases the descriptor
        drop(self.file);
        Ok(())
    }
}

/// Directory entry of a [`LocalFileStore`] listing
struct LocalEntry {
    name: String,
    is_dir: bool,
    path: PathBuf,
}

impl Entry for LocalEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_dir(&self) -> bool {
        self.is_dir
    }

    fn metadata(&self) -> Result<Metadata> {
        let metadata = std::fs::symlink_metadata(&self.path)
            .map_err(|e| DecompFsError::from_io(&self.path.display().to_string(), e))?;
        Ok(convert_metadata(&self.name, &metadata))
    }
}
