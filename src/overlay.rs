//! Transparent decompression overlay over a [`FileStore`].
//!
//! [`DecompressFs`] answers `open` and `read_dir` the way the wrapped store
//! would if every compressed file were stored decompressed under its plain
//! name.
//!
//! ## Resolution
//!
//! 1. Open the literal path. Success is served as-is.
//! 2. If the store reports the path as not found, try `path.gz`, `path.bz2`,
//!    `path.zst` and `path.lz4` in that order; the first one that opens is
//!    served through its decoder.
//! 3. If nothing opens, return the error from step 1 unchanged.
//!
//! Any other error from step 1 is returned immediately without probing.

use crate::codec::{probe_order, Codec};
use crate::error::{DecompFsError, Result};
use crate::store::{Entry, FileStore, Metadata, StoreFile};
use std::io::Read;

pub mod adapter;
mod listing;
pub mod rename;

pub use adapter::{adapt, VirtualFile};
pub use rename::{rewrite, RenamedEntry};

/// Overlay that serves compressed store entries under their decompressed names
#[derive(Debug, Clone, Default)]
pub struct DecompressFs<S> {
    store: S,
}

impl<S: FileStore> DecompressFs<S> {
    /// Wrap `store`
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The wrapped store
    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Unwrap the overlay, returning the store
    pub fn into_inner(self) -> S {
        self.store
    }

    /// Open `path`, falling back to compressed variants when it does not exist
    ///
    /// An uncompressed file always wins over a compressed variant of the same
    /// name.
    ///
    /// # Errors
    /// * The store's error for the literal path when no variant exists
    /// * Any non-not-found store error for the literal path
    /// * [`DecompFsError::DecodeError`] when the chosen variant has a bad header
    pub fn open(&self, path: &str) -> Result<VirtualFile> {
        let not_found = match self.store.open(path) {
            Ok(raw) => return Ok(VirtualFile::plain(raw)),
            Err(err) if err.is_not_found() => err,
            Err(err) => return Err(err),
        };

        log::debug!("{path} not found, probing compressed variants");
        for codec in probe_order() {
            let candidate = format!("{path}{}", codec.suffix());
            match self.store.open(&candidate) {
                Ok(raw) => {
                    log::debug!("Serving {path} from {candidate} ({codec})");
                    return adapter::adapt(codec, raw);
                }
                Err(err) => log::trace!("Probe of {candidate} failed: {err}"),
            }
        }

        Err(not_found)
    }

    /// List `path`, renaming compressed files to their decompressed names
    ///
    /// Directories and files without a recognized suffix pass through. Store
    /// order is kept and no de-duplication happens.
    pub fn read_dir(&self, path: &str) -> Result<Vec<Box<dyn Entry>>> {
        let entries = self.store.read_dir(path)?;
        listing::rewrite_entries(entries)
    }

    /// Metadata `open(path)` would report
    pub fn metadata(&self, path: &str) -> Result<Metadata> {
        let file = self.open(path)?;
        let metadata = file.metadata();
        let closed = file.close();
        metadata.and_then(|metadata| closed.map(|()| metadata))
    }

    /// Read the whole decompressed content of `path`
    ///
    /// # Errors
    /// * Any `open` error
    /// * [`DecompFsError::DecodeError`] for corrupt compressed data
    /// * Close failures, reported only when reading succeeded
    pub fn read(&self, path: &str) -> Result<Vec<u8>> {
        let mut file = self.open(path)?;
        let codec = file.codec();

        let mut content = Vec::new();
        let read = file
            .read_to_end(&mut content)
            .map_err(|e| read_error(path, codec, e));
        let closed = file.close();

        read.and_then(|_| closed.map(|()| content))
    }
}

/// Classify an error raised while reading an open file
fn read_error(path: &str, codec: Codec, err: std::io::Error) -> DecompFsError {
    match (codec, err.kind()) {
        (Codec::None, _) => DecompFsError::from_io(path, err),
        (
            codec,
            std::io::ErrorKind::InvalidData
            | std::io::ErrorKind::InvalidInput
            | std::io::ErrorKind::UnexpectedEof,
        ) => {
            DecompFsError::decode_io(codec, format!("Corrupt data in {path}"), err)
        }
        (_, _) => DecompFsError::from_io(path, err),
    }
}

impl<S: FileStore> FileStore for DecompressFs<S> {
    fn open(&self, path: &str) -> Result<Box<dyn StoreFile>> {
        Ok(Box::new(DecompressFs::open(self, path)?))
    }

    fn read_dir(&self, path: &str) -> Result<Vec<Box<dyn Entry>>> {
        DecompressFs::read_dir(self, path)
    }
}
