//! # decompfs - Transparent Decompression for Read-Only File Stores
//!
//! decompfs wraps a read-only, hierarchical file store and serves compressed
//! files as if their decompressed contents were stored under the plain name.
//! Asking for `logs/app.log` opens `logs/app.log` when it exists, and otherwise
//! the first of `logs/app.log.gz`, `.bz2`, `.zst` or `.lz4` that does, decoded
//! on the fly.
//!
//! ## Features
//!
//! - **Suffix Probing**: fixed, deterministic fallback order gzip, bzip2, zstd, lz4
//! - **Streaming Decode**: content is decoded chunk by chunk as it is read
//! - **Consistent Listings**: compressed files are listed under their plain names
//! - **Leak-Free Failure Paths**: raw handles are closed on every error path
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and classification
//! - [`store`] - The [`FileStore`] trait plus local and in-memory stores
//! - [`codec`] - Codec registry, magic numbers and streaming decoders
//! - [`overlay`] - [`DecompressFs`], [`VirtualFile`] and listing rewrites
//!
//! ## Example
//!
//! ```
//! use decompfs::{DecompressFs, MemoryStore};
//! use std::io::{Read, Write};
//!
//! let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
//! encoder.write_all(b"hello from gzip").unwrap();
//!
//! let store = MemoryStore::new();
//! store.insert("greeting.txt.gz", encoder.finish().unwrap()).unwrap();
//!
//! let dfs = DecompressFs::new(store);
//! let mut file = dfs.open("greeting.txt").unwrap();
//! let mut content = String::new();
//! file.read_to_string(&mut content).unwrap();
//! assert_eq!(content, "hello from gzip");
//! assert_eq!(file.metadata().unwrap().name, "greeting.txt");
//! file.close().unwrap();
//! ```

// Core modules
pub mod error;
pub mod store;

// Decompression
pub mod codec;
pub mod overlay;

// Re-export commonly used types for convenience
pub use error::{DecompFsError, ErrorKind, Result};

// Public API surface for external usage
pub use codec::Codec;
pub use overlay::{DecompressFs, VirtualFile};
pub use store::{Entry, FileStore, LocalFileStore, MemoryStore, Metadata, StoreFile};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
