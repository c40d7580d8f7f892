#![allow(dead_code)]

use decompfs::{Codec, Entry, FileStore, MemoryStore, Metadata, Result, StoreFile};
use parking_lot::Mutex;
use std::io::{Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Compress `content` with the real encoder for `codec`
pub fn compress(codec: Codec, content: &[u8]) -> Vec<u8> {
    match codec {
        Codec::None => content.to_vec(),
        Codec::Gzip => {
            let mut encoder =
                flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(content).unwrap();
            encoder.finish().unwrap()
        }
        Codec::Bzip2 => {
            let mut encoder =
                bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
            encoder.write_all(content).unwrap();
            encoder.finish().unwrap()
        }
        Codec::Zstd => zstd::encode_all(content, 0).unwrap(),
        Codec::Lz4 => {
            let mut encoder = lz4_flex::frame::FrameEncoder::new(Vec::new());
            encoder.write_all(content).unwrap();
            encoder.finish().unwrap()
        }
    }
}

/// Store wrapper that records every open and counts closes
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    opened: Mutex<Vec<String>>,
    successful_opens: AtomicUsize,
    closes: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// Every path passed to `open`, in call order
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().clone()
    }

    pub fn successful_opens(&self) -> usize {
        self.successful_opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl FileStore for CountingStore {
    fn open(&self, path: &str) -> Result<Box<dyn StoreFile>> {
        self.opened.lock().push(path.to_string());
        let inner = self.inner.open(path)?;
        self.successful_opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountedFile {
            inner,
            closes: Arc::clone(&self.closes),
        }))
    }

    fn read_dir(&self, path: &str) -> Result<Vec<Box<dyn Entry>>> {
        self.inner.read_dir(path)
    }
}

struct CountedFile {
    inner: Box<dyn StoreFile>,
    closes: Arc<AtomicUsize>,
}

impl Read for CountedFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl StoreFile for CountedFile {
    fn metadata(&self) -> Result<Metadata> {
        self.inner.metadata()
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.inner.close()
    }
}

/// Store that fails every open of one path with a non-not-found error
pub struct DenyingStore {
    pub inner: CountingStore,
    pub denied: String,
}

impl FileStore for DenyingStore {
    fn open(&self, path: &str) -> Result<Box<dyn StoreFile>> {
        if path == self.denied {
            let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
            return Err(decompfs::DecompFsError::from_io(path, source));
        }
        self.inner.open(path)
    }

    fn read_dir(&self, path: &str) -> Result<Vec<Box<dyn Entry>>> {
        self.inner.read_dir(path)
    }
}
