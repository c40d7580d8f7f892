//! Decompression adapter and the [`VirtualFile`] it produces.
//!
//! A virtual file owns the raw store handle for its whole life. For compressed
//! entries the handle sits underneath a streaming decoder; closing releases the
//! decoder first, then the handle, and both steps always run.

use crate::codec::{into_raw, open_decoder, Codec, DecodeStream};
use crate::error::{DecompFsError, Result};
use crate::overlay::rename::rewrite;
use crate::store::{Metadata, StoreFile};
use std::fmt;
use std::io::Read;

/// File handle returned by [`DecompressFs::open`](crate::DecompressFs::open)
///
/// Reads yield decompressed bytes for compressed entries and raw bytes
/// otherwise. Not meant for concurrent use; each open produces its own handle.
pub struct VirtualFile {
    inner: Inner,
}

enum Inner {
    /// Literal entry, served unmodified
    Plain(Box<dyn StoreFile>),
    /// Compressed entry, decoded on the fly
    Decoded {
        stream: Box<dyn DecodeStream>,
        codec: Codec,
        metadata: Metadata,
    },
}

impl VirtualFile {
    /// Wrap a literal store handle without decoding
    pub(crate) fn plain(raw: Box<dyn StoreFile>) -> Self {
        Self {
            inner: Inner::Plain(raw),
        }
    }

    /// Codec decoding this file, [`Codec::None`] for literal entries
    pub fn codec(&self) -> Codec {
        match &self.inner {
            Inner::Plain(_) => Codec::None,
            Inner::Decoded { codec, .. } => *codec,
        }
    }

    /// Reported metadata
    ///
    /// For decoded files this is the compressed entry's metadata with the
    /// suffix removed from the name; `size` stays the compressed size.
    pub fn metadata(&self) -> Result<Metadata> {
        match &self.inner {
            Inner::Plain(raw) => raw.metadata(),
            Inner::Decoded { metadata, .. } => Ok(metadata.clone()),
        }
    }

    /// Release the decoder and the raw handle
    ///
    /// Both are released even when the first release fails; the first error
    /// encountered is the one returned.
    pub fn close(self) -> Result<()> {
        match self.inner {
            Inner::Plain(raw) => raw.close(),
            Inner::Decoded { stream, codec, .. } => {
                let (released, source) = stream.release();
                let released = released.map_err(|e| {
                    DecompFsError::close(format!("Failed to release {codec} decoder"), e)
                });
                let closed = into_raw(source).close();
                first_error([released, closed])
            }
        }
    }
}

impl Read for VirtualFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            Inner::Plain(raw) => raw.read(buf),
            Inner::Decoded { stream, .. } => stream.read(buf),
        }
    }
}

impl StoreFile for VirtualFile {
    fn metadata(&self) -> Result<Metadata> {
        VirtualFile::metadata(self)
    }

    fn close(self: Box<Self>) -> Result<()> {
        VirtualFile::close(*self)
    }
}

impl fmt::Debug for VirtualFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("VirtualFile");
        debug.field("codec", &self.codec());
        if let Inner::Decoded { metadata, .. } = &self.inner {
            debug.field("metadata", metadata);
        }
        debug.finish_non_exhaustive()
    }
}

/// Serve `raw` through the decoder for `codec`
///
/// [`Codec::None`] wraps the handle unmodified. For compressed codecs the raw
/// handle's metadata is fetched once and renamed, then the decoder is built.
/// If either step fails the raw handle is closed before the error is returned.
///
/// # Errors
/// * Metadata lookup failure from the store
/// * [`DecompFsError::DecodeError`] when the stream header is not in the codec's format
pub fn adapt(codec: Codec, raw: Box<dyn StoreFile>) -> Result<VirtualFile> {
    if !codec.is_compressed() {
        return Ok(VirtualFile::plain(raw));
    }

    let metadata = match raw.metadata() {
        Ok(metadata) => metadata,
        Err(err) => {
            close_after_failure(raw);
            return Err(err);
        }
    };
    let name = metadata
        .name
        .strip_suffix(codec.suffix())
        .unwrap_or(&metadata.name);
    let metadata = rewrite(&metadata, name);

    let stream = match open_decoder(codec, raw) {
        Ok(stream) => stream,
        Err((err, raw)) => {
            close_after_failure(raw);
            return Err(err);
        }
    };

    Ok(VirtualFile {
        inner: Inner::Decoded {
            stream,
            codec,
            metadata,
        },
    })
}

/// Close a handle whose open already failed; the original error wins
fn close_after_failure(raw: Box<dyn StoreFile>) {
    if let Err(err) = raw.close() {
        log::warn!("Suppressed close failure after failed open: {err}");
    }
}

/// Fold release results in order, keeping the first error
///
/// Every result has already been produced by the time this runs, so all
/// releases were attempted; later errors are logged and dropped.
pub(crate) fn first_error<I>(results: I) -> Result<()>
where
    I: IntoIterator<Item = Result<()>>,
{
    let mut first = None;
    for result in results {
        if let Err(err) = result {
            if first.is_none() {
                first = Some(err);
            } else {
                log::warn!("Suppressed release failure: {err}");
            }
        }
    }
    first.map_or(Ok(()), Err)
}
