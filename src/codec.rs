//! Codec registry and streaming decoders.
//!
//! The registry is a fixed, ordered table of compressed formats. Each row binds
//! a [`Codec`] to its filename suffix, the magic number its streams start with,
//! and a constructor that wraps a byte source in a streaming decoder. Table
//! order is the order in which suffixes are probed.
//!
//! # Magic Numbers Used
//! - Gzip: `1f 8b` (RFC 1952)
//! - Bzip2: `42 5a 68` ("BZh" with block size)
//! - Zstd: `28 b5 2f fd` (Zstandard frame format), or a skippable frame
//!   `5? 2a 4d 18` ahead of the first data frame
//! - LZ4: `04 22 4d 18` (LZ4 frame format)

use crate::error::DecompFsError;
use crate::store::StoreFile;
use std::fmt;
use std::io::{self, BufReader, Chain, Cursor, Read};

/// Supported compression formats for transparent file access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    /// No compression - served as stored
    None,
    /// Gzip compression (.gz files)
    Gzip,
    /// Bzip2 compression (.bz2 files)
    Bzip2,
    /// Zstandard compression (.zst files)
    Zstd,
    /// LZ4 frame compression (.lz4 files)
    Lz4,
}

impl Codec {
    /// Get human-readable name for the codec
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
            Self::Zstd => "zstd",
            Self::Lz4 => "lz4",
        }
    }

    /// Check if this codec represents a compressed format
    pub fn is_compressed(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Filename suffix for this codec, empty for [`Codec::None`]
    pub fn suffix(&self) -> &'static str {
        self.entry().map_or("", |entry| entry.suffix)
    }

    fn entry(&self) -> Option<&'static CodecEntry> {
        CODECS.iter().find(|entry| entry.codec == *self)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte source handed to decoders: peeked header bytes replayed before the raw handle
pub(crate) type Source = BufReader<Chain<Cursor<Vec<u8>>, Box<dyn StoreFile>>>;

/// A decoder reading from a [`Source`]
pub(crate) trait DecodeStream: Read + Send {
    /// Release decoder state and hand back the byte source
    fn release(self: Box<Self>) -> (io::Result<()>, Source);
}

/// Decoder, or the untouched source when construction fails
type Decoded = Result<Box<dyn DecodeStream>, (io::Error, Source)>;

type DecodeFn = fn(Source) -> Decoded;

/// One row of the codec registry
pub(crate) struct CodecEntry {
    pub(crate) codec: Codec,
    pub(crate) suffix: &'static str,
    pub(crate) magic: &'static [u8],
    /// Streams may open with a zstd-style skippable frame instead of `magic`
    skippable: bool,
    decode: DecodeFn,
}

impl CodecEntry {
    /// Whether `head` is a valid start of a stream in this format
    fn accepts(&self, head: &[u8]) -> bool {
        head.starts_with(self.magic) || (self.skippable && is_skippable_frame(head))
    }
}

/// Skippable frame magic `0x184D2A50..=0x184D2A5F`, little-endian
fn is_skippable_frame(head: &[u8]) -> bool {
    matches!(head, [low, 0x2a, 0x4d, 0x18, ..] if low & 0xf0 == 0x50)
}

/// Registry rows in probing order
pub(crate) static CODECS: [CodecEntry; 4] = [
    CodecEntry {
        codec: Codec::Gzip,
        suffix: ".gz",
        magic: &[0x1f, 0x8b],
        skippable: false,
        decode: decode_gzip,
    },
    CodecEntry {
        codec: Codec::Bzip2,
        suffix: ".bz2",
        magic: &[0x42, 0x5a, 0x68],
        skippable: false,
        decode: decode_bzip2,
    },
    CodecEntry {
        codec: Codec::Zstd,
        suffix: ".zst",
        magic: &[0x28, 0xb5, 0x2f, 0xfd],
        skippable: true,
        decode: decode_zstd,
    },
    CodecEntry {
        codec: Codec::Lz4,
        suffix: ".lz4",
        magic: &[0x04, 0x22, 0x4d, 0x18],
        skippable: false,
        decode: decode_lz4,
    },
];

/// Compressed codecs in the order their suffixes are probed
pub fn probe_order() -> impl Iterator<Item = Codec> {
    CODECS.iter().map(|entry| entry.codec)
}

/// Split a recognized compression suffix off `name`
///
/// Returns `None` when no suffix matches or when the suffix is the whole name.
/// Only one suffix is removed: `x.bz2.gz` yields `(Gzip, "x.bz2")`.
pub fn strip_suffix(name: &str) -> Option<(Codec, &str)> {
    CODECS.iter().find_map(|entry| {
        name.strip_suffix(entry.suffix)
            .filter(|stem| !stem.is_empty())
            .map(|stem| (entry.codec, stem))
    })
}

/// Detect compression format from magic bytes
pub fn detect_by_magic(magic: &[u8]) -> Option<Codec> {
    CODECS
        .iter()
        .find(|entry| entry.accepts(magic))
        .map(|entry| entry.codec)
}

/// Wrap `raw` in the streaming decoder for `codec`
///
/// The codec's magic number is read up front so a stream that is not in the
/// expected format fails here instead of on the first read. On failure the raw
/// handle is handed back unclosed, alongside the error.
pub(crate) fn open_decoder(
    codec: Codec,
    mut raw: Box<dyn StoreFile>,
) -> Result<Box<dyn DecodeStream>, (DecompFsError, Box<dyn StoreFile>)> {
    let Some(entry) = codec.entry() else {
        let err = DecompFsError::decode(codec, "codec has no decoder");
        return Err((err, raw));
    };

    let head = match read_head(&mut raw, entry.magic.len()) {
        Ok(head) => head,
        Err(e) => {
            let err = DecompFsError::store("Failed to read stream header", e);
            return Err((err, raw));
        }
    };
    if detect_by_magic(&head) != Some(codec) {
        let err = DecompFsError::decode(codec, format!("missing {codec} magic number"));
        return Err((err, raw));
    }

    let source = BufReader::new(Cursor::new(head).chain(raw));
    (entry.decode)(source).map_err(|(e, source)| {
        let err = DecompFsError::decode_io(codec, "Failed to create decoder", e);
        (err, into_raw(source))
    })
}

/// Unwrap a [`Source`] back into the raw handle it reads from
pub(crate) fn into_raw(source: Source) -> Box<dyn StoreFile> {
    source.into_inner().into_inner().1
}

/// Read up to `len` bytes, stopping early only at end of stream
fn read_head<R: Read + ?Sized>(raw: &mut R, len: usize) -> io::Result<Vec<u8>> {
    let mut head = Vec::with_capacity(len);
    raw.take(len as u64).read_to_end(&mut head)?;
    Ok(head)
}

fn decode_gzip(source: Source) -> Decoded {
    Ok(Box::new(flate2::bufread::MultiGzDecoder::new(source)))
}

fn decode_bzip2(source: Source) -> Decoded {
    Ok(Box::new(bzip2::bufread::MultiBzDecoder::new(source)))
}

fn decode_zstd(source: Source) -> Decoded {
    // The context is created first so a failure still leaves us the source
    match zstd::stream::raw::Decoder::new() {
        Ok(context) => Ok(Box::new(zstd::stream::zio::Reader::new(source, context))),
        Err(e) => Err((e, source)),
    }
}

fn decode_lz4(source: Source) -> Decoded {
    Ok(Box::new(lz4_flex::frame::FrameDecoder::new(source)))
}

impl DecodeStream for flate2::bufread::MultiGzDecoder<Source> {
    fn release(self: Box<Self>) -> (io::Result<()>, Source) {
        (Ok(()), (*self).into_inner())
    }
}

impl DecodeStream for bzip2::bufread::MultiBzDecoder<Source> {
    fn release(self: Box<Self>) -> (io::Result<()>, Source) {
        (Ok(()), (*self).into_inner())
    }
}

impl DecodeStream for zstd::stream::zio::Reader<Source, zstd::stream::raw::Decoder<'static>> {
    fn release(self: Box<Self>) -> (io::Result<()>, Source) {
        // Dropping the operation frees the native decompression context
        (Ok(()), (*self).into_inner())
    }
}

impl DecodeStream for lz4_flex::frame::FrameDecoder<Source> {
    fn release(self: Box<Self>) -> (io::Result<()>, Source) {
        (Ok(()), (*self).into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore};
    use std::io::Write;

    #[test]
    fn test_detect_gzip_magic() {
        let magic = [0x1f, 0x8b, 0x08, 0x00];
        assert_eq!(detect_by_magic(&magic), Some(Codec::Gzip));
    }

    #[test]
    fn test_detect_bzip2_magic() {
        let magic = [0x42, 0x5a, 0x68, 0x39];
        assert_eq!(detect_by_magic(&magic), Some(Codec::Bzip2));
    }

    #[test]
    fn test_detect_zstd_magic() {
        let magic = [0x28, 0xb5, 0x2f, 0xfd];
        assert_eq!(detect_by_magic(&magic), Some(Codec::Zstd));
    }

    #[test]
    fn test_detect_lz4_magic() {
        let magic = [0x04, 0x22, 0x4d, 0x18, 0x64];
        assert_eq!(detect_by_magic(&magic), Some(Codec::Lz4));
    }

    #[test]
    fn test_detect_zstd_skippable_frame() {
        assert_eq!(detect_by_magic(&[0x50, 0x2a, 0x4d, 0x18]), Some(Codec::Zstd));
        assert_eq!(detect_by_magic(&[0x5f, 0x2a, 0x4d, 0x18, 0x00]), Some(Codec::Zstd));
        assert_eq!(detect_by_magic(&[0x60, 0x2a, 0x4d, 0x18]), None);
        assert_eq!(detect_by_magic(&[0x50, 0x2a, 0x4d]), None);
    }

    #[test]
    fn test_detect_no_compression() {
        let magic = [0x00, 0x00, 0x00, 0x00];
        assert_eq!(detect_by_magic(&magic), None);
        assert_eq!(detect_by_magic(&[0x1f]), None);
    }

    #[test]
    fn test_probe_order_is_fixed() {
        let order: Vec<Codec> = probe_order().collect();
        assert_eq!(order, vec![Codec::Gzip, Codec::Bzip2, Codec::Zstd, Codec::Lz4]);
    }

    #[test]
    fn test_codec_methods() {
        assert!(!Codec::None.is_compressed());
        assert!(Codec::Gzip.is_compressed());
        assert_eq!(Codec::None.suffix(), "");
        assert_eq!(Codec::Bzip2.suffix(), ".bz2");
        assert_eq!(Codec::Zstd.name(), "zstd");
        assert_eq!(Codec::Lz4.to_string(), "lz4");
    }

    #[test]
    fn test_strip_suffix() {
        assert_eq!(strip_suffix("a.txt.gz"), Some((Codec::Gzip, "a.txt")));
        assert_eq!(strip_suffix("a.txt.bz2"), Some((Codec::Bzip2, "a.txt")));
        assert_eq!(strip_suffix("a.txt.zst"), Some((Codec::Zstd, "a.txt")));
        assert_eq!(strip_suffix("a.txt.lz4"), Some((Codec::Lz4, "a.txt")));
        assert_eq!(strip_suffix("x.bz2.gz"), Some((Codec::Gzip, "x.bz2")));
        assert_eq!(strip_suffix("a.txt"), None);
        assert_eq!(strip_suffix("a.GZ"), None);
        assert_eq!(strip_suffix(".gz"), None);
        assert_eq!(strip_suffix("archive.tgz"), None);
    }

    #[test]
    fn test_open_decoder_streams_gzip() {
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"hello gzip").unwrap();
        let store = MemoryStore::with_files([("a.gz", encoder.finish().unwrap())]).unwrap();

        let raw = store.open("a.gz").unwrap();
        let mut decoder = open_decoder(Codec::Gzip, raw).map_err(|(e, _)| e).unwrap();
        let mut content = String::new();
        decoder.read_to_string(&mut content).unwrap();
        assert_eq!(content, "hello gzip");

        let (released, source) = decoder.release();
        released.unwrap();
        into_raw(source).close().unwrap();
    }

    #[test]
    fn test_open_decoder_rejects_bad_magic() {
        let store = MemoryStore::with_files([("a.zst", "plain text")]).unwrap();
        let raw = store.open("a.zst").unwrap();

        let (err, raw) = open_decoder(Codec::Zstd, raw).err().unwrap();
        assert!(matches!(err, DecompFsError::DecodeError { codec: Codec::Zstd, .. }));
        raw.close().unwrap();
    }

    #[test]
    fn test_open_decoder_rejects_short_stream() {
        let store = MemoryStore::with_files([("a.lz4", vec![0x04, 0x22])]).unwrap();
        let raw = store.open("a.lz4").unwrap();
        let (err, _raw) = open_decoder(Codec::Lz4, raw).err().unwrap();
        assert!(matches!(err, DecompFsError::DecodeError { .. }));
    }

    #[test]
    fn test_open_decoder_rejects_none() {
        let store = MemoryStore::with_files([("a", "x")]).unwrap();
        let raw = store.open("a").unwrap();
        let (err, _raw) = open_decoder(Codec::None, raw).err().unwrap();
        assert!(matches!(err, DecompFsError::DecodeError { codec: Codec::None, .. }));
    }
}
