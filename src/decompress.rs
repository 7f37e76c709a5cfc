//! Corpus decompression framing.
//!
//! Corpus files are standard bzip2 streams. The first two bytes are the
//! fixed `BZ` format marker; everything after it is the block-compressed
//! payload. The reader validates the marker up front so a mis-framed file
//! fails before any record is parsed, then exposes the decompressed bytes
//! as a forward-only stream.

use std::io::{Cursor, Read};

use bzip2::read::BzDecoder;

use crate::error::{CrawldexError, Result};

/// The two-byte format marker every corpus file must start with.
pub const STREAM_MARKER: [u8; 2] = *b"BZ";

/// Forward-only decompressed view of a marked corpus stream.
///
/// Single consumer, no random access. Decompression failures past the
/// marker surface as `io::Error` from `read`.
pub struct CorpusDecompressor<R: Read> {
    inner: BzDecoder<std::io::Chain<Cursor<[u8; 2]>, R>>,
}

impl<R: Read> std::fmt::Debug for CorpusDecompressor<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorpusDecompressor").finish_non_exhaustive()
    }
}

impl<R: Read> CorpusDecompressor<R> {
    /// Consumes and validates the stream marker, then positions the
    /// decoder over the compressed payload.
    pub fn new(mut source: R) -> Result<Self> {
        let mut marker = [0u8; 2];
        source
            .read_exact(&mut marker)
            .map_err(|_| CrawldexError::CorruptStream {
                reason: "stream shorter than the 2-byte format marker".into(),
            })?;
        if marker != STREAM_MARKER {
            return Err(CrawldexError::CorruptStream {
                reason: "missing BZ format marker".into(),
            });
        }
        // The decoder checks the magic itself, so replay the bytes that
        // were just validated ahead of the remaining source.
        let framed = Cursor::new(STREAM_MARKER).chain(source);
        Ok(Self {
            inner: BzDecoder::new(framed),
        })
    }
}

impl<R: Read> Read for CorpusDecompressor<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}
