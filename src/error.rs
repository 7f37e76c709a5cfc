//! Error taxonomy for the ingestion pipeline.
//!
//! Every failure in the pipeline is fatal: there are no retries and no
//! rollback of work already flushed by a sink. Callers get the first error
//! and the process exits non-zero.

use std::borrow::Cow;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CrawldexError>;

#[derive(Debug, thiserror::Error)]
pub enum CrawldexError {
    /// The compressed input is not framed the way the corpus requires
    /// (missing or wrong stream marker, truncated header).
    #[error("corrupt compressed stream: {reason}")]
    CorruptStream { reason: Cow<'static, str> },

    /// Malformed markup mid-stream. `position` is the byte offset into the
    /// decompressed stream where the parser gave up.
    #[error("malformed markup at byte {position}: {reason}")]
    Parse { position: u64, reason: String },

    /// The index store rejected a document or failed to commit.
    #[error("index store error: {0}")]
    Store(#[from] tantivy::TantivyError),

    /// I/O failure opening or writing an output destination.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A sink was used after `finalize` or `abort` released its resources.
    #[error("sink already finalized")]
    SinkClosed,
}
