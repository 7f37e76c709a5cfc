//! Run configuration for the two pipeline terminations.

/// How often (in completed records) progress is reported. Zero disables
/// periodic reporting.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 10_000;

/// Default write-buffer budget handed to the index writer. Large on
/// purpose: the corpus is millions of small documents and batching them
/// keeps segment churn down.
pub const DEFAULT_WRITER_HEAP_BYTES: usize = 2 * 1024 * 1024 * 1024;

/// Dictionary entries below this document frequency are omitted.
pub const DEFAULT_MIN_DOCUMENT_FREQUENCY: u64 = 10;

/// Options for an index-build run.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Memory budget for the single-threaded index writer.
    pub writer_heap_bytes: usize,
    /// Progress reporting interval in records; zero disables it.
    pub progress_interval: u64,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            writer_heap_bytes: DEFAULT_WRITER_HEAP_BYTES,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Options for a dictionary-build run.
#[derive(Debug, Clone)]
pub struct DictionaryOptions {
    /// Entries with a document frequency below this are not written.
    pub min_document_frequency: u64,
    /// Progress reporting interval in records; zero disables it.
    pub progress_interval: u64,
    /// What to do when writing a single dictionary entry fails.
    pub on_write_error: WriteFailurePolicy,
}

impl Default for DictionaryOptions {
    fn default() -> Self {
        Self {
            min_document_frequency: DEFAULT_MIN_DOCUMENT_FREQUENCY,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            on_write_error: WriteFailurePolicy::FailFast,
        }
    }
}

/// Policy for per-entry write failures during dictionary emission.
///
/// `SkipAndLog` keeps going past a failed entry. Skipped entries are lost
/// and the header total then overcounts the body; the skip is logged so
/// the loss is never silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteFailurePolicy {
    #[default]
    FailFast,
    SkipAndLog,
}
