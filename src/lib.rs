#![deny(clippy::all, clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![cfg_attr(test, allow(clippy::uninlined_format_args))]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
// buffer_position is a usize offset; widening it to u64 for error reporting
// is lossless on every supported target.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]

//! crawldex builds search artifacts from bzip2-compressed web-crawl
//! corpora without ever holding the corpus in memory.
//!
//! One streaming pipeline — decompression, incremental markup parsing,
//! per-record accumulation — feeds one of two terminations:
//!
//! - [`build_index`] commits every record to an on-disk inverted index
//!   with stored `content` and `clicked_url` fields.
//! - [`build_dictionary`] counts per-token document frequencies and
//!   writes the vocabulary entries that clear a frequency threshold.
//!
//! A single process, a single pass, a write-once output: there is no
//! query engine, no incremental indexing and no distribution here.

/// The crawldex crate version (matches `Cargo.toml`).
pub const CRAWLDEX_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod analysis;
pub mod decompress;
pub mod error;
pub mod ingest;
pub mod markup;
pub mod options;
pub mod sink;

pub use analysis::{CONTENT_TOKENIZER, content_analyzer, distinct_tokens};
pub use decompress::{CorpusDecompressor, STREAM_MARKER};
pub use error::{CrawldexError, Result};
pub use ingest::{Record, RecordAssembler, Signal, run_pipeline};
pub use markup::{MarkupEvent, MarkupParser};
pub use options::{DictionaryOptions, IndexOptions, WriteFailurePolicy};
pub use sink::{DictionaryBuildSink, IndexBuildSink, RecordSink};

use std::io::BufReader;
use std::path::Path;

/// Decompressed-side read buffer. Corpus blocks are large; a big buffer
/// keeps the parser out of the decompressor's way.
const READ_BUFFER_BYTES: usize = 1024 * 1024;

/// Runs the index-build pipeline: one compressed corpus in, one fresh
/// index directory out. Returns the number of records committed.
pub fn build_index(
    corpus_path: &Path,
    index_dir: &Path,
    options: &IndexOptions,
) -> Result<u64> {
    let mut parser = open_corpus(corpus_path)?;
    let mut sink = IndexBuildSink::create(index_dir, options)?;
    run_pipeline(&mut parser, &mut sink)
}

/// Runs the dictionary-build pipeline: one compressed corpus in, one
/// vocabulary file out. Returns the number of records consumed.
pub fn build_dictionary(
    corpus_path: &Path,
    output_path: &Path,
    options: &DictionaryOptions,
) -> Result<u64> {
    let mut parser = open_corpus(corpus_path)?;
    let mut sink = DictionaryBuildSink::create(output_path, options)?;
    run_pipeline(&mut parser, &mut sink)
}

fn open_corpus(
    corpus_path: &Path,
) -> Result<MarkupParser<BufReader<CorpusDecompressor<fs_err::File>>>> {
    let file = fs_err::File::open(corpus_path)?;
    let decompressor = CorpusDecompressor::new(file)?;
    Ok(MarkupParser::new(BufReader::with_capacity(
        READ_BUFFER_BYTES,
        decompressor,
    )))
}
