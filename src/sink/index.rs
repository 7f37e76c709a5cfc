//! Index-build termination: records become documents in a tantivy store.

use std::path::Path;

use tantivy::schema::{Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions};
use tantivy::{Index, IndexWriter, doc};

use crate::analysis::{CONTENT_TOKENIZER, content_analyzer};
use crate::error::{CrawldexError, Result};
use crate::ingest::Record;
use crate::options::IndexOptions;
use crate::sink::{Progress, RecordSink};

/// Stored field holding the page content.
pub const CONTENT_FIELD: &str = "content";
/// Stored field holding the page URL.
pub const CLICKED_URL_FIELD: &str = "clicked_url";

/// Writes completed records into a fresh on-disk index.
///
/// The index is always created in overwrite mode: whatever lived at the
/// target path before the run is destroyed, never appended to. Both
/// fields are indexed with positions and stored verbatim.
pub struct IndexBuildSink {
    writer: Option<IndexWriter>,
    content: Field,
    clicked_url: Field,
    progress: Progress,
}

impl IndexBuildSink {
    /// Creates the index directory, registers the content analyzer and
    /// opens the single writer with the configured buffer budget.
    pub fn create(index_dir: &Path, options: &IndexOptions) -> Result<Self> {
        if index_dir.exists() {
            fs_err::remove_dir_all(index_dir)?;
        }
        fs_err::create_dir_all(index_dir)?;

        let mut schema_builder = Schema::builder();
        let indexing = TextFieldIndexing::default()
            .set_tokenizer(CONTENT_TOKENIZER)
            .set_index_option(IndexRecordOption::WithFreqsAndPositions);
        let field_options = TextOptions::default()
            .set_indexing_options(indexing)
            .set_stored();
        let content = schema_builder.add_text_field(CONTENT_FIELD, field_options.clone());
        let clicked_url = schema_builder.add_text_field(CLICKED_URL_FIELD, field_options);
        let schema = schema_builder.build();

        let index = Index::create_in_dir(index_dir, schema)?;
        index
            .tokenizers()
            .register(CONTENT_TOKENIZER, content_analyzer());
        let writer: IndexWriter =
            index.writer_with_num_threads(1, options.writer_heap_bytes)?;

        Ok(Self {
            writer: Some(writer),
            content,
            clicked_url,
            progress: Progress::new(options.progress_interval),
        })
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.commit()?;
            writer.wait_merging_threads()?;
        }
        Ok(())
    }
}

impl RecordSink for IndexBuildSink {
    fn accept(&mut self, record: Record) -> Result<()> {
        let writer = self.writer.as_ref().ok_or(CrawldexError::SinkClosed)?;
        writer.add_document(doc!(
            self.content => record.content,
            self.clicked_url => record.url,
        ))?;
        self.progress.record_completed();
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.close()
    }

    fn abort(&mut self) -> Result<()> {
        // Closing commits whatever the writer buffered before the failure;
        // documents flushed by an interrupted run stay durable.
        self.close()
    }

    fn records_completed(&self) -> u64 {
        self.progress.completed()
    }
}
