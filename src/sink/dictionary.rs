//! Dictionary-build termination: records become document-frequency counts.

use std::collections::HashMap;
use std::io::{BufWriter, Write};
use std::path::Path;

use atomic_write_file::AtomicWriteFile;
use tantivy::tokenizer::TextAnalyzer;
use tracing::{info, warn};

use crate::analysis::{content_analyzer, distinct_tokens};
use crate::error::{CrawldexError, Result};
use crate::ingest::Record;
use crate::options::{DictionaryOptions, WriteFailurePolicy};
use crate::sink::{Progress, RecordSink};

/// Accumulates per-token distinct-document counts and writes the filtered
/// vocabulary on finalize.
///
/// The vocabulary map is the one deliberately unbounded structure in the
/// pipeline; it grows with distinct-token cardinality. Output goes through
/// a temporary file renamed into place on successful finalize, so a failed
/// run leaves no partial dictionary behind.
pub struct DictionaryBuildSink {
    output: Option<AtomicWriteFile>,
    analyzer: TextAnalyzer,
    document_frequency: HashMap<String, u64>,
    min_document_frequency: u64,
    on_write_error: WriteFailurePolicy,
    progress: Progress,
}

impl DictionaryBuildSink {
    /// Opens the output destination eagerly so an unwritable path fails
    /// before any parsing starts.
    pub fn create(output_path: &Path, options: &DictionaryOptions) -> Result<Self> {
        let output = AtomicWriteFile::open(output_path)?;
        Ok(Self {
            output: Some(output),
            analyzer: content_analyzer(),
            document_frequency: HashMap::new(),
            min_document_frequency: options.min_document_frequency,
            on_write_error: options.on_write_error,
            progress: Progress::new(options.progress_interval),
        })
    }
}

impl RecordSink for DictionaryBuildSink {
    fn accept(&mut self, record: Record) -> Result<()> {
        if self.output.is_none() {
            return Err(CrawldexError::SinkClosed);
        }
        // Distinct tokens only: a token repeated inside one record bumps
        // its document frequency by exactly one.
        for token in distinct_tokens(&mut self.analyzer, &record.content) {
            *self.document_frequency.entry(token).or_insert(0) += 1;
        }
        self.progress.record_completed();
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let file = self.output.take().ok_or(CrawldexError::SinkClosed)?;
        let mut out = BufWriter::new(file);

        // The header is the sum of the frequencies that survive the
        // threshold, computed before the emission loop so header and body
        // agree on disk.
        let total: u64 = self
            .document_frequency
            .values()
            .filter(|&&df| df >= self.min_document_frequency)
            .sum();
        writeln!(out, "{total}")?;

        for (token, df) in &self.document_frequency {
            if *df < self.min_document_frequency {
                continue;
            }
            if let Err(err) = writeln!(out, "{token}\t{df}") {
                match self.on_write_error {
                    WriteFailurePolicy::FailFast => return Err(err.into()),
                    WriteFailurePolicy::SkipAndLog => {
                        warn!(%token, error = %err, "dropping dictionary entry after write failure");
                    }
                }
            }
        }

        out.flush()?;
        let file = out
            .into_inner()
            .map_err(|err| CrawldexError::Io(err.into_error()))?;
        file.commit()?;
        info!(total, "dictionary written");
        Ok(())
    }

    fn abort(&mut self) -> Result<()> {
        // Discarding drops the temporary file; the target path is left
        // exactly as it was before the run.
        if let Some(file) = self.output.take() {
            file.discard()?;
        }
        Ok(())
    }

    fn records_completed(&self) -> u64 {
        self.progress.completed()
    }
}
