//! Pipeline terminations.
//!
//! A sink consumes completed records one at a time and owns whatever
//! destination it writes to for the duration of one run. The driver calls
//! `finalize` exactly once on success and `abort` on failure; a sink must
//! not be usable afterwards.

use tracing::info;

use crate::error::Result;
use crate::ingest::Record;

mod dictionary;
mod index;

pub use dictionary::DictionaryBuildSink;
pub use index::IndexBuildSink;

/// A consumer of completed records.
pub trait RecordSink {
    /// Commits one record. Failures are fatal to the run; there is no
    /// retry or compensating transaction.
    fn accept(&mut self, record: Record) -> Result<()>;

    /// Releases the destination after a successful run, durably flushing
    /// anything still buffered. Called exactly once.
    fn finalize(&mut self) -> Result<()>;

    /// Releases the destination after a failed run. Best effort; the
    /// driver logs (rather than propagates) errors from here so the
    /// original failure stays visible.
    fn abort(&mut self) -> Result<()>;

    /// Records committed so far. Equals the number of well-formed records
    /// in the input after a successful run.
    fn records_completed(&self) -> u64;
}

/// Completed-record counter with periodic progress reporting.
///
/// Incremented once per successful commit, never skipped or doubled; the
/// reporting is informational only.
pub(crate) struct Progress {
    completed: u64,
    interval: u64,
}

impl Progress {
    pub(crate) fn new(interval: u64) -> Self {
        Self {
            completed: 0,
            interval,
        }
    }

    pub(crate) fn record_completed(&mut self) {
        self.completed += 1;
        if self.interval > 0 && self.completed % self.interval == 0 {
            info!(completed = self.completed, "pages completed");
        }
    }

    pub(crate) fn completed(&self) -> u64 {
        self.completed
    }
}
