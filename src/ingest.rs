//! Record assembly and the pipeline driver.
//!
//! The original corpus handlers kept their parse state in flags shared
//! between callbacks; here it is an explicit state machine consuming the
//! pulled event sequence, so the transitions and buffer ownership are
//! testable without a parser in front.

use std::io::BufRead;

use tracing::{info, warn};

use crate::error::{CrawldexError, Result};
use crate::markup::{MarkupEvent, MarkupParser};
use crate::sink::RecordSink;

/// Root elements of the two corpus schema variants.
const ROOT_ELEMENTS: [&str; 2] = ["crawleddata", "dmoz"];
/// Elements that delimit one record.
const RECORD_ELEMENTS: [&str; 2] = ["page", "webpage"];
/// The field whose character data becomes the record content.
const CONTENT_ELEMENT: &str = "content";
/// Attribute on the record element carrying the page identifier.
const URL_ATTRIBUTE: &str = "url";

/// One parsed page. Immutable once emitted, consumed exactly once by a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Page identifier, captured verbatim from the `url` attribute. Empty
    /// when the schema variant carries no URL.
    pub url: String,
    /// Accumulated character data of the content field.
    pub content: String,
}

/// Signals surfaced to the driver alongside ordinary record completion.
#[derive(Debug, PartialEq, Eq)]
pub enum Signal {
    /// The corpus root element opened; the run is underway.
    Started,
    /// A record element closed and its snapshot is ready for the sink.
    Completed(Record),
    /// The corpus root element closed; the run is complete.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    InRecord,
    InContent,
}

/// State machine turning markup events into completed [`Record`]s.
///
/// At most one record is open at a time. The content buffer is reused
/// across records: cleared, never reallocated, when a content field (or a
/// new record) opens.
pub struct RecordAssembler {
    state: State,
    current_url: String,
    content: String,
}

impl RecordAssembler {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            current_url: String::new(),
            content: String::new(),
        }
    }

    /// Applies one event and reports any resulting signal.
    ///
    /// Character data is only accumulated while a content field is open;
    /// everything else (whitespace between elements, other child fields)
    /// is discarded so it cannot leak into record content.
    pub fn apply(&mut self, event: &MarkupEvent) -> Option<Signal> {
        match event {
            MarkupEvent::ElementStart { name, attributes } => {
                if ROOT_ELEMENTS.contains(&name.as_str()) {
                    self.reset();
                    return Some(Signal::Started);
                }
                if self.state == State::Idle && RECORD_ELEMENTS.contains(&name.as_str()) {
                    self.state = State::InRecord;
                    self.current_url.clear();
                    self.content.clear();
                    if let Some((_, value)) = attributes
                        .iter()
                        .find(|(key, _)| key == URL_ATTRIBUTE)
                    {
                        self.current_url.push_str(value);
                    }
                } else if self.state == State::InRecord && name == CONTENT_ELEMENT {
                    self.state = State::InContent;
                    self.content.clear();
                }
                None
            }
            MarkupEvent::Characters(text) => {
                if self.state == State::InContent {
                    self.content.push_str(text);
                }
                None
            }
            MarkupEvent::ElementEnd { name } => {
                if self.state == State::InContent && name == CONTENT_ELEMENT {
                    self.state = State::InRecord;
                    return None;
                }
                if self.state == State::InRecord && RECORD_ELEMENTS.contains(&name.as_str()) {
                    self.state = State::Idle;
                    // The sink gets an independent snapshot; the buffer
                    // itself stays allocated for the next record.
                    return Some(Signal::Completed(Record {
                        url: std::mem::take(&mut self.current_url),
                        content: self.content.clone(),
                    }));
                }
                if ROOT_ELEMENTS.contains(&name.as_str()) {
                    return Some(Signal::Finished);
                }
                None
            }
        }
    }

    fn reset(&mut self) {
        self.state = State::Idle;
        self.current_url.clear();
        self.content.clear();
    }
}

impl Default for RecordAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives a parsed event stream into a sink until the corpus root closes.
///
/// On success the sink is finalized exactly once and the completed-record
/// count is returned. On failure the sink is still released (best effort)
/// so documents it already buffered are not lost, and the original error
/// is propagated; nothing already flushed is rolled back.
pub fn run_pipeline<R, S>(parser: &mut MarkupParser<R>, sink: &mut S) -> Result<u64>
where
    R: BufRead,
    S: RecordSink,
{
    match drive(parser, sink) {
        Ok(()) => {
            sink.finalize()?;
            Ok(sink.records_completed())
        }
        Err(err) => {
            if let Err(cleanup) = sink.abort() {
                warn!(error = %cleanup, "sink cleanup failed after aborted run");
            }
            Err(err)
        }
    }
}

fn drive<R, S>(parser: &mut MarkupParser<R>, sink: &mut S) -> Result<()>
where
    R: BufRead,
    S: RecordSink,
{
    let mut assembler = RecordAssembler::new();
    loop {
        let Some(event) = parser.next_event()? else {
            return Err(CrawldexError::Parse {
                position: parser.position(),
                reason: "stream ended before the corpus root element closed".into(),
            });
        };
        match assembler.apply(&event) {
            Some(Signal::Started) => info!("parsing started"),
            Some(Signal::Completed(record)) => sink.accept(record)?,
            Some(Signal::Finished) => {
                info!(records = sink.records_completed(), "parsing completed");
                return Ok(());
            }
            None => {}
        }
    }
}
