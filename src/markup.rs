//! Streaming markup parser.
//!
//! Pull-based wrapper over `quick_xml` that turns a byte stream into a
//! sequence of structural events. Element names are ASCII-case-folded on
//! the way out because corpus files do not use consistent tag casing. The
//! parser never holds more than the current event's text in memory; the
//! scratch buffer is reused between events, which is what lets the
//! pipeline walk an arbitrarily large corpus.

use std::fmt::Display;
use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{CrawldexError, Result};

/// One structural event, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    /// Opening tag. `name` is lowercased; attribute values are unescaped
    /// and kept verbatim otherwise.
    ElementStart {
        name: String,
        attributes: Vec<(String, String)>,
    },
    /// Character data, text and CDATA alike.
    Characters(String),
    /// Closing tag, name lowercased.
    ElementEnd { name: String },
}

/// Streaming event reader over any buffered byte source.
pub struct MarkupParser<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    /// Lowercased names of currently open elements, used to report
    /// truncation (EOF with unclosed elements) as a parse failure.
    open: Vec<String>,
    /// Close event queued by a self-closing tag.
    pending_end: Option<MarkupEvent>,
}

impl<R: BufRead> MarkupParser<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: Reader::from_reader(source),
            buf: Vec::with_capacity(8 * 1024),
            open: Vec::new(),
            pending_end: None,
        }
    }

    /// Byte offset into the decompressed stream, for error reporting.
    pub fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    /// Returns the next event, or `None` once the stream is exhausted.
    ///
    /// A stream that ends while elements are still open is malformed and
    /// fails here rather than silently yielding a partial document.
    pub fn next_event(&mut self) -> Result<Option<MarkupEvent>> {
        if let Some(end) = self.pending_end.take() {
            return Ok(Some(end));
        }

        loop {
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(err) => {
                    return Err(parse_error(self.reader.buffer_position() as u64, err));
                }
            };
            let position = self.reader.buffer_position() as u64;

            match event {
                Event::Start(ref e) => {
                    let name = fold_name(e.name().as_ref());
                    let attributes = collect_attributes(e, position)?;
                    self.open.push(name.clone());
                    return Ok(Some(MarkupEvent::ElementStart { name, attributes }));
                }
                Event::Empty(ref e) => {
                    // A self-closing element is a start/end pair to callers.
                    let name = fold_name(e.name().as_ref());
                    let attributes = collect_attributes(e, position)?;
                    self.pending_end = Some(MarkupEvent::ElementEnd { name: name.clone() });
                    return Ok(Some(MarkupEvent::ElementStart { name, attributes }));
                }
                Event::End(ref e) => {
                    let name = fold_name(e.name().as_ref());
                    self.open.pop();
                    return Ok(Some(MarkupEvent::ElementEnd { name }));
                }
                Event::Text(ref e) => {
                    let text = e
                        .unescape()
                        .map_err(|err| parse_error(position, err))?
                        .into_owned();
                    return Ok(Some(MarkupEvent::Characters(text)));
                }
                Event::CData(ref e) => {
                    let text = String::from_utf8(e.to_vec())
                        .map_err(|err| parse_error(position, err))?;
                    return Ok(Some(MarkupEvent::Characters(text)));
                }
                Event::Eof => {
                    if let Some(unclosed) = self.open.last() {
                        return Err(parse_error(
                            position,
                            format_args!("stream ended inside unclosed element <{unclosed}>"),
                        ));
                    }
                    return Ok(None);
                }
                // Declarations, comments, processing instructions and
                // doctype carry no record data.
                _ => {}
            }
        }
    }
}

fn parse_error(position: u64, reason: impl Display) -> CrawldexError {
    CrawldexError::Parse {
        position,
        reason: reason.to_string(),
    }
}

fn fold_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

fn collect_attributes(
    element: &BytesStart<'_>,
    position: u64,
) -> Result<Vec<(String, String)>> {
    let mut attributes = Vec::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|err| parse_error(position, err))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| parse_error(position, err))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(attributes)
}
