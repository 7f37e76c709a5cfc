//! Text analysis shared by the index and the dictionary.
//!
//! A single tokenizer pipeline stands behind both outputs: it is
//! registered on the index for the stored fields and reused directly when
//! accumulating dictionary counts, so a token means the same thing in
//! both artifacts.

use std::collections::HashSet;

use tantivy::tokenizer::{
    Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, StopWordFilter,
    TextAnalyzer,
};

/// Registration name of the content analyzer inside the index.
pub const CONTENT_TOKENIZER: &str = "crawl_text";

/// Maximum token length kept by the pipeline; crawled pages contain long
/// unbroken junk runs (base64 blobs, concatenated URLs) that would bloat
/// the dictionary.
const MAX_TOKEN_LEN: usize = 40;

/// Builds the analyzer used for page content: split on non-alphanumeric
/// boundaries, drop overlong tokens, lowercase, remove English stop words,
/// stem.
pub fn content_analyzer() -> TextAnalyzer {
    let stop_words = StopWordFilter::new(Language::English)
        .unwrap_or_else(|| StopWordFilter::remove(Vec::<String>::new()));
    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
        .filter(LowerCaser)
        .filter(stop_words)
        .filter(Stemmer::new(Language::English))
        .build()
}

/// Tokenizes `text` and reduces it to the set of distinct tokens.
///
/// Dictionary counts are document frequencies, so repetition within one
/// record must collapse to a single occurrence before counting.
pub fn distinct_tokens(analyzer: &mut TextAnalyzer, text: &str) -> HashSet<String> {
    let mut tokens = HashSet::new();
    let mut stream = analyzer.token_stream(text);
    while stream.advance() {
        tokens.insert(stream.token().text.clone());
    }
    tokens
}
