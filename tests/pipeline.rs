//! End-to-end pipeline tests: compressed corpus in, index or dictionary out.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use bzip2::Compression;
use bzip2::write::BzEncoder;
use crawldex::{
    CrawldexError, DictionaryBuildSink, DictionaryOptions, IndexBuildSink, IndexOptions,
    MarkupParser, WriteFailurePolicy, build_dictionary, build_index, run_pipeline,
};
use tantivy::schema::{TantivyDocument, Value};
use tantivy::{DocAddress, Index};
use tempfile::TempDir;

const CRAWL_CORPUS: &str = "<crawledData>\
<page url=\"http://a\"><content>hello world</content></page>\
<page url=\"http://b\"><content>hello</content></page>\
</crawledData>";

const DMOZ_CORPUS: &str = "<DMOZ>\
<webpage><content>hello world</content></webpage>\
<webpage><content>hello</content></webpage>\
</DMOZ>";

fn small_index_options() -> IndexOptions {
    IndexOptions {
        writer_heap_bytes: 64 * 1024 * 1024,
        progress_interval: 0,
    }
}

fn dictionary_options(min_df: u64) -> DictionaryOptions {
    DictionaryOptions {
        min_document_frequency: min_df,
        progress_interval: 0,
        on_write_error: WriteFailurePolicy::FailFast,
    }
}

/// Writes `xml` as a bzip2-compressed corpus file and returns its path.
fn write_corpus(dir: &Path, xml: &str) -> PathBuf {
    let path = dir.join("corpus.xml.bz2");
    let mut encoder = BzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(xml.as_bytes()).expect("compress corpus");
    let compressed = encoder.finish().expect("finish compression");
    fs_err::write(&path, compressed).expect("write corpus file");
    path
}

/// Reads every stored (clicked_url, content) pair out of an index.
fn stored_pairs(index_dir: &Path) -> Vec<(String, String)> {
    let index = Index::open_in_dir(index_dir).expect("open index");
    let schema = index.schema();
    let content = schema.get_field("content").expect("content field");
    let clicked_url = schema.get_field("clicked_url").expect("clicked_url field");
    let searcher = index.reader().expect("reader").searcher();

    let mut pairs = Vec::new();
    for (ord, segment) in searcher.segment_readers().iter().enumerate() {
        for doc_id in 0..segment.max_doc() {
            let doc: TantivyDocument = searcher
                .doc(DocAddress::new(ord as u32, doc_id))
                .expect("stored document");
            let url = doc
                .get_first(clicked_url)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_owned();
            let text = doc
                .get_first(content)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_owned();
            pairs.push((url, text));
        }
    }
    pairs.sort();
    pairs
}

fn read_dictionary(path: &Path) -> (u64, HashMap<String, u64>) {
    let text = fs_err::read_to_string(path).expect("read dictionary");
    let mut lines = text.lines();
    let header: u64 = lines
        .next()
        .expect("header line")
        .parse()
        .expect("numeric header");
    let mut entries = HashMap::new();
    for line in lines {
        let (token, df) = line.split_once('\t').expect("token\\tfrequency line");
        entries.insert(token.to_owned(), df.parse().expect("numeric frequency"));
    }
    (header, entries)
}

#[test]
fn index_build_end_to_end() {
    let dir = TempDir::new().expect("tmp");
    let corpus = write_corpus(dir.path(), CRAWL_CORPUS);
    let index_dir = dir.path().join("index");

    let records =
        build_index(&corpus, &index_dir, &small_index_options()).expect("index build");
    assert_eq!(records, 2);

    let pairs = stored_pairs(&index_dir);
    assert_eq!(
        pairs,
        vec![
            ("http://a".to_owned(), "hello world".to_owned()),
            ("http://b".to_owned(), "hello".to_owned()),
        ]
    );
}

#[test]
fn rebuilding_replaces_the_index_instead_of_appending() {
    let dir = TempDir::new().expect("tmp");
    let corpus = write_corpus(dir.path(), CRAWL_CORPUS);
    let index_dir = dir.path().join("index");

    let first = build_index(&corpus, &index_dir, &small_index_options()).expect("first run");
    let second = build_index(&corpus, &index_dir, &small_index_options()).expect("second run");
    assert_eq!(first, 2);
    assert_eq!(second, 2);

    let index = Index::open_in_dir(&index_dir).expect("open index");
    let searcher = index.reader().expect("reader").searcher();
    assert_eq!(searcher.num_docs(), 2, "store must be replaced, not doubled");
}

#[test]
fn dictionary_build_end_to_end_with_threshold_one() {
    let dir = TempDir::new().expect("tmp");
    let corpus = write_corpus(dir.path(), DMOZ_CORPUS);
    let output = dir.path().join("dictionary");

    let records =
        build_dictionary(&corpus, &output, &dictionary_options(1)).expect("dictionary build");
    assert_eq!(records, 2);

    let (header, entries) = read_dictionary(&output);
    assert_eq!(entries.get("hello"), Some(&2));
    assert_eq!(entries.get("world"), Some(&1));
    assert_eq!(entries.len(), 2);
    assert_eq!(header, 3);
}

#[test]
fn default_threshold_filters_sparse_tokens() {
    let dir = TempDir::new().expect("tmp");
    let mut xml = String::from("<DMOZ>");
    // "common" reaches the default threshold of 10, "rare" stops at 9.
    for i in 0..10 {
        if i < 9 {
            xml.push_str("<webpage><content>common rare</content></webpage>");
        } else {
            xml.push_str("<webpage><content>common</content></webpage>");
        }
    }
    xml.push_str("</DMOZ>");
    let corpus = write_corpus(dir.path(), &xml);
    let output = dir.path().join("dictionary");

    let records = build_dictionary(&corpus, &output, &DictionaryOptions::default())
        .expect("dictionary build");
    assert_eq!(records, 10);

    let (header, entries) = read_dictionary(&output);
    assert_eq!(entries.get("common"), Some(&10));
    assert_eq!(entries.len(), 1);
    assert_eq!(header, 10);
}

#[test]
fn truncated_corpus_fails_with_parse_error_for_both_sinks() {
    let dir = TempDir::new().expect("tmp");
    let truncated = "<crawledData><page url=\"http://a\"><content>hello";
    let corpus = write_corpus(dir.path(), truncated);

    let index_dir = dir.path().join("index");
    let err = build_index(&corpus, &index_dir, &small_index_options())
        .expect_err("truncated stream must fail");
    assert!(matches!(err, CrawldexError::Parse { .. }), "got {err}");

    let output = dir.path().join("dictionary");
    let err = build_dictionary(&corpus, &output, &dictionary_options(1))
        .expect_err("truncated stream must fail");
    assert!(matches!(err, CrawldexError::Parse { .. }), "got {err}");
    assert!(!output.exists(), "failed dictionary run must not publish output");
}

#[test]
fn corpus_without_marker_fails_before_parsing() {
    let dir = TempDir::new().expect("tmp");
    let path = dir.path().join("corpus.xml.bz2");
    fs_err::write(&path, b"<crawledData></crawledData>").expect("write");

    let err = build_index(&path, &dir.path().join("index"), &small_index_options())
        .expect_err("unframed input must fail");
    assert!(matches!(err, CrawldexError::CorruptStream { .. }), "got {err}");
}

#[test]
fn tag_case_is_folded_across_the_whole_pipeline() {
    let dir = TempDir::new().expect("tmp");
    let xml = "<CRAWLEDDATA>\
<PAGE url=\"http://mixed\"><CONTENT>mixed case tags</CONTENT></PAGE>\
</CRAWLEDDATA>";
    let mut parser = MarkupParser::new(xml.as_bytes());
    let index_dir = dir.path().join("index");
    let mut sink = IndexBuildSink::create(&index_dir, &small_index_options()).expect("create");

    let records = run_pipeline(&mut parser, &mut sink).expect("pipeline");
    assert_eq!(records, 1);
    assert_eq!(
        stored_pairs(&index_dir),
        vec![("http://mixed".to_owned(), "mixed case tags".to_owned())]
    );
}

#[test]
fn whitespace_and_siblings_outside_content_do_not_reach_the_record() {
    let dir = TempDir::new().expect("tmp");
    let xml = "<crawledData>\n  \
<page url=\"http://a\">\n    <title>ignored</title>\n    \
<content>only this</content>\n  </page>\n\
</crawledData>";
    let mut parser = MarkupParser::new(xml.as_bytes());
    let output = dir.path().join("dictionary");
    let mut sink = DictionaryBuildSink::create(&output, &dictionary_options(1)).expect("create");

    run_pipeline(&mut parser, &mut sink).expect("pipeline");

    let (_, entries) = read_dictionary(&output);
    assert!(entries.contains_key("onli") || entries.contains_key("only"));
    assert!(
        !entries.keys().any(|t| t.starts_with("ignor")),
        "sibling element text leaked into content: {entries:?}"
    );
}
