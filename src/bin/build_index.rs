//! Builds the inverted index from a compressed crawl corpus.
//!
//! Usage: `build_index <corpus.xml.bz2> <index-dir>`

use std::path::Path;
use std::process::ExitCode;

use crawldex::{IndexOptions, build_index};

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let (Some(corpus), Some(index_dir)) = (args.next(), args.next()) else {
        eprintln!("usage: build_index <corpus.xml.bz2> <index-dir>");
        return ExitCode::from(2);
    };

    match build_index(
        Path::new(&corpus),
        Path::new(&index_dir),
        &IndexOptions::default(),
    ) {
        Ok(records) => {
            println!("{records} documents indexed into {index_dir}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("index build failed: {err}");
            ExitCode::FAILURE
        }
    }
}
