//! Builds the frequency-filtered vocabulary from a compressed crawl corpus.
//!
//! Usage: `build_dictionary <corpus.xml.bz2> <dictionary-file>`

use std::path::Path;
use std::process::ExitCode;

use crawldex::{DictionaryOptions, build_dictionary};

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let (Some(corpus), Some(output)) = (args.next(), args.next()) else {
        eprintln!("usage: build_dictionary <corpus.xml.bz2> <dictionary-file>");
        return ExitCode::from(2);
    };

    match build_dictionary(
        Path::new(&corpus),
        Path::new(&output),
        &DictionaryOptions::default(),
    ) {
        Ok(records) => {
            println!("{records} pages consumed, dictionary written to {output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("dictionary build failed: {err}");
            ExitCode::FAILURE
        }
    }
}
