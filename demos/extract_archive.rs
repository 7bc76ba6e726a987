//! Extracts a downloaded FFIEC bulk archive into a JSON record set.
//!
//! ```sh
//! cargo run --example extract_archive -- "FFIEC CDR Call Bulk XBRL 06302009.zip" > facts.json
//! ```

use ffieckit::{ArchiveConfig, ArchiveExtractor};
use std::io::{self, Write};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: extract_archive <bulk-archive.zip>")?;

    let extractor = ArchiveExtractor::new(ArchiveConfig::default());

    let stdout = io::stdout();
    let mut sink = stdout.lock();
    let summary = extractor.extract_path(&path, &mut sink)?;
    sink.write_all(b"\n")?;

    eprintln!(
        "{} filings processed, {} skipped, {} records",
        summary.processed, summary.skipped, summary.records
    );
    Ok(())
}
