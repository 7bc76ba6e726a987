//! Bulk-data archive extraction.
//!
//! The FFIEC publishes Call Report and UBPR bulk data as ZIP archives
//! holding one XBRL instance document per institution, named with the
//! institution's RSSD identifier (for example
//! `FFIEC CDR Call Schedule RC 06302009 RSSD 123456.xml`), alongside index
//! and schema files that are not filings. [`ArchiveExtractor`] selects the
//! per-institution members, runs each through the
//! [`XbrlParser`](crate::parsing::xbrl::XbrlParser), and streams the
//! normalized records into a caller-supplied sink as one JSON array.
//!
//! One malformed filing never aborts the archive: per-entry failures are
//! reported through `tracing` and counted in [`ExtractSummary`], and the
//! output is valid JSON even when every entry failed. Only an unreadable
//! ZIP container fails the whole call.
//!
//! # Examples
//!
//! ```no_run
//! use ffieckit::{ArchiveConfig, ArchiveExtractor};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bytes = std::fs::read("FFIEC CDR Call Bulk XBRL 06302009.zip")?;
//!
//!     let extractor = ArchiveExtractor::new(ArchiveConfig::default());
//!     let json = extractor.extract_to_string(&bytes)?;
//!
//!     println!("{json}");
//!     Ok(())
//! }
//! ```

use crate::error::Result;
use crate::parsing::xbrl::{XbrlConfig, XbrlParser};
use crate::record::Record;
use crate::writer::RecordWriter;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::ZipArchive;

/// Configuration options for archive extraction.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Substring of a member name marking a per-institution filing.
    pub marker: String,

    /// Maximum number of matching members to process before stopping.
    pub max_entries: Option<usize>,

    /// Settings forwarded to the per-entry XBRL parser.
    pub xbrl: XbrlConfig,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            marker: "RSSD".to_string(),
            max_entries: None,
            xbrl: XbrlConfig::default(),
        }
    }
}

/// Counters describing one extraction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractSummary {
    /// Members matching the selection rule.
    pub selected: usize,

    /// Members successfully normalized (possibly to zero records).
    pub processed: usize,

    /// Members skipped after a per-entry failure.
    pub skipped: usize,

    /// Records written to the sink.
    pub records: usize,
}

pub struct ArchiveExtractor {
    config: ArchiveConfig,
}

impl ArchiveExtractor {
    pub fn new(config: ArchiveConfig) -> Self {
        Self { config }
    }

    /// True for members holding a per-institution instance document.
    fn is_instance_entry(&self, name: &str) -> bool {
        name.ends_with(".xml") && name.contains(&self.config.marker)
    }

    /// Extracts every per-institution filing in `archive`, streaming the
    /// normalized records into `sink` as a pretty-printed JSON array.
    ///
    /// Entries are processed sequentially in archive order; re-invocation
    /// re-parses the archive from the start. The sink receives valid JSON
    /// whenever this returns `Ok`; on `Err` the sink's content is partial
    /// and must be discarded.
    ///
    /// # Errors
    ///
    /// * [`FfiecError::Archive`](crate::FfiecError::Archive) - the bytes
    ///   are not a valid ZIP container
    /// * [`FfiecError::FileError`](crate::FfiecError::FileError) - the sink
    ///   rejected a write
    pub fn extract<R, W>(&self, archive: R, sink: W) -> Result<ExtractSummary>
    where
        R: Read + Seek,
        W: Write,
    {
        let mut zip = ZipArchive::new(archive)?;
        let parser = XbrlParser::new(self.config.xbrl.clone());
        let mut writer = RecordWriter::new(sink)?;
        let mut summary = ExtractSummary::default();

        tracing::info!(members = zip.len(), "scanning archive");

        for index in 0..zip.len() {
            if let Some(max) = self.config.max_entries {
                if summary.selected >= max {
                    break;
                }
            }

            // Read/parse failures are contained to the entry; a sink that
            // rejects a write is fatal, otherwise a half-written record
            // would corrupt the document while still reporting success.
            match self.read_entry(&mut zip, index, &parser, &mut summary) {
                Ok(Some(records)) => {
                    for record in &records {
                        writer.write(record)?;
                    }
                    summary.processed += 1;
                    summary.records += records.len();
                }
                Ok(None) => {}
                Err(err) => {
                    summary.skipped += 1;
                    tracing::warn!(index, error = %err, "skipping archive member");
                }
            }
        }

        writer.finish()?;
        tracing::info!(
            selected = summary.selected,
            processed = summary.processed,
            skipped = summary.skipped,
            records = summary.records,
            "archive extraction finished"
        );
        Ok(summary)
    }

    /// Reads and parses one member. Returns `None` for members outside the
    /// selection rule. Any error here is contained by the caller to this
    /// entry.
    fn read_entry<R>(
        &self,
        zip: &mut ZipArchive<R>,
        index: usize,
        parser: &XbrlParser,
        summary: &mut ExtractSummary,
    ) -> Result<Option<Vec<Record>>>
    where
        R: Read + Seek,
    {
        let mut entry = zip.by_index(index)?;
        let name = entry.name().to_string();
        if !self.is_instance_entry(&name) {
            return Ok(None);
        }
        summary.selected += 1;

        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        let content = String::from_utf8(bytes)?;

        let records = parser.parse(&content)?;
        tracing::debug!(entry = %name, records = records.len(), "processed instance document");
        Ok(Some(records))
    }

    /// Extracts from an in-memory archive, returning the JSON document.
    pub fn extract_to_string(&self, bytes: &[u8]) -> Result<String> {
        let mut out = Vec::new();
        self.extract(Cursor::new(bytes), &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    /// Extracts from an archive on disk, mirroring the bulk-download
    /// workflow where the portal leaves a ZIP in a download directory.
    pub fn extract_path<W: Write>(&self, path: impl AsRef<Path>, sink: W) -> Result<ExtractSummary> {
        let file = File::open(path)?;
        self.extract(BufReader::new(file), sink)
    }
}
