//! # FfiecKit - Rust tooling for FFIEC bulk regulatory data
//!
//! FfiecKit converts the FFIEC's bulk-download bundles of bank regulatory
//! filings (Call Report and UBPR data, published as XBRL-in-ZIP archives on
//! the CDR public portal) into a flat, typed JSON record set.
//!
//! ## Features
//!
//! - **Archive extraction** - selects the per-institution instance
//!   documents inside a bulk ZIP and streams their facts into one JSON
//!   array without holding the whole result set in memory
//! - **Fact normalization** - namespace-aware XBRL parsing that turns every
//!   reported value into a `{mdrm, rssd, quarter, value}` record, typed by
//!   the fact's unit
//! - **Failure isolation** - a malformed filing or fact is dropped with a
//!   `tracing` diagnostic; it never aborts the rest of the archive
//!
//! Downloading the archives is out of scope: the CDR portal sits behind an
//! interactive form, so acquisition belongs to whatever browser or HTTP
//! automation drives it. FfiecKit starts where that leaves off, with bytes
//! on disk or in memory.
//!
//! ## Basic Usage
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
//!
//! Individual instance documents can be normalized without the `archive`
//! feature:
//!
//! ```rust
//! use ffieckit::parsing::xbrl::{XbrlConfig, XbrlParser};
//!
//! let parser = XbrlParser::new(XbrlConfig::default());
//! let records = parser.parse(r#"
//!     <xbrl xmlns:cc="http://www.ffiec.gov/xbrl/call/concepts">
//!         <cc:RCFD2170 contextRef="CI_123456_2009-06-30" unitRef="USD">5000000</cc:RCFD2170>
//!     </xbrl>
//! "#).unwrap();
//!
//! assert_eq!(records[0].rssd, "123456");
//! ```

mod error;
mod record;
mod writer;
pub mod parsing;

#[cfg(feature = "archive")]
mod archive;

pub use error::{FfiecError, Result};
pub use record::{CurrencyScale, DataKind, FactValue, Record};
pub use writer::{RecordWriter, to_json_pretty};

#[cfg(feature = "archive")]
pub use archive::{ArchiveConfig, ArchiveExtractor, ExtractSummary};

pub use parsing::context::ContextRef;
pub use parsing::xbrl::{ConceptKind, XbrlConfig, XbrlParser};

/// Current crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
