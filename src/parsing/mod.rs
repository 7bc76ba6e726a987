//! Parsers for the document formats inside a bulk-data archive.

pub mod context;
pub mod xbrl;
