//! Context identifier parsing.
//!
//! CDR instance documents encode the reporting entity and period directly
//! in the `contextRef` attribute of every fact, as
//! `<prefix>_<rssd>_...` with the quarter-end date embedded somewhere in
//! the id (`CI_123456_2009-06-30`). The contexts section of the document
//! repeats the same information in structured form, but the id string is
//! authoritative in the feed and cheaper to read than cross-referencing
//! thousands of context elements per filing.

use crate::error::FfiecError;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]{4}-[0-9]{2}-[0-9]{2}").expect("date pattern compiles"));

/// Entity and period information carried by a fact's `contextRef`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextRef {
    /// RSSD identifier: the segment between the first and second `_`.
    pub rssd: String,
    /// Quarter-end date: the first `YYYY-MM-DD` substring in the id.
    pub quarter: NaiveDate,
}

impl FromStr for ContextRef {
    type Err = FfiecError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let rssd = raw
            .split('_')
            .nth(1)
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| FfiecError::MalformedContext(raw.to_string()))?;

        let date = DATE_RE
            .find(raw)
            .ok_or_else(|| FfiecError::MissingPeriod(raw.to_string()))?;
        let quarter = NaiveDate::parse_from_str(date.as_str(), "%Y-%m-%d")
            .map_err(|_| FfiecError::InvalidPeriod(raw.to_string()))?;

        Ok(ContextRef {
            rssd: rssd.to_string(),
            quarter,
        })
    }
}
