//! Normalized fact records.
//!
//! Every reported value that survives normalization becomes a [`Record`]:
//! the MDRM concept code, the filing institution's RSSD identifier, the
//! quarter-end date, and a typed value. The legacy CDR feed named the value
//! column after its type (`int_data`, `float_data`, `bool_data`,
//! `str_data`), and downstream consumers still key on those names, so the
//! internal representation is a tagged variant ([`FactValue`]) and the
//! serializer reconstructs the per-record column name from [`DataKind`].

use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Output column tag for a normalized value.
///
/// Names the `{kind}_data` key a record serializes under. Usually this is
/// derived from the value itself; currency facts pin it to `Int` regardless
/// of the configured [`CurrencyScale`], matching the legacy feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Int,
    Float,
    Bool,
    Str,
}

impl DataKind {
    /// The JSON key this kind serializes under.
    pub const fn column(self) -> &'static str {
        match self {
            DataKind::Int => "int_data",
            DataKind::Float => "float_data",
            DataKind::Bool => "bool_data",
            DataKind::Str => "str_data",
        }
    }
}

/// A typed fact value.
#[derive(Debug, Clone, PartialEq)]
pub enum FactValue {
    /// Currency amount in thousands of dollars.
    Int(i64),
    /// Ratio or count (`PURE` / `NON-MONETARY` units).
    Float(f64),
    /// Yes/no flag.
    Bool(bool),
    /// Anything else, kept verbatim.
    Str(String),
}

impl FactValue {
    /// The natural column tag for this value's type.
    pub const fn kind(&self) -> DataKind {
        match self {
            FactValue::Int(_) => DataKind::Int,
            FactValue::Float(_) => DataKind::Float,
            FactValue::Bool(_) => DataKind::Bool,
            FactValue::Str(_) => DataKind::Str,
        }
    }
}

/// How currency facts are scaled from whole dollars to thousands.
///
/// Raw filings report USD amounts in whole dollars; the feed stores them in
/// thousands. The two variants preserve both historical readings of that
/// division (see `DESIGN.md`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CurrencyScale {
    /// Floor-divide to a whole number of thousands (`i64`). A dropped
    /// sub-thousand remainder is reported through `tracing`, never silent.
    #[default]
    Whole,
    /// True division to a fractional number of thousands (`f64`), still
    /// emitted under `int_data` exactly as the legacy feed did.
    Fractional,
}

/// One normalized fact.
///
/// `kind` and `value` agree except for fractionally scaled currency facts,
/// where a float payload keeps the legacy `int_data` column. Records
/// serialize as `{"mdrm", "rssd", "quarter", "<kind>_data": value}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// MDRM concept code, namespace prefix stripped (e.g. `RCFD2170`).
    pub mdrm: String,
    /// RSSD identifier of the reporting institution.
    pub rssd: String,
    /// Quarter-end date of the reporting period.
    pub quarter: NaiveDate,
    /// Output column tag.
    pub kind: DataKind,
    /// The typed value.
    pub value: FactValue,
}

impl Record {
    /// Builds a record whose column tag is derived from the value.
    pub fn new(
        mdrm: impl Into<String>,
        rssd: impl Into<String>,
        quarter: NaiveDate,
        value: FactValue,
    ) -> Self {
        let kind = value.kind();
        Self {
            mdrm: mdrm.into(),
            rssd: rssd.into(),
            quarter,
            kind,
            value,
        }
    }

    /// Builds a currency record scaled from whole dollars to thousands.
    ///
    /// The column tag is always [`DataKind::Int`]; `scale` selects the
    /// numeric representation.
    pub fn currency(
        mdrm: impl Into<String>,
        rssd: impl Into<String>,
        quarter: NaiveDate,
        raw_dollars: i64,
        scale: CurrencyScale,
    ) -> Self {
        let mdrm = mdrm.into();
        let value = match scale {
            CurrencyScale::Whole => {
                if raw_dollars % 1000 != 0 {
                    tracing::warn!(
                        concept = %mdrm,
                        raw = raw_dollars,
                        "currency amount is not a whole number of thousands; remainder dropped"
                    );
                }
                FactValue::Int(raw_dollars.div_euclid(1000))
            }
            CurrencyScale::Fractional => FactValue::Float(raw_dollars as f64 / 1000.0),
        };
        Self {
            mdrm,
            rssd: rssd.into(),
            quarter,
            kind: DataKind::Int,
            value,
        }
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("mdrm", &self.mdrm)?;
        map.serialize_entry("rssd", &self.rssd)?;
        map.serialize_entry("quarter", &self.quarter.format("%Y-%m-%d").to_string())?;
        match &self.value {
            FactValue::Int(v) => map.serialize_entry(self.kind.column(), v)?,
            FactValue::Float(v) => map.serialize_entry(self.kind.column(), v)?,
            FactValue::Bool(v) => map.serialize_entry(self.kind.column(), v)?,
            FactValue::Str(v) => map.serialize_entry(self.kind.column(), v)?,
        }
        map.end()
    }
}
