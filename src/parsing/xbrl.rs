//! XBRL instance document parsing.
//!
//! Every institution in a bulk-data archive files one XBRL instance
//! document: a flat list of fact elements under an `xbrl` root, next to the
//! `context`/`unit`/`schemaRef` plumbing those facts point at. Facts live
//! in two namespaces — the CDR concept taxonomy (conventionally prefixed
//! `cc`) and the US-GAAP concept taxonomy (prefixed `uc`) — and carry the
//! reporting context and unit as attributes:
//!
//! ```text
//! <cc:RCFD2170 contextRef="CI_123456_2009-06-30" unitRef="USD">5000000</cc:RCFD2170>
//! ```
//!
//! [`XbrlParser`] walks the document with a namespace-aware event reader,
//! classifies the root's children by prefix, and normalizes every fact
//! item into a [`Record`]. A fact that cannot be normalized (no context,
//! no period date, unparseable value for its unit) is dropped with a
//! `tracing` diagnostic; the rest of the document is unaffected. Malformed
//! XML or a non-XBRL root fails the whole document, which callers treat as
//! a per-entry failure.
//!
//! # Examples
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
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].mdrm, "RCFD2170");
//! ```

use crate::error::{FfiecError, Result};
use crate::parsing::context::ContextRef;
use crate::record::{CurrencyScale, FactValue, Record};
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{QName, ResolveResult};
use std::collections::HashMap;

/// Taxonomy classification of a fact element.
///
/// Classification is an exact match of the element's namespace prefix
/// against the configured prefixes. A matching prefix with no in-scope
/// namespace binding is reported and demoted to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConceptKind {
    /// CDR concept taxonomy (`cc` by default).
    Custom,
    /// US-GAAP concept taxonomy (`uc` by default).
    UsGaap,
    /// Contexts, units, schema references, foreign namespaces.
    Other,
}

/// Configuration options for XBRL instance parsing.
#[derive(Debug, Clone)]
pub struct XbrlConfig {
    /// Namespace prefix of the CDR concept taxonomy.
    pub custom_prefix: String,

    /// Namespace prefix of the US-GAAP concept taxonomy.
    pub usgaap_prefix: String,

    /// Numeric representation for currency facts.
    pub scale: CurrencyScale,
}

impl Default for XbrlConfig {
    fn default() -> Self {
        Self {
            custom_prefix: "cc".to_string(),
            usgaap_prefix: "uc".to_string(),
            scale: CurrencyScale::default(),
        }
    }
}

pub struct XbrlParser {
    config: XbrlConfig,
}

/// A fact element as read off the document, before normalization.
#[derive(Debug, Default)]
struct RawFact {
    context: Option<String>,
    unit: Option<String>,
    value: Option<String>,
    /// The element had child elements (tuple-style content).
    nested: bool,
}

/// Facts grouped by concept, first-occurrence order, CDR before US-GAAP.
#[derive(Default)]
struct FactGroups {
    custom: ConceptGroup,
    usgaap: ConceptGroup,
}

#[derive(Default)]
struct ConceptGroup {
    concepts: Vec<(String, Vec<RawFact>)>,
    index: HashMap<String, usize>,
}

impl ConceptGroup {
    fn push(&mut self, mdrm: String, fact: RawFact) {
        match self.index.get(&mdrm) {
            Some(&i) => self.concepts[i].1.push(fact),
            None => {
                self.index.insert(mdrm.clone(), self.concepts.len());
                self.concepts.push((mdrm, vec![fact]));
            }
        }
    }
}

impl FactGroups {
    fn push(&mut self, kind: ConceptKind, mdrm: String, fact: RawFact) {
        match kind {
            ConceptKind::Custom => self.custom.push(mdrm, fact),
            ConceptKind::UsGaap => self.usgaap.push(mdrm, fact),
            ConceptKind::Other => {}
        }
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &RawFact)> {
        self.custom
            .concepts
            .iter()
            .chain(self.usgaap.concepts.iter())
            .flat_map(|(mdrm, facts)| facts.iter().map(move |f| (mdrm.as_str(), f)))
    }
}

impl XbrlParser {
    pub fn new(config: XbrlConfig) -> Self {
        Self { config }
    }

    /// Parses one instance document into normalized records.
    ///
    /// Record order is deterministic: all CDR-taxonomy concepts in
    /// first-occurrence order, then all US-GAAP concepts, with repeated
    /// facts of one concept kept together in document order. Repeated
    /// `mdrm`/`rssd`/`quarter` combinations are all emitted; deduplication
    /// is a downstream concern.
    ///
    /// # Errors
    ///
    /// * [`FfiecError::Xml`] - the payload is not well-formed XML
    /// * [`FfiecError::NotXbrl`] - the root element is not `xbrl`
    pub fn parse(&self, content: &str) -> Result<Vec<Record>> {
        let groups = self.collect_facts(content)?;

        let mut records = Vec::new();
        for (mdrm, fact) in groups.iter() {
            match self.normalize(mdrm, fact) {
                Ok(record) => records.push(record),
                Err(err) => {
                    debug_assert!(err.is_fact_error());
                    tracing::warn!(concept = %mdrm, error = %err, "dropping fact");
                }
            }
        }
        Ok(records)
    }

    /// Event-loop pass over the document, gathering raw facts.
    fn collect_facts(&self, content: &str) -> Result<FactGroups> {
        let mut reader = NsReader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut groups = FactGroups::default();
        let mut depth = 0usize;
        let mut saw_root = false;
        // Fact element currently open at depth 2, if any.
        let mut current: Option<(ConceptKind, String, RawFact)> = None;

        loop {
            match reader.read_resolved_event() {
                Ok((resolve, Event::Start(start))) => {
                    depth += 1;
                    if depth == 1 {
                        Self::check_root(&start)?;
                        saw_root = true;
                    } else if depth == 2 {
                        current = self.begin_fact(&resolve, &start)?;
                    } else if let Some((_, _, fact)) = current.as_mut() {
                        fact.nested = true;
                    }
                }
                Ok((resolve, Event::Empty(start))) => {
                    if depth == 0 {
                        Self::check_root(&start)?;
                        saw_root = true;
                    } else if depth == 1 {
                        // An empty fact has no value; normalization reports it.
                        if let Some((kind, mdrm, fact)) = self.begin_fact(&resolve, &start)? {
                            groups.push(kind, mdrm, fact);
                        }
                    }
                }
                Ok((_, Event::Text(text))) => {
                    if let Some((_, _, fact)) = current.as_mut() {
                        let chunk = text
                            .unescape()
                            .map_err(|e| FfiecError::Xml(e.to_string()))?;
                        fact.value.get_or_insert_with(String::new).push_str(&chunk);
                    }
                }
                Ok((_, Event::CData(data))) => {
                    if let Some((_, _, fact)) = current.as_mut() {
                        let chunk = std::str::from_utf8(&data)
                            .map_err(|e| FfiecError::Xml(e.to_string()))?;
                        fact.value.get_or_insert_with(String::new).push_str(chunk);
                    }
                }
                Ok((_, Event::End(_))) => {
                    if depth == 2 {
                        if let Some((kind, mdrm, fact)) = current.take() {
                            groups.push(kind, mdrm, fact);
                        }
                    }
                    depth -= 1;
                }
                Ok((_, Event::Eof)) => break,
                Ok(_) => {}
                Err(e) => return Err(FfiecError::Xml(e.to_string())),
            }
        }

        if !saw_root {
            return Err(FfiecError::Xml("document has no root element".to_string()));
        }
        Ok(groups)
    }

    fn check_root(start: &BytesStart<'_>) -> Result<()> {
        if start.local_name().as_ref() != b"xbrl" {
            let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
            return Err(FfiecError::NotXbrl(name));
        }
        Ok(())
    }

    /// Classifies a root child and, for fact elements, captures its
    /// attributes. Returns `None` for non-fact elements.
    fn begin_fact(
        &self,
        resolve: &ResolveResult<'_>,
        start: &BytesStart<'_>,
    ) -> Result<Option<(ConceptKind, String, RawFact)>> {
        let kind = self.classify(resolve, start.name());
        if kind == ConceptKind::Other {
            return Ok(None);
        }

        let mdrm = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let fact = RawFact {
            context: Self::attribute(start, "contextRef")?,
            unit: Self::attribute(start, "unitRef")?,
            value: None,
            nested: false,
        };
        Ok(Some((kind, mdrm, fact)))
    }

    fn classify(&self, resolve: &ResolveResult<'_>, name: QName<'_>) -> ConceptKind {
        let Some(prefix) = name.prefix() else {
            return ConceptKind::Other;
        };

        let kind = if prefix.as_ref() == self.config.custom_prefix.as_bytes() {
            ConceptKind::Custom
        } else if prefix.as_ref() == self.config.usgaap_prefix.as_bytes() {
            ConceptKind::UsGaap
        } else {
            ConceptKind::Other
        };

        if kind != ConceptKind::Other && !matches!(resolve, ResolveResult::Bound(_)) {
            tracing::warn!(
                element = %String::from_utf8_lossy(name.as_ref()),
                "fact prefix has no namespace binding in scope; element ignored"
            );
            return ConceptKind::Other;
        }
        kind
    }

    fn attribute(start: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
        match start.try_get_attribute(name) {
            Ok(Some(attr)) => {
                let value = attr
                    .unescape_value()
                    .map_err(|e| FfiecError::Xml(e.to_string()))?;
                Ok(Some(value.into_owned()))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(FfiecError::Xml(e.to_string())),
        }
    }

    /// Turns one raw fact into a [`Record`].
    fn normalize(&self, mdrm: &str, fact: &RawFact) -> Result<Record> {
        let context_id = fact
            .context
            .as_deref()
            .ok_or_else(|| FfiecError::MissingContext(mdrm.to_string()))?;
        let context: ContextRef = context_id.parse()?;

        let text = if fact.nested {
            None
        } else {
            fact.value.as_deref().map(str::trim).filter(|t| !t.is_empty())
        };
        let text = text.ok_or_else(|| FfiecError::MissingValue(mdrm.to_string()))?;

        match fact.unit.as_deref() {
            Some("USD") => {
                let raw_dollars: i64 = text.parse().map_err(|_| FfiecError::Coercion {
                    concept: mdrm.to_string(),
                    unit: "USD".to_string(),
                    value: text.to_string(),
                })?;
                Ok(Record::currency(
                    mdrm,
                    context.rssd,
                    context.quarter,
                    raw_dollars,
                    self.config.scale,
                ))
            }
            Some(unit @ ("PURE" | "NON-MONETARY")) => {
                let ratio: f64 = text.parse().map_err(|_| FfiecError::Coercion {
                    concept: mdrm.to_string(),
                    unit: unit.to_string(),
                    value: text.to_string(),
                })?;
                Ok(Record::new(
                    mdrm,
                    context.rssd,
                    context.quarter,
                    FactValue::Float(ratio),
                ))
            }
            _ => {
                let value = match text {
                    "true" => FactValue::Bool(true),
                    "false" => FactValue::Bool(false),
                    other => FactValue::Str(other.to_string()),
                };
                Ok(Record::new(mdrm, context.rssd, context.quarter, value))
            }
        }
    }
}
