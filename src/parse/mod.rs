//! Entry parsers: per-source grammars turning raw dictionary block text into
//! [`ParsedEntry`] values.
//!
//! Each upstream source formats its blocks differently, so each gets its own
//! grammar module. The shared contract:
//!
//! - parsing is deterministic: identical input produces byte-identical output
//! - parsers fail *soft*: a grammar mismatch yields a fallback entry whose
//!   single sense is the trimmed raw text, and the issue is logged — nothing
//!   propagates upward
//! - `raw_text` always holds the verbatim block, so a stored raw response
//!   can be re-parsed later by an improved grammar

pub mod cdsl;
pub mod diogenes;
pub mod heritage;
pub mod lewis_short;
pub mod morph_table;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::adapter::Source;
use crate::language::Language;
use crate::schema::MorphologyInfo;

/// The structured output of an entry parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedEntry {
    pub headword: String,
    pub source: Source,
    pub language: Language,
    pub pos: Option<String>,
    pub gender: Option<String>,
    pub root: Option<String>,
    pub etymology: Option<String>,
    pub principal_parts: Vec<String>,
    pub senses: Vec<ParsedSense>,
    pub citations: Vec<ParsedCitation>,
    /// Morphological analysis, for sources that provide one (Heritage).
    pub morphology: Option<MorphologyInfo>,
    /// Tool-specific leftovers that never enter the universal schema
    /// (e.g. Heritage cell color).
    pub tool_specific: BTreeMap<String, String>,
    /// The verbatim block this entry was parsed from.
    pub raw_text: String,
}

impl ParsedEntry {
    /// A bare entry with everything optional empty.
    pub fn new(headword: impl Into<String>, source: Source, language: Language) -> Self {
        Self {
            headword: headword.into(),
            source,
            language,
            pos: None,
            gender: None,
            root: None,
            etymology: None,
            principal_parts: Vec::new(),
            senses: Vec::new(),
            citations: Vec::new(),
            morphology: None,
            tool_specific: BTreeMap::new(),
            raw_text: String::new(),
        }
    }

    /// The parser invariant: at least one sense or one citation.
    pub fn is_well_formed(&self) -> bool {
        !self.senses.is_empty() || !self.citations.is_empty()
    }
}

/// One sense within a parsed entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedSense {
    /// The sense marker literal (`I`, `1`, `α`, `b`) when the source has one.
    pub sense_id: Option<String>,
    pub gloss: String,
    pub domains: Vec<String>,
    pub register: Vec<String>,
    pub examples: Vec<ParsedExample>,
}

impl ParsedSense {
    pub fn new(gloss: impl Into<String>) -> Self {
        Self {
            sense_id: None,
            gloss: gloss.into(),
            domains: Vec::new(),
            register: Vec::new(),
            examples: Vec::new(),
        }
    }
}

/// A quoted usage example within a sense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedExample {
    pub text: String,
    pub author: Option<String>,
    /// A translation gloss the source sets off from the example text.
    pub gloss: Option<String>,
}

/// A scholarly citation extracted during parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCitation {
    pub text: String,
    pub source_ref: String,
    pub cts_urn: Option<String>,
}

/// A recoverable grammar mismatch. Never propagated; recorded on the error
/// channel and answered with a fallback entry.
#[derive(Debug, Clone)]
pub struct ParseIssue {
    pub source: Source,
    pub reason: String,
    pub offset: usize,
}

/// Log a parse issue and build the fallback entry for `raw`.
pub(crate) fn fallback_entry(
    source: Source,
    language: Language,
    headword: &str,
    raw: &str,
    issue: ParseIssue,
) -> ParsedEntry {
    tracing::warn!(
        source = %issue.source,
        reason = %issue.reason,
        offset = issue.offset,
        "entry grammar mismatch, emitting fallback"
    );
    let mut entry = ParsedEntry::new(headword, source, language);
    entry.senses.push(ParsedSense::new(raw.trim()));
    entry.raw_text = raw.to_string();
    entry
}
