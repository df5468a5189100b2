//! Universal dictionary schema: what the query engine returns.
//!
//! Every backend's parsed output is mapped into these types so callers see
//! one shape regardless of which lexica answered. Serialization is stable:
//! the cache stores bincode-encoded entry lists under
//! [`crate::SCHEMA_VERSION`], and a version bump invalidates old rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::adapter::Source;
use crate::language::Language;

/// A single dictionary entry from one source, in the universal schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub source: Source,
    pub headword: String,
    pub language: Language,
    pub definitions: Vec<DictionaryDefinition>,
    pub citations: Vec<Citation>,
    /// Present only for sources that provide morphology (Heritage,
    /// Whitaker's, CLTK).
    pub morphology: Option<MorphologyInfo>,
    /// Open per-source metadata. Known keys are validated by the adapter
    /// that wrote them; unknown keys pass through.
    pub metadata: BTreeMap<String, String>,
}

impl DictionaryEntry {
    /// The core invariant: an entry must say *something*.
    pub fn is_well_formed(&self) -> bool {
        !self.definitions.is_empty() || !self.citations.is_empty()
    }
}

/// One sense of an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryDefinition {
    pub definition: String,
    pub pos: Option<String>,
    pub gender: Option<String>,
    /// Stable identifier within the originating source (e.g. `mw:217497`)
    /// when the source provides one.
    pub source_ref: Option<String>,
    pub domains: Vec<String>,
    pub register: Vec<String>,
    pub confidence: Option<f32>,
}

impl DictionaryDefinition {
    pub fn new(definition: impl Into<String>) -> Self {
        Self {
            definition: definition.into(),
            pos: None,
            gender: None,
            source_ref: None,
            domains: Vec::new(),
            register: Vec::new(),
            confidence: None,
        }
    }
}

/// A scholarly citation attached to an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub text: String,
    pub source_ref: Option<String>,
    /// Canonical text URN, filled from the CTS index when the reference
    /// resolves; `None` otherwise.
    pub cts_urn: Option<String>,
}

/// A morphological analysis of the queried surface form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MorphologyInfo {
    pub lemma: String,
    pub pos: String,
    pub features: BTreeMap<String, String>,
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_without_definitions_or_citations_is_malformed() {
        let entry = DictionaryEntry {
            source: Source::Cdsl,
            headword: "agni".into(),
            language: Language::Sanskrit,
            definitions: Vec::new(),
            citations: Vec::new(),
            morphology: None,
            metadata: BTreeMap::new(),
        };
        assert!(!entry.is_well_formed());
    }

    #[test]
    fn entry_with_only_citations_is_well_formed() {
        let entry = DictionaryEntry {
            source: Source::Cdsl,
            headword: "agni".into(),
            language: Language::Sanskrit,
            definitions: Vec::new(),
            citations: vec![Citation {
                text: "RV.".into(),
                source_ref: Some("citation_abbrev:RV".into()),
                cts_urn: None,
            }],
            morphology: None,
            metadata: BTreeMap::new(),
        };
        assert!(entry.is_well_formed());
    }

    #[test]
    fn bincode_round_trip() {
        let entry = DictionaryEntry {
            source: Source::Heritage,
            headword: "agni".into(),
            language: Language::Sanskrit,
            definitions: vec![DictionaryDefinition::new("fire")],
            citations: Vec::new(),
            morphology: Some(MorphologyInfo {
                lemma: "agni".into(),
                pos: "noun".into(),
                features: BTreeMap::from([("gender".into(), "masculine".into())]),
                confidence: 0.9,
            }),
            metadata: BTreeMap::from([("color".into(), "lightblue".into())]),
        };
        let bytes = bincode::serialize(&entry).unwrap();
        let back: DictionaryEntry = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, entry);
    }
}
