//! CLTK adapter: in-process morphological analysis, no network.
//!
//! The upstream toolkit runs inside the process behind a stable wrapper; the
//! same contract holds here. Analysis is a lemma table for the high-frequency
//! vocabulary plus a small suffix-stripping lemmatizer for regular nominal
//! and verbal endings. Coverage is intentionally shallow — this source exists
//! to supply morphology when the richer backends are down, not to compete
//! with them.

use std::collections::BTreeMap;

use crate::adapter::{AdapterResponse, DictionaryAdapter, Source};
use crate::engine::health::ComponentStatus;
use crate::error::AdapterError;
use crate::fact::{Fact, FactPayload, ProvenanceRecord};
use crate::language::Language;
use crate::normalize::CanonicalQuery;
use crate::schema::{DictionaryDefinition, DictionaryEntry, MorphologyInfo};

/// One known lemma: surface stem, lemma, part of speech, short gloss.
type LemmaRow = (&'static str, &'static str, &'static str, &'static str);

static LATIN_LEMMAS: &[LemmaRow] = &[
    ("lupus", "lupus", "noun", "wolf"),
    ("rosa", "rosa", "noun", "rose"),
    ("mensa", "mensa", "noun", "table"),
    ("rex", "rex", "noun", "king"),
    ("corpus", "corpus", "noun", "body"),
    ("bellum", "bellum", "noun", "war"),
    ("aqua", "aqua", "noun", "water"),
    ("deus", "deus", "noun", "god"),
    ("homo", "homo", "noun", "human being"),
    ("amo", "amo", "verb", "to love"),
    ("sum", "sum", "verb", "to be"),
    ("video", "video", "verb", "to see"),
    ("dico", "dico", "verb", "to say"),
    ("venio", "venio", "verb", "to come"),
    ("magnus", "magnus", "adjective", "great"),
    ("bonus", "bonus", "adjective", "good"),
];

static GREEK_LEMMAS: &[LemmaRow] = &[
    ("λόγος", "λόγος", "noun", "word, account"),
    ("θεός", "θεός", "noun", "god"),
    ("ἄνθρωπος", "ἄνθρωπος", "noun", "human being"),
    ("ψυχή", "ψυχή", "noun", "soul"),
    ("πόλις", "πόλις", "noun", "city"),
    ("ἀρχή", "ἀρχή", "noun", "beginning, rule"),
    ("λέγω", "λέγω", "verb", "to say"),
    ("εἰμί", "εἰμί", "verb", "to be"),
    ("ἔχω", "ἔχω", "verb", "to have"),
    ("ἀγαθός", "ἀγαθός", "adjective", "good"),
];

/// Inflectional endings stripped when the exact surface misses, paired with
/// the replacement that restores the dictionary form.
static LATIN_ENDINGS: &[(&str, &str)] = &[
    ("orum", "us"),
    ("arum", "a"),
    ("ibus", ""),
    ("is", "us"),
    ("os", "us"),
    ("um", "us"),
    ("o", "us"),
    ("i", "us"),
    ("ae", "a"),
    ("am", "a"),
    ("as", "a"),
    ("at", "o"),
    ("ant", "o"),
];

pub struct CltkAdapter {
    language: Language,
}

impl CltkAdapter {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    fn lemmas(&self) -> &'static [LemmaRow] {
        match self.language {
            Language::Greek => GREEK_LEMMAS,
            _ => LATIN_LEMMAS,
        }
    }

    /// Exact lookup first, then suffix stripping for Latin.
    fn analyze(&self, surface: &str) -> Option<(LemmaRow, BTreeMap<String, String>)> {
        if let Some(row) = self.lemmas().iter().find(|(s, ..)| *s == surface) {
            return Some((*row, BTreeMap::new()));
        }
        if self.language != Language::Latin {
            return None;
        }
        for (ending, replacement) in LATIN_ENDINGS {
            let Some(stem) = surface.strip_suffix(ending) else {
                continue;
            };
            if stem.len() < 2 {
                continue;
            }
            let candidate = format!("{stem}{replacement}");
            if let Some(row) = self.lemmas().iter().find(|(s, ..)| *s == candidate) {
                let mut features = BTreeMap::new();
                features.insert("surface".to_string(), surface.to_string());
                features.insert("ending".to_string(), ending.to_string());
                return Some((*row, features));
            }
        }
        None
    }

    fn entry_for(&self, surface: &str) -> Option<DictionaryEntry> {
        let ((_, lemma, pos, gloss), features) = self.analyze(surface)?;
        let confidence = if features.is_empty() { 0.9 } else { 0.7 };
        let mut definition = DictionaryDefinition::new(gloss);
        definition.pos = Some(pos.to_string());
        Some(DictionaryEntry {
            source: self.source(),
            headword: lemma.to_string(),
            language: self.language,
            definitions: vec![definition],
            citations: Vec::new(),
            morphology: Some(MorphologyInfo {
                lemma: lemma.to_string(),
                pos: pos.to_string(),
                features,
                confidence,
            }),
            metadata: BTreeMap::new(),
        })
    }
}

impl DictionaryAdapter for CltkAdapter {
    fn source(&self) -> Source {
        match self.language {
            Language::Greek => Source::CltkGreek,
            _ => Source::CltkLatin,
        }
    }

    fn query(&self, query: &CanonicalQuery) -> Result<AdapterResponse, AdapterError> {
        let mut entries = Vec::new();
        let mut matched = None;
        for candidate in std::iter::once(&query.canonical).chain(query.alternates.iter()) {
            if let Some(entry) = self.entry_for(candidate) {
                matched = Some(candidate.clone());
                entries.push(entry);
                break;
            }
        }
        let provenance = ProvenanceRecord::new(self.source(), &query.canonical);
        Ok(AdapterResponse {
            entries,
            raw: matched,
            provenance,
        })
    }

    fn extract_facts(&self, raw: &str, provenance: &ProvenanceRecord) -> Vec<Fact> {
        let Some(entry) = self.entry_for(raw.trim()) else {
            return Vec::new();
        };
        let mut facts = Vec::new();
        let mut ordinal = 0;
        for definition in &entry.definitions {
            facts.push(Fact::new(
                self.source(),
                self.language,
                entry.headword.clone(),
                FactPayload::Gloss {
                    gloss: definition.definition.clone(),
                    domains: Vec::new(),
                    register: Vec::new(),
                    source_ref: None,
                    tool_specific: BTreeMap::new(),
                },
                &provenance.provenance_id,
                ordinal,
            ));
            ordinal += 1;
        }
        if let Some(morphology) = &entry.morphology {
            facts.push(Fact::new(
                self.source(),
                self.language,
                entry.headword.clone(),
                FactPayload::Morphology {
                    morphology: morphology.clone(),
                    tool_specific: BTreeMap::new(),
                },
                &provenance.provenance_id,
                ordinal,
            ));
        }
        facts
    }
}
