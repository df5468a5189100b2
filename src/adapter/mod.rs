//! Backend adapters: one per upstream lexical source.
//!
//! An adapter owns the full round trip for its source: translate the
//! [`CanonicalQuery`] into the encoding the upstream expects, fetch (HTTP,
//! subprocess, or local index), run the matching entry parser, and map the
//! parsed entries into the universal schema. Each adapter can also re-run the
//! projection step over a stored raw response (`extract_facts`), which is how
//! the fact index gets refilled without re-fetching.
//!
//! Adapters are isolated: an error here becomes one row in the response's
//! error map, never a failed request.

pub mod cdsl;
pub mod cltk;
pub mod diogenes;
pub mod heritage;
pub mod whitakers;

use serde::{Deserialize, Serialize};

use crate::engine::health::ComponentStatus;
use crate::error::AdapterError;
use crate::fact::{Fact, FactPayload, ProvenanceRecord};
use crate::normalize::CanonicalQuery;
use crate::parse::ParsedEntry;
use crate::schema::{Citation, DictionaryDefinition, DictionaryEntry};

/// Every upstream source the engine can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "diogenes-latin")]
    DiogenesLatin,
    #[serde(rename = "diogenes-greek")]
    DiogenesGreek,
    #[serde(rename = "whitakers")]
    Whitakers,
    #[serde(rename = "cltk-latin")]
    CltkLatin,
    #[serde(rename = "cltk-greek")]
    CltkGreek,
    #[serde(rename = "cdsl")]
    Cdsl,
    #[serde(rename = "heritage")]
    Heritage,
}

impl Source {
    pub fn tag(&self) -> &'static str {
        match self {
            Source::DiogenesLatin => "diogenes-latin",
            Source::DiogenesGreek => "diogenes-greek",
            Source::Whitakers => "whitakers",
            Source::CltkLatin => "cltk-latin",
            Source::CltkGreek => "cltk-greek",
            Source::Cdsl => "cdsl",
            Source::Heritage => "heritage",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "diogenes-latin" => Some(Source::DiogenesLatin),
            "diogenes-greek" => Some(Source::DiogenesGreek),
            "whitakers" => Some(Source::Whitakers),
            "cltk-latin" => Some(Source::CltkLatin),
            "cltk-greek" => Some(Source::CltkGreek),
            "cdsl" => Some(Source::Cdsl),
            "heritage" => Some(Source::Heritage),
            _ => None,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// What one adapter call produced: universal entries plus the raw response
/// and provenance the fact layer needs.
#[derive(Debug)]
pub struct AdapterResponse {
    pub entries: Vec<DictionaryEntry>,
    /// The raw upstream payload, kept until facts are written.
    pub raw: Option<String>,
    pub provenance: ProvenanceRecord,
}

/// The adapter contract. Implementations are cheap to share across threads;
/// the engine fans out over `Arc<dyn DictionaryAdapter>`.
pub trait DictionaryAdapter: Send + Sync {
    fn source(&self) -> Source;

    /// Fetch and parse. An upstream that answers with no usable entries is an
    /// empty `Ok`, not an error.
    fn query(&self, query: &CanonicalQuery) -> Result<AdapterResponse, AdapterError>;

    /// Re-run the projection over a stored raw response.
    fn extract_facts(&self, raw: &str, provenance: &ProvenanceRecord) -> Vec<Fact>;

    /// Cheap reachability check for the health surface.
    fn probe(&self) -> ComponentStatus {
        ComponentStatus::Healthy
    }
}

/// Map a parsed entry into the universal schema. Adapters call this and then
/// patch source-specific fields (per-definition source refs, metadata keys).
pub fn parsed_to_entry(parsed: &ParsedEntry) -> DictionaryEntry {
    let mut entry = DictionaryEntry {
        source: parsed.source,
        headword: parsed.headword.clone(),
        language: parsed.language,
        definitions: Vec::new(),
        citations: Vec::new(),
        morphology: parsed.morphology.clone(),
        metadata: parsed.tool_specific.clone(),
    };

    for sense in &parsed.senses {
        let mut definition = DictionaryDefinition::new(sense.gloss.clone());
        definition.pos = parsed.pos.clone();
        definition.gender = parsed.gender.as_deref().map(expand_gender);
        definition.domains = sense.domains.clone();
        definition.register = sense.register.clone();
        entry.definitions.push(definition);
    }
    for citation in &parsed.citations {
        entry.citations.push(Citation {
            text: citation.text.clone(),
            source_ref: Some(citation.source_ref.clone()),
            cts_urn: citation.cts_urn.clone(),
        });
    }

    if let Some(root) = &parsed.root {
        entry.metadata.insert("root".into(), root.clone());
    }
    if let Some(etymology) = &parsed.etymology {
        entry.metadata.insert("etymology".into(), etymology.clone());
    }
    if !parsed.principal_parts.is_empty() {
        entry
            .metadata
            .insert("principal_parts".into(), parsed.principal_parts.join(", "));
    }
    entry
}

fn expand_gender(letter: &str) -> String {
    match letter {
        "m" => "masculine".to_string(),
        "f" => "feminine".to_string(),
        "n" => "neuter".to_string(),
        other => other.to_string(),
    }
}

/// Project a parsed entry into facts. `ordinal` keeps fact ids stable across
/// the whole extraction, so callers thread it through every entry of one
/// response.
pub fn parsed_to_facts(
    parsed: &ParsedEntry,
    provenance: &ProvenanceRecord,
    ordinal: &mut usize,
) -> Vec<Fact> {
    let mut facts = Vec::new();
    let mut push = |payload: FactPayload, facts: &mut Vec<Fact>| {
        facts.push(Fact::new(
            parsed.source,
            parsed.language,
            parsed.headword.clone(),
            payload,
            &provenance.provenance_id,
            *ordinal,
        ));
        *ordinal += 1;
    };

    for sense in &parsed.senses {
        push(
            FactPayload::Gloss {
                gloss: sense.gloss.clone(),
                domains: sense.domains.clone(),
                register: sense.register.clone(),
                source_ref: None,
                tool_specific: parsed.tool_specific.clone(),
            },
            &mut facts,
        );
    }
    for citation in &parsed.citations {
        push(
            FactPayload::Citation {
                text: citation.text.clone(),
                source_ref: Some(citation.source_ref.clone()),
                cts_urn: citation.cts_urn.clone(),
            },
            &mut facts,
        );
    }
    if let Some(morphology) = &parsed.morphology {
        push(
            FactPayload::Morphology {
                morphology: morphology.clone(),
                tool_specific: parsed.tool_specific.clone(),
            },
            &mut facts,
        );
    }
    if let Some(etymology) = &parsed.etymology {
        push(
            FactPayload::Etymology {
                text: etymology.clone(),
            },
            &mut facts,
        );
    }
    if let Some(pos) = &parsed.pos {
        push(FactPayload::Pos { pos: pos.clone() }, &mut facts);
    }
    if let Some(gender) = &parsed.gender {
        push(
            FactPayload::Gender {
                gender: expand_gender(gender),
            },
            &mut facts,
        );
    }
    facts
}
