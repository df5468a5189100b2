//! Facts: subject-predicate-value claims projected from parsed entries.
//!
//! Every adapter can re-express its parsed output as a list of facts with
//! provenance. Facts are the durable form: the response cache may be cleared
//! at will, but facts persist until an explicit refresh, and a stored raw
//! response lets a future parser re-extract them without re-fetching.
//!
//! Universal predicates cover what every source can claim; tool-specific
//! extras stay inside the payload and are never promoted to the universal
//! schema.

pub mod index;
pub mod provenance;
pub mod transform;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::adapter::Source;
use crate::language::Language;
use crate::schema::MorphologyInfo;

pub use index::FactIndex;
pub use provenance::ProvenanceRecord;

/// The closed set of universal predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    HasGloss,
    HasMorphology,
    HasCitation,
    HasEtymology,
    HasPos,
    HasGender,
}

impl Predicate {
    pub fn tag(&self) -> &'static str {
        match self {
            Predicate::HasGloss => "has_gloss",
            Predicate::HasMorphology => "has_morphology",
            Predicate::HasCitation => "has_citation",
            Predicate::HasEtymology => "has_etymology",
            Predicate::HasPos => "has_pos",
            Predicate::HasGender => "has_gender",
        }
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Broad fact categories; one per payload variant family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactType {
    Sense,
    Morph,
    Citation,
    Etymology,
    Grammar,
}

/// The tool-specific tuple a fact carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FactPayload {
    Gloss {
        gloss: String,
        domains: Vec<String>,
        register: Vec<String>,
        source_ref: Option<String>,
        tool_specific: BTreeMap<String, String>,
    },
    Morphology {
        morphology: MorphologyInfo,
        tool_specific: BTreeMap<String, String>,
    },
    Citation {
        text: String,
        source_ref: Option<String>,
        cts_urn: Option<String>,
    },
    Etymology {
        text: String,
    },
    Pos {
        pos: String,
    },
    Gender {
        gender: String,
    },
}

impl FactPayload {
    pub fn fact_type(&self) -> FactType {
        match self {
            FactPayload::Gloss { .. } => FactType::Sense,
            FactPayload::Morphology { .. } => FactType::Morph,
            FactPayload::Citation { .. } => FactType::Citation,
            FactPayload::Etymology { .. } => FactType::Etymology,
            FactPayload::Pos { .. } | FactPayload::Gender { .. } => FactType::Grammar,
        }
    }

    pub fn predicate(&self) -> Predicate {
        match self {
            FactPayload::Gloss { .. } => Predicate::HasGloss,
            FactPayload::Morphology { .. } => Predicate::HasMorphology,
            FactPayload::Citation { .. } => Predicate::HasCitation,
            FactPayload::Etymology { .. } => Predicate::HasEtymology,
            FactPayload::Pos { .. } => Predicate::HasPos,
            FactPayload::Gender { .. } => Predicate::HasGender,
        }
    }
}

/// One claim with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub fact_id: String,
    pub tool: Source,
    pub fact_type: FactType,
    pub subject: String,
    pub language: Language,
    pub predicate: Predicate,
    pub payload: FactPayload,
    pub provenance_id: String,
}

impl Fact {
    /// Build a fact, deriving type, predicate, and a stable id from the
    /// payload and its position within the extraction.
    pub fn new(
        tool: Source,
        language: Language,
        subject: impl Into<String>,
        payload: FactPayload,
        provenance_id: &str,
        ordinal: usize,
    ) -> Self {
        let subject = subject.into();
        let fact_type = payload.fact_type();
        let predicate = payload.predicate();
        let fact_id = {
            let mut hasher = Sha256::new();
            hasher.update(provenance_id.as_bytes());
            hasher.update(predicate.tag().as_bytes());
            hasher.update(subject.as_bytes());
            hasher.update(ordinal.to_le_bytes());
            let digest = hasher.finalize();
            let hex: String = digest.iter().take(8).map(|b| format!("{b:02x}")).collect();
            format!("fact:{hex}")
        };
        Self {
            fact_id,
            tool,
            fact_type,
            subject,
            language,
            predicate,
            payload,
            provenance_id: provenance_id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fact_derives_type_and_predicate_from_payload() {
        let fact = Fact::new(
            Source::Cdsl,
            Language::Sanskrit,
            "agni",
            FactPayload::Gloss {
                gloss: "fire".into(),
                domains: Vec::new(),
                register: Vec::new(),
                source_ref: Some("mw:217497".into()),
                tool_specific: BTreeMap::new(),
            },
            "prov:abc",
            0,
        );
        assert_eq!(fact.fact_type, FactType::Sense);
        assert_eq!(fact.predicate, Predicate::HasGloss);
        assert_eq!(fact.provenance_id, "prov:abc");
        assert!(fact.fact_id.starts_with("fact:"));
    }

    #[test]
    fn fact_ids_are_stable_and_positional() {
        let payload = FactPayload::Pos { pos: "noun".into() };
        let a = Fact::new(
            Source::Cdsl,
            Language::Sanskrit,
            "agni",
            payload.clone(),
            "prov:abc",
            0,
        );
        let b = Fact::new(
            Source::Cdsl,
            Language::Sanskrit,
            "agni",
            payload.clone(),
            "prov:abc",
            0,
        );
        let c = Fact::new(
            Source::Cdsl,
            Language::Sanskrit,
            "agni",
            payload,
            "prov:abc",
            1,
        );
        assert_eq!(a.fact_id, b.fact_id);
        assert_ne!(a.fact_id, c.fact_id);
    }
}
