//! Fact → entry synthesis: the inverse mapping used for lookup-first queries.
//!
//! The transformation is tabular, one row per `(fact_type, source)`, rather
//! than per-source types: every supported pair names its application function
//! explicitly, and an unsupported pair simply contributes nothing. Payload
//! fields outside the universal schema are not promoted.

use std::collections::BTreeMap;

use crate::adapter::Source;
use crate::fact::{Fact, FactPayload, FactType};
use crate::language::Language;
use crate::schema::{Citation, DictionaryDefinition, DictionaryEntry};

type Apply = fn(&Fact, &mut DictionaryEntry);

/// The transform table. Every `(fact_type, source)` pair that can contribute
/// to an entry is listed; lookups miss for anything else.
static TRANSFORMS: &[((FactType, Source), Apply)] = &[
    ((FactType::Sense, Source::Cdsl), apply_gloss),
    ((FactType::Sense, Source::DiogenesLatin), apply_gloss),
    ((FactType::Sense, Source::DiogenesGreek), apply_gloss),
    ((FactType::Sense, Source::Whitakers), apply_gloss),
    ((FactType::Sense, Source::Heritage), apply_gloss),
    ((FactType::Sense, Source::CltkLatin), apply_gloss),
    ((FactType::Sense, Source::CltkGreek), apply_gloss),
    ((FactType::Morph, Source::Heritage), apply_morphology),
    ((FactType::Morph, Source::Whitakers), apply_morphology),
    ((FactType::Morph, Source::CltkLatin), apply_morphology),
    ((FactType::Morph, Source::CltkGreek), apply_morphology),
    ((FactType::Citation, Source::Cdsl), apply_citation),
    ((FactType::Citation, Source::DiogenesLatin), apply_citation),
    ((FactType::Citation, Source::DiogenesGreek), apply_citation),
    ((FactType::Grammar, Source::Cdsl), apply_grammar),
    ((FactType::Grammar, Source::Whitakers), apply_grammar),
    ((FactType::Etymology, Source::Cdsl), apply_etymology),
    ((FactType::Etymology, Source::DiogenesLatin), apply_etymology),
    ((FactType::Etymology, Source::DiogenesGreek), apply_etymology),
];

fn transform_for(fact_type: FactType, source: Source) -> Option<Apply> {
    TRANSFORMS
        .iter()
        .find(|((t, s), _)| *t == fact_type && *s == source)
        .map(|(_, apply)| *apply)
}

/// Synthesize entries for a subject from stored facts, one entry per source,
/// in the stored fact order.
pub fn synthesize_entries(
    subject: &str,
    language: Language,
    facts: &[Fact],
) -> Vec<DictionaryEntry> {
    let mut by_source: Vec<(Source, DictionaryEntry)> = Vec::new();
    for fact in facts {
        let Some(apply) = transform_for(fact.fact_type, fact.tool) else {
            tracing::debug!(
                fact_type = ?fact.fact_type,
                source = %fact.tool,
                "no transform row for fact, skipping"
            );
            continue;
        };
        let idx = match by_source.iter().position(|(s, _)| *s == fact.tool) {
            Some(idx) => idx,
            None => {
                let mut entry = DictionaryEntry {
                    source: fact.tool,
                    headword: subject.to_string(),
                    language,
                    definitions: Vec::new(),
                    citations: Vec::new(),
                    morphology: None,
                    metadata: BTreeMap::new(),
                };
                entry
                    .metadata
                    .insert("synthesized_from_facts".into(), "true".into());
                by_source.push((fact.tool, entry));
                by_source.len() - 1
            }
        };
        apply(fact, &mut by_source[idx].1);
    }

    by_source
        .into_iter()
        .map(|(_, entry)| entry)
        .filter(DictionaryEntry::is_well_formed)
        .collect()
}

fn apply_gloss(fact: &Fact, entry: &mut DictionaryEntry) {
    let FactPayload::Gloss {
        gloss,
        domains,
        register,
        source_ref,
        ..
    } = &fact.payload
    else {
        return;
    };
    let mut definition = DictionaryDefinition::new(gloss.clone());
    definition.source_ref = source_ref.clone();
    definition.domains = domains.clone();
    definition.register = register.clone();
    entry.definitions.push(definition);
}

fn apply_morphology(fact: &Fact, entry: &mut DictionaryEntry) {
    let FactPayload::Morphology { morphology, .. } = &fact.payload else {
        return;
    };
    // First analysis wins; later alternatives stay available as facts.
    if entry.morphology.is_none() {
        entry.morphology = Some(morphology.clone());
    }
}

fn apply_citation(fact: &Fact, entry: &mut DictionaryEntry) {
    let FactPayload::Citation {
        text,
        source_ref,
        cts_urn,
    } = &fact.payload
    else {
        return;
    };
    entry.citations.push(Citation {
        text: text.clone(),
        source_ref: source_ref.clone(),
        cts_urn: cts_urn.clone(),
    });
}

fn apply_grammar(fact: &Fact, entry: &mut DictionaryEntry) {
    match &fact.payload {
        FactPayload::Pos { pos } => {
            for definition in &mut entry.definitions {
                if definition.pos.is_none() {
                    definition.pos = Some(pos.clone());
                }
            }
        }
        FactPayload::Gender { gender } => {
            for definition in &mut entry.definitions {
                if definition.gender.is_none() {
                    definition.gender = Some(gender.clone());
                }
            }
        }
        _ => {}
    }
}

fn apply_etymology(fact: &Fact, entry: &mut DictionaryEntry) {
    let FactPayload::Etymology { text } = &fact.payload else {
        return;
    };
    entry
        .metadata
        .entry("etymology".to_string())
        .or_insert_with(|| text.clone());
}
