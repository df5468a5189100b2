//! Shared test fixtures: mock adapters over the real parsers.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use glossarion::adapter::{
    AdapterResponse, DictionaryAdapter, Source, parsed_to_entry, parsed_to_facts,
};
use glossarion::config::Config;
use glossarion::error::AdapterError;
use glossarion::fact::{Fact, ProvenanceRecord};
use glossarion::language::Language;
use glossarion::normalize::CanonicalQuery;
use glossarion::parse;
use glossarion::schema::{DictionaryDefinition, DictionaryEntry, MorphologyInfo};

/// Block separator in the mock's raw payloads.
pub const RAW_SEP: char = '\u{1e}';

/// An adapter that answers every query with fixed raw blocks, run through the
/// real per-source parser. This exercises the same parse → map path the
/// production adapters use, without a live upstream.
pub struct BlockAdapter {
    pub source: Source,
    pub language: Language,
    pub blocks: Vec<String>,
}

impl BlockAdapter {
    pub fn new(source: Source, language: Language, blocks: &[&str]) -> Arc<dyn DictionaryAdapter> {
        Arc::new(Self {
            source,
            language,
            blocks: blocks.iter().map(|b| b.to_string()).collect(),
        })
    }

    fn parse_block(&self, headword: &str, block: &str) -> Vec<glossarion::parse::ParsedEntry> {
        match self.source {
            Source::Cdsl => vec![parse::cdsl::parse(block)],
            Source::Heritage => parse::heritage::parse(block),
            _ => vec![parse::diogenes::parse(self.language, headword, block)],
        }
    }
}

impl DictionaryAdapter for BlockAdapter {
    fn source(&self) -> Source {
        self.source
    }

    fn query(&self, query: &CanonicalQuery) -> Result<AdapterResponse, AdapterError> {
        let mut entries = Vec::new();
        for block in &self.blocks {
            for parsed in self.parse_block(&query.canonical, block) {
                entries.push(parsed_to_entry(&parsed));
            }
        }
        Ok(AdapterResponse {
            entries,
            raw: Some(
                self.blocks
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(&RAW_SEP.to_string()),
            ),
            provenance: ProvenanceRecord::new(self.source, &query.canonical),
        })
    }

    fn extract_facts(&self, raw: &str, provenance: &ProvenanceRecord) -> Vec<Fact> {
        let mut ordinal = 0;
        let mut facts = Vec::new();
        for block in raw.split(RAW_SEP) {
            for parsed in self.parse_block("", block) {
                facts.extend(parsed_to_facts(&parsed, provenance, &mut ordinal));
            }
        }
        facts
    }
}

/// An adapter that always fails with a transport error.
pub struct FailingAdapter(pub Source);

impl DictionaryAdapter for FailingAdapter {
    fn source(&self) -> Source {
        self.0
    }

    fn query(&self, _query: &CanonicalQuery) -> Result<AdapterResponse, AdapterError> {
        Err(AdapterError::Transport {
            source_tag: self.0,
            message: "connection refused".into(),
        })
    }

    fn extract_facts(&self, _raw: &str, _provenance: &ProvenanceRecord) -> Vec<Fact> {
        Vec::new()
    }
}

/// An adapter that sleeps past any reasonable deadline.
pub struct SlowAdapter {
    pub source: Source,
    pub delay: Duration,
}

impl DictionaryAdapter for SlowAdapter {
    fn source(&self) -> Source {
        self.source
    }

    fn query(&self, query: &CanonicalQuery) -> Result<AdapterResponse, AdapterError> {
        std::thread::sleep(self.delay);
        Ok(AdapterResponse {
            entries: Vec::new(),
            raw: None,
            provenance: ProvenanceRecord::new(self.source, &query.canonical),
        })
    }

    fn extract_facts(&self, _raw: &str, _provenance: &ProvenanceRecord) -> Vec<Fact> {
        Vec::new()
    }
}

/// A Whitaker's-shaped mock: morphology plus glosses.
pub struct MorphAdapter {
    pub source: Source,
    pub language: Language,
    pub lemma: String,
    pub pos: String,
    pub glosses: Vec<String>,
}

impl MorphAdapter {
    pub fn new(
        source: Source,
        language: Language,
        lemma: &str,
        pos: &str,
        glosses: &[&str],
    ) -> Arc<dyn DictionaryAdapter> {
        Arc::new(Self {
            source,
            language,
            lemma: lemma.to_string(),
            pos: pos.to_string(),
            glosses: glosses.iter().map(|g| g.to_string()).collect(),
        })
    }
}

impl DictionaryAdapter for MorphAdapter {
    fn source(&self) -> Source {
        self.source
    }

    fn query(&self, query: &CanonicalQuery) -> Result<AdapterResponse, AdapterError> {
        let mut entry = DictionaryEntry {
            source: self.source,
            headword: self.lemma.clone(),
            language: self.language,
            definitions: Vec::new(),
            citations: Vec::new(),
            morphology: Some(MorphologyInfo {
                lemma: self.lemma.clone(),
                pos: self.pos.clone(),
                features: BTreeMap::new(),
                confidence: 0.85,
            }),
            metadata: BTreeMap::new(),
        };
        for gloss in &self.glosses {
            let mut definition = DictionaryDefinition::new(gloss.clone());
            definition.pos = Some(self.pos.clone());
            entry.definitions.push(definition);
        }
        Ok(AdapterResponse {
            entries: vec![entry],
            raw: None,
            provenance: ProvenanceRecord::new(self.source, &query.canonical),
        })
    }

    fn extract_facts(&self, _raw: &str, _provenance: &ProvenanceRecord) -> Vec<Fact> {
        Vec::new()
    }
}

/// A config with everything external disabled, suitable for offline tests.
pub fn offline_config() -> Config {
    Config {
        cache_enabled: false,
        canonical_probe_enabled: false,
        fact_index_enabled: false,
        adapter_timeout_ms: 1_000,
        ..Config::default()
    }
}
