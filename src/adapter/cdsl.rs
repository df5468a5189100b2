//! CDSL adapter: the Cologne Sanskrit lexicon served from a locally-built
//! embedded index. No network involved.
//!
//! The index maps SLP1 headwords to the raw dictionary blocks exported from
//! the corpus, each with its stable source ref (`mw:217497`). Query results
//! for one headword are consolidated into a single entry whose definitions
//! concatenate in block order; this is the only adapter that consolidates.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

use crate::adapter::{
    AdapterResponse, DictionaryAdapter, Source, parsed_to_entry, parsed_to_facts,
};
use crate::engine::health::ComponentStatus;
use crate::error::AdapterError;
use crate::fact::{Fact, ProvenanceRecord};
use crate::normalize::CanonicalQuery;
use crate::parse::cdsl;
use crate::schema::DictionaryEntry;

const ENTRIES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("entries");

/// One raw block under a headword.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdslBlock {
    pub source_ref: String,
    pub text: String,
}

/// The CDSL adapter. Holds the index database when present; a missing index
/// makes the adapter report itself unavailable instead of failing to build.
pub struct CdslAdapter {
    path: PathBuf,
    db: Option<Arc<Database>>,
}

impl CdslAdapter {
    pub fn open(path: &Path) -> Self {
        let db = match Database::open(path) {
            Ok(db) => Some(Arc::new(db)),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "CDSL index unavailable"
                );
                None
            }
        };
        Self {
            path: path.to_path_buf(),
            db,
        }
    }

    fn blocks_for(&self, headword: &str) -> Result<Vec<CdslBlock>, AdapterError> {
        let Some(db) = &self.db else {
            return Err(AdapterError::Transport {
                source_tag: Source::Cdsl,
                message: format!("CDSL index not found at {}", self.path.display()),
            });
        };
        let txn = db.begin_read().map_err(|e| AdapterError::Protocol {
            source_tag: Source::Cdsl,
            message: format!("begin_read failed: {e}"),
        })?;
        let table = match txn.open_table(ENTRIES_TABLE) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => {
                return Err(AdapterError::Protocol {
                    source_tag: Source::Cdsl,
                    message: format!("open_table failed: {e}"),
                });
            }
        };
        let Some(guard) = table.get(headword).map_err(|e| AdapterError::Protocol {
            source_tag: Source::Cdsl,
            message: format!("get failed: {e}"),
        })?
        else {
            return Ok(Vec::new());
        };
        bincode::deserialize(guard.value()).map_err(|e| AdapterError::Parse {
            source_tag: Source::Cdsl,
            message: format!("block decode failed: {e}"),
        })
    }

    /// Serialize blocks into the raw form `extract_facts` re-parses:
    /// one block per line, `source_ref<TAB>text`.
    fn blocks_to_raw(blocks: &[CdslBlock]) -> String {
        blocks
            .iter()
            .map(|b| format!("{}\t{}", b.source_ref, b.text.replace('\n', " ")))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn raw_to_blocks(raw: &str) -> Vec<CdslBlock> {
        raw.lines()
            .filter_map(|line| {
                let (source_ref, text) = line.split_once('\t')?;
                Some(CdslBlock {
                    source_ref: source_ref.to_string(),
                    text: text.to_string(),
                })
            })
            .collect()
    }

    /// Parse blocks and consolidate entries sharing a headword.
    fn entries_from_blocks(blocks: &[CdslBlock]) -> Vec<DictionaryEntry> {
        let mut consolidated: Vec<DictionaryEntry> = Vec::new();
        for block in blocks {
            let parsed = cdsl::parse(&block.text);
            let mut entry = parsed_to_entry(&parsed);
            for definition in &mut entry.definitions {
                definition.source_ref = Some(block.source_ref.clone());
            }
            match consolidated
                .iter_mut()
                .find(|existing| existing.headword == entry.headword)
            {
                Some(existing) => {
                    existing.definitions.append(&mut entry.definitions);
                    existing.citations.append(&mut entry.citations);
                    for (key, value) in entry.metadata {
                        existing.metadata.entry(key).or_insert(value);
                    }
                }
                None => consolidated.push(entry),
            }
        }
        consolidated
    }
}

impl DictionaryAdapter for CdslAdapter {
    fn source(&self) -> Source {
        Source::Cdsl
    }

    fn query(&self, query: &CanonicalQuery) -> Result<AdapterResponse, AdapterError> {
        let blocks = self.blocks_for(&query.canonical)?;
        tracing::debug!(
            headword = %query.canonical,
            blocks = blocks.len(),
            "CDSL index lookup"
        );
        let entries = Self::entries_from_blocks(&blocks);
        let raw = Self::blocks_to_raw(&blocks);
        let provenance = ProvenanceRecord::new(Source::Cdsl, &query.canonical);
        Ok(AdapterResponse {
            entries,
            raw: (!raw.is_empty()).then_some(raw),
            provenance,
        })
    }

    fn extract_facts(&self, raw: &str, provenance: &ProvenanceRecord) -> Vec<Fact> {
        let mut ordinal = 0;
        let mut facts = Vec::new();
        for block in Self::raw_to_blocks(raw) {
            let parsed = cdsl::parse(&block.text);
            for fact in parsed_to_facts(&parsed, provenance, &mut ordinal) {
                facts.push(patch_gloss_source_ref(fact, &block.source_ref));
            }
        }
        facts
    }

    fn probe(&self) -> ComponentStatus {
        match &self.db {
            Some(_) => ComponentStatus::Healthy,
            None => ComponentStatus::Unavailable {
                detail: format!("index not found at {}", self.path.display()),
            },
        }
    }
}

/// Gloss facts carry the block's stable ref so synthesis can restore
/// per-definition source refs.
fn patch_gloss_source_ref(mut fact: Fact, block_ref: &str) -> Fact {
    if let crate::fact::FactPayload::Gloss { source_ref, .. } = &mut fact.payload {
        *source_ref = Some(block_ref.to_string());
    }
    fact
}

/// Build the CDSL index from a TSV export: `headword<TAB>source_ref<TAB>block`.
pub fn build_index(tsv: &Path, out: &Path) -> Result<u64, AdapterError> {
    use std::collections::BTreeMap;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(tsv)
        .map_err(|e| AdapterError::Transport {
            source_tag: Source::Cdsl,
            message: format!("{}: {e}", tsv.display()),
        })?;

    let mut by_headword: BTreeMap<String, Vec<CdslBlock>> = BTreeMap::new();
    for record in reader.records() {
        let record = record.map_err(|e| AdapterError::Parse {
            source_tag: Source::Cdsl,
            message: e.to_string(),
        })?;
        if record.len() < 3 {
            continue;
        }
        by_headword
            .entry(record[0].to_string())
            .or_default()
            .push(CdslBlock {
                source_ref: record[1].to_string(),
                text: record[2].to_string(),
            });
    }

    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AdapterError::Transport {
            source_tag: Source::Cdsl,
            message: e.to_string(),
        })?;
    }
    let db = Database::create(out).map_err(|e| AdapterError::Transport {
        source_tag: Source::Cdsl,
        message: format!("{}: {e}", out.display()),
    })?;
    let txn = db.begin_write().map_err(protocol)?;
    {
        let mut table = txn.open_table(ENTRIES_TABLE).map_err(protocol)?;
        for (headword, blocks) in &by_headword {
            let bytes = bincode::serialize(blocks).map_err(protocol)?;
            table
                .insert(headword.as_str(), bytes.as_slice())
                .map_err(protocol)?;
        }
    }
    txn.commit().map_err(protocol)?;
    Ok(by_headword.len() as u64)
}

fn protocol<E: std::fmt::Display>(e: E) -> AdapterError {
    AdapterError::Protocol {
        source_tag: Source::Cdsl,
        message: e.to_string(),
    }
}
