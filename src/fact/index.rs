//! The fact index: persistent facts and provenance with a secondary index on
//! `(subject, predicate, source)`.
//!
//! Facts and their provenance are written in one transaction, so the pairing
//! invariant (every fact's `provenance_id` resolves) holds on disk at every
//! point in time. Raw response blobs live in their own table and are written
//! in the same transaction when raw storage is enabled.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};

use crate::SCHEMA_VERSION;
use crate::adapter::Source;
use crate::error::FactError;
use crate::fact::{Fact, Predicate, ProvenanceRecord};
use crate::language::Language;

const FACTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("facts");
const PROVENANCE_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("provenance");
const SUBJECT_INDEX: TableDefinition<&str, &str> = TableDefinition::new("subject_index");
const RAW_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("raw_responses");
const META_TABLE: TableDefinition<&str, u32> = TableDefinition::new("meta");

const SEP: char = '\u{1f}';

/// Persistent store of facts with provenance.
#[derive(Clone)]
pub struct FactIndex {
    db: Arc<Database>,
}

impl FactIndex {
    /// Open or create the fact index at `path`. A schema-version mismatch
    /// wipes to a cold store rather than failing.
    pub fn open(path: &Path) -> Result<Self, FactError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| FactError::Io { source: e })?;
        }
        let db = Database::create(path).map_err(|e| FactError::Corruption {
            message: format!("failed to open fact index at {}: {e}", path.display()),
        })?;
        let index = Self { db: Arc::new(db) };
        index.ensure_schema()?;
        Ok(index)
    }

    fn ensure_schema(&self) -> Result<(), FactError> {
        let stored = {
            let txn = self.db.begin_read().map_err(corruption)?;
            match txn.open_table(META_TABLE) {
                Ok(table) => table
                    .get("schema_version")
                    .map_err(corruption)?
                    .map(|g| g.value()),
                Err(redb::TableError::TableDoesNotExist(_)) => None,
                Err(e) => return Err(corruption(e)),
            }
        };
        if stored == Some(SCHEMA_VERSION) {
            return Ok(());
        }
        if stored.is_some() {
            tracing::warn!(
                found = ?stored,
                expected = SCHEMA_VERSION,
                "fact index schema mismatch, starting cold"
            );
        }
        let txn = self.db.begin_write().map_err(corruption)?;
        {
            if stored.is_some() {
                // Old-format rows are unreadable under the new schema.
                let _ = txn.delete_table(FACTS_TABLE);
                let _ = txn.delete_table(PROVENANCE_TABLE);
                let _ = txn.delete_table(SUBJECT_INDEX);
                let _ = txn.delete_table(RAW_TABLE);
            }
            let mut meta = txn.open_table(META_TABLE).map_err(corruption)?;
            meta.insert("schema_version", SCHEMA_VERSION)
                .map_err(corruption)?;
        }
        txn.commit().map_err(corruption)
    }

    fn index_key(fact: &Fact) -> String {
        format!(
            "{}{SEP}{}{SEP}{}{SEP}{}{SEP}{}",
            fact.language.code(),
            fact.subject,
            fact.predicate.tag(),
            fact.tool.tag(),
            fact.fact_id
        )
    }

    /// Write facts, their provenance, and optionally the raw response, in one
    /// transaction.
    pub fn write(
        &self,
        facts: &[Fact],
        provenance: &ProvenanceRecord,
        raw: Option<&[u8]>,
    ) -> Result<(), FactError> {
        let txn = self.db.begin_write().map_err(corruption)?;
        {
            let mut facts_table = txn.open_table(FACTS_TABLE).map_err(corruption)?;
            let mut index_table = txn.open_table(SUBJECT_INDEX).map_err(corruption)?;
            for fact in facts {
                debug_assert_eq!(fact.provenance_id, provenance.provenance_id);
                let bytes = bincode::serialize(fact).map_err(serialization)?;
                facts_table
                    .insert(fact.fact_id.as_str(), bytes.as_slice())
                    .map_err(corruption)?;
                index_table
                    .insert(Self::index_key(fact).as_str(), fact.fact_id.as_str())
                    .map_err(corruption)?;
            }

            let mut prov_table = txn.open_table(PROVENANCE_TABLE).map_err(corruption)?;
            let bytes = bincode::serialize(provenance).map_err(serialization)?;
            prov_table
                .insert(provenance.provenance_id.as_str(), bytes.as_slice())
                .map_err(corruption)?;

            if let (Some(raw), Some(raw_ref)) = (raw, provenance.raw_ref.as_deref()) {
                let mut raw_table = txn.open_table(RAW_TABLE).map_err(corruption)?;
                raw_table.insert(raw_ref, raw).map_err(corruption)?;
            }
        }
        txn.commit().map_err(corruption)
    }

    /// Look up facts for `(language, subject)` matching any of `predicates`.
    /// The cursor is finite; callers materialize it within the request.
    pub fn lookup(
        &self,
        language: Language,
        subject: &str,
        predicates: &[Predicate],
    ) -> Result<Vec<Fact>, FactError> {
        let txn = self.db.begin_read().map_err(corruption)?;
        let index_table = match txn.open_table(SUBJECT_INDEX) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(corruption(e)),
        };
        let facts_table = match txn.open_table(FACTS_TABLE) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(corruption(e)),
        };

        let mut facts = Vec::new();
        for predicate in predicates {
            let prefix = format!(
                "{}{SEP}{}{SEP}{}{SEP}",
                language.code(),
                subject,
                predicate.tag()
            );
            let upper = format!("{prefix}\u{7f}");
            let range = index_table
                .range(prefix.as_str()..upper.as_str())
                .map_err(corruption)?;
            for item in range {
                let (_, fact_id) = item.map_err(corruption)?;
                let Some(guard) = facts_table.get(fact_id.value()).map_err(corruption)? else {
                    continue;
                };
                let fact: Fact = bincode::deserialize(guard.value()).map_err(serialization)?;
                facts.push(fact);
            }
        }
        Ok(facts)
    }

    /// Fetch a provenance record by id.
    pub fn provenance(&self, provenance_id: &str) -> Result<Option<ProvenanceRecord>, FactError> {
        let txn = self.db.begin_read().map_err(corruption)?;
        let table = match txn.open_table(PROVENANCE_TABLE) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(corruption(e)),
        };
        let Some(guard) = table.get(provenance_id).map_err(corruption)? else {
            return Ok(None);
        };
        Ok(Some(
            bincode::deserialize(guard.value()).map_err(serialization)?,
        ))
    }

    /// Fetch a stored raw response by `raw_ref`.
    pub fn raw_response(&self, raw_ref: &str) -> Result<Option<Vec<u8>>, FactError> {
        let txn = self.db.begin_read().map_err(corruption)?;
        let table = match txn.open_table(RAW_TABLE) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(corruption(e)),
        };
        Ok(table
            .get(raw_ref)
            .map_err(corruption)?
            .map(|g| g.value().to_vec()))
    }

    /// Delete facts for `(language, subject)`, optionally restricted to one
    /// source. Returns the number of facts removed.
    pub fn forget(
        &self,
        language: Language,
        subject: &str,
        source: Option<Source>,
    ) -> Result<u64, FactError> {
        let prefix = format!("{}{SEP}{}{SEP}", language.code(), subject);
        self.delete_by_index_prefix(&prefix, source)
    }

    /// Delete every fact for a language. Returns the number removed.
    pub fn clear_language(&self, language: Language) -> Result<u64, FactError> {
        let prefix = format!("{}{SEP}", language.code());
        self.delete_by_index_prefix(&prefix, None)
    }

    fn delete_by_index_prefix(
        &self,
        prefix: &str,
        source: Option<Source>,
    ) -> Result<u64, FactError> {
        let txn = self.db.begin_write().map_err(corruption)?;
        let deleted = {
            let mut index_table = txn.open_table(SUBJECT_INDEX).map_err(corruption)?;
            let mut facts_table = txn.open_table(FACTS_TABLE).map_err(corruption)?;

            let victims: Vec<(String, String)> = index_table
                .iter()
                .map_err(corruption)?
                .filter_map(|item| item.ok())
                .map(|(k, v)| (k.value().to_string(), v.value().to_string()))
                .filter(|(k, _)| k.starts_with(prefix))
                .filter(|(k, _)| match source {
                    Some(source) => {
                        let fields: Vec<&str> = k.split(SEP).collect();
                        fields.get(3) == Some(&source.tag())
                    }
                    None => true,
                })
                .collect();

            for (index_key, fact_id) in &victims {
                index_table
                    .remove(index_key.as_str())
                    .map_err(corruption)?;
                facts_table.remove(fact_id.as_str()).map_err(corruption)?;
            }
            victims.len() as u64
        };
        txn.commit().map_err(corruption)?;
        Ok(deleted)
    }

    /// Total number of stored facts.
    pub fn len(&self) -> u64 {
        let Ok(txn) = self.db.begin_read() else {
            return 0;
        };
        let Ok(table) = txn.open_table(FACTS_TABLE) else {
            return 0;
        };
        table.len().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for FactIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactIndex").finish()
    }
}

fn corruption<E: std::fmt::Display>(e: E) -> FactError {
    FactError::Corruption {
        message: e.to_string(),
    }
}

fn serialization<E: std::fmt::Display>(e: E) -> FactError {
    FactError::Serialization {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fact::FactPayload;
    use tempfile::TempDir;

    fn gloss_fact(provenance_id: &str, subject: &str, ordinal: usize) -> Fact {
        Fact::new(
            Source::Cdsl,
            Language::Sanskrit,
            subject,
            FactPayload::Gloss {
                gloss: "fire".into(),
                domains: Vec::new(),
                register: Vec::new(),
                source_ref: Some("mw:217497".into()),
                tool_specific: Default::default(),
            },
            provenance_id,
            ordinal,
        )
    }

    fn open(dir: &TempDir) -> FactIndex {
        FactIndex::open(&dir.path().join("facts.redb")).unwrap()
    }

    #[test]
    fn write_then_lookup() {
        let dir = TempDir::new().unwrap();
        let index = open(&dir);
        let prov = ProvenanceRecord::new(Source::Cdsl, "agni");
        let facts = vec![
            gloss_fact(&prov.provenance_id, "agni", 0),
            gloss_fact(&prov.provenance_id, "agni", 1),
        ];
        index.write(&facts, &prov, None).unwrap();

        let found = index
            .lookup(Language::Sanskrit, "agni", &[Predicate::HasGloss])
            .unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|f| f.subject == "agni"));
    }

    #[test]
    fn every_fact_has_matching_provenance() {
        let dir = TempDir::new().unwrap();
        let index = open(&dir);
        let prov = ProvenanceRecord::new(Source::Cdsl, "agni");
        index
            .write(&[gloss_fact(&prov.provenance_id, "agni", 0)], &prov, None)
            .unwrap();

        let found = index
            .lookup(Language::Sanskrit, "agni", &[Predicate::HasGloss])
            .unwrap();
        let record = index.provenance(&found[0].provenance_id).unwrap().unwrap();
        assert_eq!(record.provenance_id, prov.provenance_id);
    }

    #[test]
    fn lookup_filters_by_predicate_and_subject() {
        let dir = TempDir::new().unwrap();
        let index = open(&dir);
        let prov = ProvenanceRecord::new(Source::Cdsl, "agni");
        index
            .write(&[gloss_fact(&prov.provenance_id, "agni", 0)], &prov, None)
            .unwrap();

        assert!(index
            .lookup(Language::Sanskrit, "agni", &[Predicate::HasMorphology])
            .unwrap()
            .is_empty());
        assert!(index
            .lookup(Language::Sanskrit, "soma", &[Predicate::HasGloss])
            .unwrap()
            .is_empty());
        assert!(index
            .lookup(Language::Latin, "agni", &[Predicate::HasGloss])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn raw_responses_round_trip() {
        let dir = TempDir::new().unwrap();
        let index = open(&dir);
        let mut prov = ProvenanceRecord::new(Source::Heritage, "agnii");
        prov.raw_ref = Some(prov.derive_raw_ref());
        index
            .write(
                &[gloss_fact(&prov.provenance_id, "agni", 0)],
                &prov,
                Some(b"<html>raw</html>"),
            )
            .unwrap();

        let raw = index
            .raw_response(prov.raw_ref.as_deref().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(raw, b"<html>raw</html>");
    }

    #[test]
    fn forget_restricted_to_source() {
        let dir = TempDir::new().unwrap();
        let index = open(&dir);
        let prov = ProvenanceRecord::new(Source::Cdsl, "agni");
        index
            .write(&[gloss_fact(&prov.provenance_id, "agni", 0)], &prov, None)
            .unwrap();

        // Wrong source deletes nothing.
        assert_eq!(
            index
                .forget(Language::Sanskrit, "agni", Some(Source::Heritage))
                .unwrap(),
            0
        );
        assert_eq!(
            index
                .forget(Language::Sanskrit, "agni", Some(Source::Cdsl))
                .unwrap(),
            1
        );
        assert!(index.is_empty());
    }

    #[test]
    fn clear_language_scopes_deletion() {
        let dir = TempDir::new().unwrap();
        let index = open(&dir);
        let prov = ProvenanceRecord::new(Source::Cdsl, "agni");
        index
            .write(&[gloss_fact(&prov.provenance_id, "agni", 0)], &prov, None)
            .unwrap();

        assert_eq!(index.clear_language(Language::Latin).unwrap(), 0);
        assert_eq!(index.clear_language(Language::Sanskrit).unwrap(), 1);
    }

    #[test]
    fn persistence_across_reopens() {
        let dir = TempDir::new().unwrap();
        let prov = ProvenanceRecord::new(Source::Cdsl, "agni");
        {
            let index = open(&dir);
            index
                .write(&[gloss_fact(&prov.provenance_id, "agni", 0)], &prov, None)
                .unwrap();
        }
        let index = open(&dir);
        assert_eq!(index.len(), 1);
    }
}
