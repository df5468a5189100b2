//! Response cache: redb-backed store of serialized query responses.
//!
//! Keyed by `(language, canonical_text, schema_version)`. Each row records
//! its language, byte size, and created/last-accessed timestamps alongside
//! the bincode-encoded entry list. A hot in-memory tier (DashMap) fronts the
//! durable tier so repeated hits within one process never touch disk.
//!
//! The cache is advisory throughout: read and write failures are logged and
//! degrade to a miss, and rows written under a different schema version are
//! ignored. All writes are transactional at the row level, so readers never
//! observe a torn value.

use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

use crate::SCHEMA_VERSION;
use crate::error::CacheError;
use crate::language::Language;
use crate::schema::DictionaryEntry;

const CACHE_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("responses");

/// Key-field separator; never appears in a language code or canonical text.
const SEP: char = '\u{1f}';

/// One durable cache row.
#[derive(Debug, Serialize, Deserialize)]
struct CacheRow {
    schema_version: u32,
    language: String,
    created_at: u64,
    last_accessed_at: u64,
    size_bytes: u64,
    payload: Vec<u8>,
}

/// Aggregate cache statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: u64,
    pub total_bytes: u64,
    pub by_language: Vec<LanguageStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageStats {
    pub language: String,
    pub entries: u64,
    pub bytes: u64,
}

/// The response cache. Cheap to clone; tiers are shared.
#[derive(Clone)]
pub struct ResponseCache {
    db: Arc<Database>,
    hot: Arc<DashMap<String, Vec<DictionaryEntry>>>,
}

impl ResponseCache {
    /// Open or create the cache database at `path`.
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::Io { source: e })?;
        }
        let db = Database::create(path).map_err(|e| CacheError::Corruption {
            message: format!("failed to open cache at {}: {e}", path.display()),
        })?;
        Ok(Self {
            db: Arc::new(db),
            hot: Arc::new(DashMap::new()),
        })
    }

    fn key(language: Language, canonical: &str) -> String {
        format!("{}{SEP}{}{SEP}{}", language.code(), canonical, SCHEMA_VERSION)
    }

    /// Look up a cached response. Any storage trouble reads as a miss.
    pub fn get(&self, language: Language, canonical: &str) -> Option<Vec<DictionaryEntry>> {
        let key = Self::key(language, canonical);
        if let Some(hit) = self.hot.get(&key) {
            return Some(hit.value().clone());
        }
        match self.get_durable(&key) {
            Ok(found) => {
                if let Some(ref entries) = found {
                    self.hot.insert(key, entries.clone());
                }
                found
            }
            Err(err) => {
                tracing::warn!(error = %err, "cache read failed, treating as miss");
                None
            }
        }
    }

    fn get_durable(&self, key: &str) -> Result<Option<Vec<DictionaryEntry>>, CacheError> {
        let txn = self.db.begin_read().map_err(|e| CacheError::Corruption {
            message: format!("begin_read failed: {e}"),
        })?;
        let table = match txn.open_table(CACHE_TABLE) {
            Ok(table) => table,
            // Table absent means a cold cache, not an error.
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => {
                return Err(CacheError::Corruption {
                    message: format!("open_table failed: {e}"),
                });
            }
        };
        let Some(guard) = table.get(key).map_err(|e| CacheError::Corruption {
            message: format!("get failed: {e}"),
        })?
        else {
            return Ok(None);
        };
        let row: CacheRow =
            bincode::deserialize(guard.value()).map_err(|e| CacheError::Serialization {
                message: format!("row decode failed: {e}"),
            })?;
        if row.schema_version != SCHEMA_VERSION {
            tracing::debug!(
                found = row.schema_version,
                expected = SCHEMA_VERSION,
                "cache row from older schema, invalidating"
            );
            return Ok(None);
        }
        let entries: Vec<DictionaryEntry> =
            bincode::deserialize(&row.payload).map_err(|e| CacheError::Serialization {
                message: format!("payload decode failed: {e}"),
            })?;
        Ok(Some(entries))
    }

    /// Store a response, overwriting any previous row for the key.
    pub fn put(&self, language: Language, canonical: &str, entries: &[DictionaryEntry]) {
        let key = Self::key(language, canonical);
        if let Err(err) = self.put_durable(&key, language, entries) {
            tracing::warn!(error = %err, "cache write failed, continuing without");
            return;
        }
        self.hot.insert(key, entries.to_vec());
    }

    fn put_durable(
        &self,
        key: &str,
        language: Language,
        entries: &[DictionaryEntry],
    ) -> Result<(), CacheError> {
        let payload = bincode::serialize(entries).map_err(|e| CacheError::Serialization {
            message: format!("payload encode failed: {e}"),
        })?;
        let now = unix_now();
        let row = CacheRow {
            schema_version: SCHEMA_VERSION,
            language: language.code().to_string(),
            created_at: now,
            last_accessed_at: now,
            size_bytes: payload.len() as u64,
            payload,
        };
        let bytes = bincode::serialize(&row).map_err(|e| CacheError::Serialization {
            message: format!("row encode failed: {e}"),
        })?;

        let txn = self.db.begin_write().map_err(|e| CacheError::Corruption {
            message: format!("begin_write failed: {e}"),
        })?;
        {
            let mut table = txn.open_table(CACHE_TABLE).map_err(|e| CacheError::Corruption {
                message: format!("open_table failed: {e}"),
            })?;
            table
                .insert(key, bytes.as_slice())
                .map_err(|e| CacheError::Corruption {
                    message: format!("insert failed: {e}"),
                })?;
        }
        txn.commit().map_err(|e| CacheError::Corruption {
            message: format!("commit failed: {e}"),
        })
    }

    /// Delete every row for `language` in one transaction. Returns the number
    /// of deleted rows.
    pub fn clear_by_language(&self, language: Language) -> Result<u64, CacheError> {
        let prefix = format!("{}{SEP}", language.code());
        self.hot.retain(|k, _| !k.starts_with(&prefix));

        let txn = self.db.begin_write().map_err(|e| CacheError::Corruption {
            message: format!("begin_write failed: {e}"),
        })?;
        let deleted = {
            let mut table = txn.open_table(CACHE_TABLE).map_err(|e| CacheError::Corruption {
                message: format!("open_table failed: {e}"),
            })?;
            let keys: Vec<String> = table
                .iter()
                .map_err(|e| CacheError::Corruption {
                    message: format!("iter failed: {e}"),
                })?
                .filter_map(|item| item.ok())
                .map(|(k, _)| k.value().to_string())
                .filter(|k| k.starts_with(&prefix))
                .collect();
            for key in &keys {
                table.remove(key.as_str()).map_err(|e| CacheError::Corruption {
                    message: format!("remove failed: {e}"),
                })?;
            }
            keys.len() as u64
        };
        txn.commit().map_err(|e| CacheError::Corruption {
            message: format!("commit failed: {e}"),
        })?;
        Ok(deleted)
    }

    /// Aggregate row counts and byte totals, overall and per language.
    pub fn stats(&self) -> Result<CacheStats, CacheError> {
        let txn = self.db.begin_read().map_err(|e| CacheError::Corruption {
            message: format!("begin_read failed: {e}"),
        })?;
        let table = match txn.open_table(CACHE_TABLE) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => {
                return Ok(CacheStats {
                    total_entries: 0,
                    total_bytes: 0,
                    by_language: Vec::new(),
                });
            }
            Err(e) => {
                return Err(CacheError::Corruption {
                    message: format!("open_table failed: {e}"),
                });
            }
        };

        let mut total_entries = 0u64;
        let mut total_bytes = 0u64;
        let mut per_language: std::collections::BTreeMap<String, (u64, u64)> =
            std::collections::BTreeMap::new();
        for item in table.iter().map_err(|e| CacheError::Corruption {
            message: format!("iter failed: {e}"),
        })? {
            let (_, value) = item.map_err(|e| CacheError::Corruption {
                message: format!("iter item failed: {e}"),
            })?;
            let Ok(row) = bincode::deserialize::<CacheRow>(value.value()) else {
                continue;
            };
            total_entries += 1;
            total_bytes += row.size_bytes;
            let slot = per_language.entry(row.language).or_insert((0, 0));
            slot.0 += 1;
            slot.1 += row.size_bytes;
        }

        Ok(CacheStats {
            total_entries,
            total_bytes,
            by_language: per_language
                .into_iter()
                .map(|(language, (entries, bytes))| LanguageStats {
                    language,
                    entries,
                    bytes,
                })
                .collect(),
        })
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache").finish()
    }
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Source;
    use crate::schema::DictionaryDefinition;
    use tempfile::TempDir;

    fn entry(headword: &str) -> DictionaryEntry {
        DictionaryEntry {
            source: Source::Cdsl,
            headword: headword.into(),
            language: Language::Sanskrit,
            definitions: vec![DictionaryDefinition::new("fire")],
            citations: Vec::new(),
            morphology: None,
            metadata: Default::default(),
        }
    }

    fn open(dir: &TempDir) -> ResponseCache {
        ResponseCache::open(&dir.path().join("cache.redb")).unwrap()
    }

    #[test]
    fn put_get_round_trip() {
        let dir = TempDir::new().unwrap();
        let cache = open(&dir);
        let entries = vec![entry("agni")];
        cache.put(Language::Sanskrit, "agni", &entries);
        assert_eq!(cache.get(Language::Sanskrit, "agni"), Some(entries));
    }

    #[test]
    fn miss_is_none() {
        let dir = TempDir::new().unwrap();
        let cache = open(&dir);
        assert_eq!(cache.get(Language::Latin, "lupus"), None);
    }

    #[test]
    fn put_overwrites() {
        let dir = TempDir::new().unwrap();
        let cache = open(&dir);
        cache.put(Language::Sanskrit, "agni", &[entry("agni")]);
        cache.put(Language::Sanskrit, "agni", &[entry("agni"), entry("agnI")]);
        assert_eq!(cache.get(Language::Sanskrit, "agni").unwrap().len(), 2);
    }

    #[test]
    fn persistence_across_reopens() {
        let dir = TempDir::new().unwrap();
        {
            let cache = open(&dir);
            cache.put(Language::Latin, "lupus", &[entry("lupus")]);
        }
        let cache = open(&dir);
        assert!(cache.get(Language::Latin, "lupus").is_some());
    }

    #[test]
    fn clear_by_language_only_touches_that_language() {
        let dir = TempDir::new().unwrap();
        let cache = open(&dir);
        cache.put(Language::Sanskrit, "agni", &[entry("agni")]);
        cache.put(Language::Latin, "lupus", &[entry("lupus")]);

        let deleted = cache.clear_by_language(Language::Sanskrit).unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(cache.get(Language::Sanskrit, "agni"), None);
        assert!(cache.get(Language::Latin, "lupus").is_some());
    }

    #[test]
    fn stats_aggregate_by_language() {
        let dir = TempDir::new().unwrap();
        let cache = open(&dir);
        cache.put(Language::Sanskrit, "agni", &[entry("agni")]);
        cache.put(Language::Sanskrit, "soma", &[entry("soma")]);
        cache.put(Language::Latin, "lupus", &[entry("lupus")]);

        let stats = cache.stats().unwrap();
        assert_eq!(stats.total_entries, 3);
        assert!(stats.total_bytes > 0);
        let san = stats
            .by_language
            .iter()
            .find(|l| l.language == "san")
            .unwrap();
        assert_eq!(san.entries, 2);
    }
}
