//! CTS URN index: immutable lookup from author/work abbreviations to
//! canonical text URNs.
//!
//! Built offline ([`build`]) from a canonical corpus CSV plus a legacy corpus
//! that fills gaps, then consumed read-only at runtime. Abbreviations match
//! case-insensitively with periods stripped and whitespace collapsed; ties
//! break by preferring the longest match, then the lowest author id.
//!
//! The index is optional end to end: an absent or version-mismatched file
//! just means citations keep `cts_urn = None`.

pub mod build;

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use serde::{Deserialize, Serialize};

use crate::error::CtsError;

pub(crate) const AUTHORS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("authors");
pub(crate) const WORKS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("works");
pub(crate) const ABBREV_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("abbrev_index");
pub(crate) const META_TABLE: TableDefinition<&str, u32> = TableDefinition::new("meta");

/// On-disk schema version for the index file itself.
pub(crate) const CTS_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorRow {
    pub author_id: u64,
    pub name: String,
    pub cts_namespace: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkRow {
    pub author_id: u64,
    pub title: String,
    pub reference_abbrevs: Vec<String>,
    pub cts_urn: String,
}

/// One target of an abbreviation, kept sorted by author id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AbbrevTarget {
    pub author_id: u64,
    pub cts_urn: String,
}

/// The read-only runtime index.
#[derive(Clone)]
pub struct CtsIndex {
    db: Arc<Database>,
}

impl CtsIndex {
    /// Open an index file. Fails on I/O trouble; a version mismatch reads as
    /// "no index" (`Ok(None)`), matching the cold-store policy.
    pub fn open(path: &Path) -> Result<Option<Self>, CtsError> {
        if !path.exists() {
            return Ok(None);
        }
        let db = Database::open(path).map_err(|e| CtsError::Storage {
            message: format!("failed to open CTS index at {}: {e}", path.display()),
        })?;
        let index = Self { db: Arc::new(db) };
        match index.schema_version() {
            Some(CTS_SCHEMA_VERSION) => Ok(Some(index)),
            other => {
                tracing::warn!(
                    found = ?other,
                    expected = CTS_SCHEMA_VERSION,
                    "CTS index schema mismatch, running without it"
                );
                Ok(None)
            }
        }
    }

    fn schema_version(&self) -> Option<u32> {
        let txn = self.db.begin_read().ok()?;
        let table = txn.open_table(META_TABLE).ok()?;
        table.get("schema_version").ok()?.map(|g| g.value())
    }

    /// Fold an abbreviation for matching: lowercase, periods stripped,
    /// whitespace collapsed to single spaces.
    pub fn fold(abbrev: &str) -> String {
        abbrev
            .to_lowercase()
            .replace('.', " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Resolve an exact abbreviation to a CTS URN.
    pub fn resolve(&self, abbrev: &str) -> Option<String> {
        let folded = Self::fold(abbrev);
        if folded.is_empty() {
            return None;
        }
        let txn = self.db.begin_read().ok()?;
        let table = txn.open_table(ABBREV_TABLE).ok()?;
        let guard = table.get(folded.as_str()).ok()??;
        let targets: Vec<AbbrevTarget> = bincode::deserialize(guard.value()).ok()?;
        // Targets were stored sorted by author_id; the first wins.
        targets.first().map(|t| t.cts_urn.clone())
    }

    /// Resolve a reference like `Verg. E. 2, 63`: the longest leading
    /// abbreviation that matches wins, and any trailing numbers become the
    /// passage component.
    pub fn resolve_reference(&self, source_ref: &str) -> Option<String> {
        let (abbrev_part, locus) = split_reference(source_ref);
        let tokens: Vec<&str> = abbrev_part.split_whitespace().collect();
        // Longest token prefix first.
        for take in (1..=tokens.len()).rev() {
            let candidate = tokens[..take].join(" ");
            if let Some(urn) = self.resolve(&candidate) {
                return Some(if locus.is_empty() {
                    urn
                } else {
                    format!("{urn}:{locus}")
                });
            }
        }
        None
    }

    /// Resolve an abbreviation with an explicit locus.
    pub fn resolve_with_locus(
        &self,
        abbrev: &str,
        book: Option<u32>,
        chapter: Option<u32>,
        verse: Option<u32>,
    ) -> Option<String> {
        let urn = self.resolve(abbrev)?;
        let locus: Vec<String> = [book, chapter, verse]
            .iter()
            .flatten()
            .map(|n| n.to_string())
            .collect();
        if locus.is_empty() {
            Some(urn)
        } else {
            Some(format!("{urn}:{}", locus.join(".")))
        }
    }

    /// Number of abbreviations in the index.
    pub fn len(&self) -> u64 {
        let Ok(txn) = self.db.begin_read() else {
            return 0;
        };
        let Ok(table) = txn.open_table(ABBREV_TABLE) else {
            return 0;
        };
        table.len().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for CtsIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CtsIndex").finish()
    }
}

/// Split a Perseus-style reference into its abbreviation head and numeric
/// locus tail (`Verg. E. 2, 63` → `("Verg. E.", "2.63")`).
fn split_reference(source_ref: &str) -> (String, String) {
    let trimmed = source_ref.trim();
    let split_at = trimmed
        .char_indices()
        .find(|(_, c)| c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    let head = trimmed[..split_at].trim().to_string();
    let locus: String = trimmed[split_at..]
        .split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(".");
    (head, locus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_is_case_and_period_insensitive() {
        assert_eq!(CtsIndex::fold("Verg. E."), "verg e");
        assert_eq!(CtsIndex::fold("  VERG   E "), "verg e");
    }

    #[test]
    fn split_reference_extracts_locus() {
        let (head, locus) = split_reference("Verg. E. 2, 63");
        assert_eq!(head, "Verg. E.");
        assert_eq!(locus, "2.63");

        let (head, locus) = split_reference("IG 1(2).374.191");
        assert_eq!(head, "IG");
        assert_eq!(locus, "1.2.374.191");

        let (head, locus) = split_reference("Cic.");
        assert_eq!(head, "Cic.");
        assert_eq!(locus, "");
    }

    #[test]
    fn absent_index_is_ok_none() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nope.redb");
        assert!(CtsIndex::open(&missing).unwrap().is_none());
    }
}
