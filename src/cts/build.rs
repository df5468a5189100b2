//! Offline CTS index builder.
//!
//! Ingests two corpus CSVs — a canonical (Perseus-style) corpus and a legacy
//! classics-data corpus — and writes the authors/works/abbrev tables in one
//! transaction. Legacy rows only fill abbreviations the canonical corpus
//! left empty; they never override it.
//!
//! Expected CSV columns:
//! `author_id, author_name, cts_namespace, title, abbrevs, cts_urn`
//! where `abbrevs` is semicolon-separated.

use std::collections::BTreeMap;
use std::path::Path;

use redb::Database;

use crate::cts::{
    ABBREV_TABLE, AUTHORS_TABLE, AbbrevTarget, AuthorRow, CTS_SCHEMA_VERSION, CtsIndex,
    META_TABLE, WORKS_TABLE, WorkRow,
};
use crate::error::CtsError;

/// Summary of one build run.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub authors: u64,
    pub works: u64,
    pub abbreviations: u64,
    pub legacy_fills: u64,
}

/// Build the index at `out` from the two corpora. `legacy` may be absent.
pub fn build_index(
    canonical: &Path,
    legacy: Option<&Path>,
    out: &Path,
) -> Result<BuildReport, CtsError> {
    let mut authors: BTreeMap<u64, AuthorRow> = BTreeMap::new();
    let mut works: Vec<WorkRow> = Vec::new();
    let mut abbrevs: BTreeMap<String, Vec<AbbrevTarget>> = BTreeMap::new();
    let mut legacy_fills = 0u64;

    ingest_csv(canonical, &mut authors, &mut works, &mut abbrevs, false)?;
    if let Some(legacy) = legacy {
        legacy_fills = ingest_csv(legacy, &mut authors, &mut works, &mut abbrevs, true)?;
    }

    // Tie-break storage order: author_id ascending within each abbreviation.
    for targets in abbrevs.values_mut() {
        targets.sort_by_key(|t| t.author_id);
        targets.dedup_by(|a, b| a.author_id == b.author_id && a.cts_urn == b.cts_urn);
    }

    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CtsError::Io { source: e })?;
    }
    let db = Database::create(out).map_err(|e| CtsError::Storage {
        message: format!("failed to create index at {}: {e}", out.display()),
    })?;
    let txn = db.begin_write().map_err(|e| CtsError::Storage {
        message: format!("begin_write failed: {e}"),
    })?;
    {
        let mut meta = txn.open_table(META_TABLE).map_err(storage_err)?;
        meta.insert("schema_version", CTS_SCHEMA_VERSION)
            .map_err(storage_err)?;

        let mut authors_table = txn.open_table(AUTHORS_TABLE).map_err(storage_err)?;
        for (id, row) in &authors {
            let bytes = bincode::serialize(row).map_err(|e| CtsError::Storage {
                message: format!("author encode failed: {e}"),
            })?;
            authors_table
                .insert(*id, bytes.as_slice())
                .map_err(storage_err)?;
        }

        let mut works_table = txn.open_table(WORKS_TABLE).map_err(storage_err)?;
        for (i, row) in works.iter().enumerate() {
            let bytes = bincode::serialize(row).map_err(|e| CtsError::Storage {
                message: format!("work encode failed: {e}"),
            })?;
            works_table
                .insert(i as u64, bytes.as_slice())
                .map_err(storage_err)?;
        }

        let mut abbrev_table = txn.open_table(ABBREV_TABLE).map_err(storage_err)?;
        for (abbrev, targets) in &abbrevs {
            let bytes = bincode::serialize(targets).map_err(|e| CtsError::Storage {
                message: format!("abbrev encode failed: {e}"),
            })?;
            abbrev_table
                .insert(abbrev.as_str(), bytes.as_slice())
                .map_err(storage_err)?;
        }
    }
    txn.commit().map_err(|e| CtsError::Storage {
        message: format!("commit failed: {e}"),
    })?;

    Ok(BuildReport {
        authors: authors.len() as u64,
        works: works.len() as u64,
        abbreviations: abbrevs.len() as u64,
        legacy_fills,
    })
}

fn storage_err<E: std::fmt::Display>(e: E) -> CtsError {
    CtsError::Storage {
        message: e.to_string(),
    }
}

/// Read one corpus CSV into the accumulators. With `fill_only`, abbreviations
/// already present are skipped; returns how many rows were actually added.
fn ingest_csv(
    path: &Path,
    authors: &mut BTreeMap<u64, AuthorRow>,
    works: &mut Vec<WorkRow>,
    abbrevs: &mut BTreeMap<String, Vec<AbbrevTarget>>,
    fill_only: bool,
) -> Result<u64, CtsError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| CtsError::Build {
            message: format!("{}: {e}", path.display()),
        })?;

    let mut added = 0u64;
    for record in reader.records() {
        let record = record.map_err(|e| CtsError::Build {
            message: format!("{}: {e}", path.display()),
        })?;
        if record.len() < 6 {
            return Err(CtsError::Build {
                message: format!(
                    "{}: expected 6 columns, found {}",
                    path.display(),
                    record.len()
                ),
            });
        }
        let author_id: u64 = record[0].parse().map_err(|_| CtsError::Build {
            message: format!("{}: bad author_id {:?}", path.display(), &record[0]),
        })?;
        let cts_urn = record[5].to_string();
        if cts_urn.is_empty() {
            continue;
        }

        authors.entry(author_id).or_insert_with(|| AuthorRow {
            author_id,
            name: record[1].to_string(),
            cts_namespace: record[2].to_string(),
        });

        let reference_abbrevs: Vec<String> = record[4]
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        works.push(WorkRow {
            author_id,
            title: record[3].to_string(),
            reference_abbrevs: reference_abbrevs.clone(),
            cts_urn: cts_urn.clone(),
        });

        for abbrev in reference_abbrevs {
            let folded = CtsIndex::fold(&abbrev);
            if folded.is_empty() {
                continue;
            }
            let slot = abbrevs.entry(folded).or_default();
            if fill_only && !slot.is_empty() {
                continue;
            }
            slot.push(AbbrevTarget {
                author_id,
                cts_urn: cts_urn.clone(),
            });
            added += 1;
        }
    }
    Ok(added)
}
