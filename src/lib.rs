// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # glossarion
//!
//! A unified reference service for classical-language learners. Given a word
//! in Latin, Ancient Greek, or Sanskrit, glossarion returns a structured entry
//! combining morphological analyses, dictionary senses, and scholarly
//! citations drawn from several heterogeneous upstream lexical resources.
//!
//! ## Architecture
//!
//! - **Transliteration kernel** (`translit`): pure conversions among
//!   Devanagari, IAST, SLP1, Velthuis, Harvard-Kyoto, Betacode, and Unicode
//! - **Encoding detection** (`detect`): priority-ordered syntactic classifier
//! - **Normalization** (`normalize`): per-language canonical queries with an
//!   optional external canonical-lookup probe for bare ASCII Sanskrit
//! - **Entry parsers** (`parse`): grammar-driven parsers for CDSL, Diogenes,
//!   Lewis & Short, and Heritage dictionary blocks
//! - **Backend adapters** (`adapter`): one adapter per upstream source,
//!   mapping parsed entries into the universal schema
//! - **Query engine** (`engine`): routing, concurrent fan-out, joining,
//!   caching, and fact-index integration
//! - **Persistent stores** (`cache`, `cts`, `fact`): redb-backed response
//!   cache, CTS URN index, and fact/provenance index
//!
//! ## Library usage
//!
//! ```no_run
//! use glossarion::config::Config;
//! use glossarion::engine::{QueryEngine, Wiring};
//! use glossarion::language::Language;
//!
//! let wiring = Wiring::open(&Config::default()).unwrap();
//! let engine = QueryEngine::new(wiring);
//! let response = engine.query(Language::Latin, "lupus", false).unwrap();
//! for entry in &response.entries {
//!     println!("{}: {} definitions", entry.headword, entry.definitions.len());
//! }
//! ```

pub mod adapter;
pub mod cache;
pub mod config;
pub mod cts;
pub mod detect;
pub mod engine;
pub mod error;
pub mod fact;
pub mod language;
pub mod normalize;
pub mod parse;
pub mod paths;
pub mod reaper;
pub mod schema;
pub mod translit;

/// Serialized-response schema version. Cache rows written under a different
/// version are treated as misses and invalidated.
pub const SCHEMA_VERSION: u32 = 3;
