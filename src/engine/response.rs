//! The query response shape: entries plus request metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AdapterErrorKind;
use crate::normalize::CanonicalQuery;
use crate::schema::DictionaryEntry;
use crate::translit::Encoding;

/// What normalization did to the input, echoed back with every response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationInfo {
    pub original: String,
    pub canonical: String,
    pub detected_encoding: Encoding,
    pub confidence: f32,
    pub notes: Vec<String>,
}

impl From<&CanonicalQuery> for NormalizationInfo {
    fn from(query: &CanonicalQuery) -> Self {
        Self {
            original: query.original.clone(),
            canonical: query.canonical.clone(),
            detected_encoding: query.detected_encoding,
            confidence: query.confidence,
            notes: query.notes.clone(),
        }
    }
}

/// One adapter failure, keyed by source tag in the response's error map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseError {
    pub kind: AdapterErrorKind,
    pub message: String,
}

/// A complete query response. Underscore-prefixed names on the wire mark the
/// metadata fields off from the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub entries: Vec<DictionaryEntry>,
    #[serde(rename = "_normalization")]
    pub normalization: NormalizationInfo,
    #[serde(rename = "_errors", skip_serializing_if = "BTreeMap::is_empty", default)]
    pub errors: BTreeMap<String, ResponseError>,
    #[serde(rename = "_from_cache")]
    pub from_cache: bool,
    #[serde(rename = "_from_facts")]
    pub from_facts: bool,
    #[serde(rename = "_violations", skip_serializing_if = "Vec::is_empty", default)]
    pub violations: Vec<String>,
}

impl QueryResponse {
    pub(crate) fn new(query: &CanonicalQuery) -> Self {
        Self {
            entries: Vec::new(),
            normalization: NormalizationInfo::from(query),
            errors: BTreeMap::new(),
            from_cache: false,
            from_facts: false,
            violations: Vec::new(),
        }
    }
}
