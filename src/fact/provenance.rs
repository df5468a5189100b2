//! Provenance records: where a fact came from.
//!
//! A raw response may produce many facts pointing back at one provenance row,
//! and the row may point onward into the raw-response blob store. The graph
//! is two tables joined by `provenance_id`; nothing here holds back-pointers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::adapter::Source;
use crate::cache::unix_now;

/// One provenance record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    /// Stable hash of source + request + timestamp.
    pub provenance_id: String,
    pub source: Source,
    /// Stable identifier within the source, when one applies to the whole
    /// response (e.g. a dictionary page id).
    pub source_ref: Option<String>,
    /// The upstream request, for HTTP sources.
    pub request_url: Option<String>,
    /// Pointer into the raw-response blob store, when raw storage is on.
    pub raw_ref: Option<String>,
    /// Seconds since the UNIX epoch.
    pub extracted_at: u64,
    pub tool_version: String,
    pub metadata: BTreeMap<String, String>,
}

impl ProvenanceRecord {
    /// Build a record for one adapter response.
    pub fn new(source: Source, request: &str) -> Self {
        let extracted_at = unix_now();
        let provenance_id = {
            let mut hasher = Sha256::new();
            hasher.update(source.tag().as_bytes());
            hasher.update(request.as_bytes());
            hasher.update(extracted_at.to_le_bytes());
            let digest = hasher.finalize();
            let hex: String = digest.iter().take(8).map(|b| format!("{b:02x}")).collect();
            format!("prov:{hex}")
        };
        Self {
            provenance_id,
            source,
            source_ref: None,
            request_url: None,
            raw_ref: None,
            extracted_at,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_request_url(mut self, url: impl Into<String>) -> Self {
        self.request_url = Some(url.into());
        self
    }

    pub fn with_raw_ref(mut self, raw_ref: impl Into<String>) -> Self {
        self.raw_ref = Some(raw_ref.into());
        self
    }

    /// The blob-store key for this record's raw response.
    pub fn derive_raw_ref(&self) -> String {
        format!("raw:{}", &self.provenance_id[5..])
    }
}
