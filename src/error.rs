//! Rich diagnostic error types for the glossarion engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

use crate::adapter::Source;

/// Top-level error type for the glossarion engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source spans) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum GlossarionError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Adapter(#[from] AdapterError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Fact(#[from] FactError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Cts(#[from] CtsError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] crate::paths::PathError),
}

// ---------------------------------------------------------------------------
// Transliteration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum EncodingError {
    #[error("malformed {expected} input at byte {offset}")]
    #[diagnostic(
        code(glossarion::translit::malformed),
        help(
            "The input contains a byte sequence that is not valid in the \
             source encoding. Check for mixed encodings (e.g. IAST diacritics \
             inside an SLP1 token) or stray punctuation."
        )
    )]
    Malformed { offset: usize, expected: String },

    #[error("unknown transliteration scheme: {scheme}")]
    #[diagnostic(
        code(glossarion::translit::unknown_scheme),
        help("Supported schemes: Devanagari, IAST, SLP1, Velthuis, HK, Betacode, Unicode.")
    )]
    Unknown { scheme: String },
}

// ---------------------------------------------------------------------------
// Normalization errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum NormalizeError {
    #[error("empty query")]
    #[diagnostic(
        code(glossarion::normalize::empty),
        help("Provide a non-empty, non-whitespace term to look up.")
    )]
    Empty,

    #[error("unsupported language: {language}")]
    #[diagnostic(
        code(glossarion::normalize::unsupported_language),
        help("Supported languages: lat (Latin), grc (Ancient Greek), san (Sanskrit).")
    )]
    UnsupportedLanguage { language: String },

    #[error("canonical-lookup probe failed: {message}")]
    #[diagnostic(
        code(glossarion::normalize::probe_failed),
        help(
            "The external canonical-lookup service could not be reached or \
             returned an unusable page. Normalization continues with the \
             syntactic conversion at reduced confidence."
        )
    )]
    ProbeFailed { message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Encoding(#[from] EncodingError),
}

// ---------------------------------------------------------------------------
// Adapter errors
// ---------------------------------------------------------------------------

/// Failure kinds an adapter can report. Captured into the response's error
/// map by the engine; an adapter failure never aborts the whole query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AdapterErrorKind {
    Transport,
    Timeout,
    Protocol,
    Parse,
}

impl std::fmt::Display for AdapterErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AdapterErrorKind::Transport => "transport",
            AdapterErrorKind::Timeout => "timeout",
            AdapterErrorKind::Protocol => "protocol",
            AdapterErrorKind::Parse => "parse",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum AdapterError {
    #[error("{source_tag}: transport failure: {message}")]
    #[diagnostic(
        code(glossarion::adapter::transport),
        help(
            "The upstream service could not be reached. Check that the local \
             helper (Diogenes, Heritage CGI, Whitaker's binary) is running \
             and that its URL or path in the configuration is correct."
        )
    )]
    Transport { source_tag: Source, message: String },

    #[error("{source_tag}: timed out after {elapsed_ms} ms")]
    #[diagnostic(
        code(glossarion::adapter::timeout),
        help("Increase `adapter_timeout_ms` in the configuration, or check the upstream's load.")
    )]
    Timeout { source_tag: Source, elapsed_ms: u64 },

    #[error("{source_tag}: protocol error: {message}")]
    #[diagnostic(
        code(glossarion::adapter::protocol),
        help(
            "The upstream answered, but not in the expected shape. \
             This usually means an upstream version change."
        )
    )]
    Protocol { source_tag: Source, message: String },

    #[error("{source_tag}: catastrophic parse failure: {message}")]
    #[diagnostic(
        code(glossarion::adapter::parse),
        help(
            "The response could not be parsed even by the fallback path. \
             File a bug with the raw response attached."
        )
    )]
    Parse { source_tag: Source, message: String },
}

impl AdapterError {
    /// The failure kind, for the response error map.
    pub fn kind(&self) -> AdapterErrorKind {
        match self {
            AdapterError::Transport { .. } => AdapterErrorKind::Transport,
            AdapterError::Timeout { .. } => AdapterErrorKind::Timeout,
            AdapterError::Protocol { .. } => AdapterErrorKind::Protocol,
            AdapterError::Parse { .. } => AdapterErrorKind::Parse,
        }
    }

    /// The originating source tag.
    pub fn source_tag(&self) -> Source {
        match self {
            AdapterError::Transport { source_tag, .. }
            | AdapterError::Timeout { source_tag, .. }
            | AdapterError::Protocol { source_tag, .. }
            | AdapterError::Parse { source_tag, .. } => *source_tag,
        }
    }
}

// ---------------------------------------------------------------------------
// Cache errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum CacheError {
    #[error("cache I/O error: {source}")]
    #[diagnostic(
        code(glossarion::cache::io),
        help(
            "A filesystem operation on the response cache failed. Check that \
             the data directory exists, has correct permissions, and that the \
             disk is not full."
        )
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("cache corruption: {message}")]
    #[diagnostic(
        code(glossarion::cache::corruption),
        help(
            "A cache row could not be read back. The engine proceeds as if the \
             cache were absent; clear it with `glossarion cache clear`."
        )
    )]
    Corruption { message: String },

    #[error("cache serialization error: {message}")]
    #[diagnostic(
        code(glossarion::cache::serde),
        help(
            "Failed to serialize or deserialize a cached response. This usually \
             means the stored format has changed between versions; the row will \
             be invalidated on the next write."
        )
    )]
    Serialization { message: String },
}

// ---------------------------------------------------------------------------
// Fact index errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum FactError {
    #[error("fact index I/O error: {source}")]
    #[diagnostic(
        code(glossarion::fact::io),
        help("Check the data directory's permissions and free space.")
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("fact index corruption: {message}")]
    #[diagnostic(
        code(glossarion::fact::corruption),
        help(
            "A fact or provenance row could not be read back. The engine falls \
             back to live adapter fan-out; refresh the subject to rewrite it."
        )
    )]
    Corruption { message: String },

    #[error("fact serialization error: {message}")]
    #[diagnostic(
        code(glossarion::fact::serde),
        help("The stored fact format has changed between versions. Refresh the subject.")
    )]
    Serialization { message: String },
}

// ---------------------------------------------------------------------------
// CTS URN index errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum CtsError {
    #[error("CTS index I/O error: {source}")]
    #[diagnostic(
        code(glossarion::cts::io),
        help("Check the data directory's permissions and free space.")
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("CTS index build error: {message}")]
    #[diagnostic(
        code(glossarion::cts::build),
        help(
            "The corpus CSV could not be ingested. Check the file's column \
             layout: authors need (author_id, name, cts_namespace); works need \
             (author_id, title, abbreviations, cts_urn)."
        )
    )]
    Build { message: String },

    #[error("CTS index storage error: {message}")]
    #[diagnostic(
        code(glossarion::cts::storage),
        help("The embedded database reported a transaction error. Rebuild with `glossarion index build-cts`.")
    )]
    Storage { message: String },
}

// ---------------------------------------------------------------------------
// Query errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum QueryError {
    #[error("unsupported language: {language}")]
    #[diagnostic(
        code(glossarion::query::unsupported_language),
        help("Supported languages: lat (Latin), grc (Ancient Greek), san (Sanskrit).")
    )]
    UnsupportedLanguage { language: String },

    #[error("query normalization failed")]
    #[diagnostic(transparent)]
    Normalization(#[from] NormalizeError),

    #[error("internal invariant violated: {message}")]
    #[diagnostic(
        code(glossarion::query::internal_invariant),
        help(
            "This indicates a bug in glossarion, not in your query. The engine \
             already attempted a last-chance fallback; please file a report \
             with the query and this message."
        )
    )]
    InternalInvariant { message: String },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    #[diagnostic(
        code(glossarion::config::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {message}")]
    #[diagnostic(
        code(glossarion::config::parse),
        help("The file must be valid TOML. See the documented option list.")
    )]
    Parse { path: String, message: String },
}

/// Convenience alias for functions returning glossarion results.
pub type GlossarionResult<T> = std::result::Result<T, GlossarionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_error_converts_to_glossarion_error() {
        let err = EncodingError::Malformed {
            offset: 4,
            expected: "SLP1".into(),
        };
        let top: GlossarionError = err.into();
        assert!(matches!(
            top,
            GlossarionError::Encoding(EncodingError::Malformed { offset: 4, .. })
        ));
    }

    #[test]
    fn normalize_error_wraps_encoding_error() {
        let enc = EncodingError::Unknown {
            scheme: "runes".into(),
        };
        let norm: NormalizeError = enc.into();
        assert!(matches!(norm, NormalizeError::Encoding(_)));
    }

    #[test]
    fn adapter_error_reports_kind_and_source() {
        let err = AdapterError::Timeout {
            source_tag: Source::Whitakers,
            elapsed_ms: 5000,
        };
        assert_eq!(err.kind(), AdapterErrorKind::Timeout);
        assert_eq!(err.source_tag(), Source::Whitakers);
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = AdapterError::Timeout {
            source_tag: Source::DiogenesLatin,
            elapsed_ms: 5000,
        };
        let msg = format!("{err}");
        assert!(msg.contains("5000"));
        assert!(msg.contains("diogenes-latin"));
    }
}
