//! Query normalization: produce a [`CanonicalQuery`] per language.
//!
//! Every request passes through here before routing. The normalizer detects
//! the input encoding, converts to the per-language canonical form (SLP1 for
//! Sanskrit, NFC Unicode for Greek, folded ASCII for Latin), generates the
//! alternate encodings the backends need, and logs each transformation into
//! the query's `notes` so a response can explain what happened to the input.
//!
//! Sanskrit inputs detected as bare ASCII may additionally be enriched via an
//! external canonical-lookup probe (`probe`); the probe is best-effort and
//! its failure only lowers confidence.

pub mod greek;
pub mod latin;
pub mod probe;
pub mod sanskrit;

use serde::{Deserialize, Serialize};

use crate::detect;
use crate::error::NormalizeError;
use crate::language::Language;
use crate::translit::Encoding;

pub use probe::CanonicalProbe;

/// The normalized, language-tagged form of a user input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalQuery {
    /// The input exactly as received.
    pub original: String,
    /// The language the query was routed under.
    pub language: Language,
    /// Canonical form: SLP1 (Sanskrit), NFC Unicode (Greek), folded
    /// lowercase ASCII (Latin).
    pub canonical: String,
    /// Alternate encodings backends may need, in generation order. Never
    /// contains duplicates or the canonical form itself.
    pub alternates: Vec<String>,
    /// What the syntactic detector decided.
    pub detected_encoding: Encoding,
    /// Detection confidence, reduced when best-effort enrichment fails.
    pub confidence: f32,
    /// Ordered log of transformations applied.
    pub notes: Vec<String>,
}

impl CanonicalQuery {
    /// Append an alternate, keeping the ordered-set invariants.
    pub(crate) fn push_alternate(&mut self, alt: String) {
        if alt != self.canonical && !alt.is_empty() && !self.alternates.contains(&alt) {
            self.alternates.push(alt);
        }
    }
}

/// Normalizer over all three languages, wired with configuration and the
/// optional Sanskrit canonical-lookup probe.
pub struct Normalizer {
    enabled: bool,
    probe: Option<CanonicalProbe>,
}

impl Normalizer {
    pub fn new(enabled: bool, probe: Option<CanonicalProbe>) -> Self {
        Self { enabled, probe }
    }

    /// Normalize `raw` for `language`.
    ///
    /// Fails only on empty input; every other difficulty degrades into a
    /// lower-confidence result with an explanatory note.
    pub fn normalize(
        &self,
        language: Language,
        raw: &str,
    ) -> Result<CanonicalQuery, NormalizeError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NormalizeError::Empty);
        }

        let detection = detect::detect(trimmed);
        tracing::debug!(
            language = %language,
            encoding = %detection.encoding,
            confidence = detection.confidence,
            "detected query encoding"
        );

        if !self.enabled {
            return Ok(CanonicalQuery {
                original: raw.to_string(),
                language,
                canonical: trimmed.to_lowercase(),
                alternates: Vec::new(),
                detected_encoding: detection.encoding,
                confidence: detection.confidence,
                notes: vec!["normalization_disabled".into()],
            });
        }

        let mut query = CanonicalQuery {
            original: raw.to_string(),
            language,
            canonical: String::new(),
            alternates: Vec::new(),
            detected_encoding: detection.encoding,
            confidence: detection.confidence,
            notes: Vec::new(),
        };

        match language {
            Language::Sanskrit => {
                sanskrit::normalize(&mut query, trimmed, detection, self.probe.as_ref())?
            }
            Language::Greek => greek::normalize(&mut query, trimmed, detection)?,
            Language::Latin => latin::normalize(&mut query, trimmed)?,
        }

        debug_assert!(!query.canonical.is_empty());
        Ok(query)
    }

    /// Direct canonical-probe lookup, bypassing the fast path. The engine's
    /// single-retry fallback uses this after an empty fan-out.
    pub fn probe_recover(&self, token: &str) -> Option<String> {
        let probe = self.probe.as_ref()?;
        match probe.lookup(token) {
            Ok(found) => found,
            Err(err) => {
                tracing::debug!(error = %err, "probe recovery failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> Normalizer {
        Normalizer::new(true, None)
    }

    #[test]
    fn empty_input_fails() {
        let err = normalizer().normalize(Language::Latin, "   ").unwrap_err();
        assert!(matches!(err, NormalizeError::Empty));
    }

    #[test]
    fn disabled_normalization_lowercases_only() {
        let n = Normalizer::new(false, None);
        let q = n.normalize(Language::Latin, "Lupus").unwrap();
        assert_eq!(q.canonical, "lupus");
        assert!(q.alternates.is_empty());
        assert_eq!(q.notes, vec!["normalization_disabled".to_string()]);
    }

    #[test]
    fn normalization_is_idempotent_on_canonical() {
        let n = normalizer();
        for (lang, raw) in [
            (Language::Latin, "lupā"),
            (Language::Greek, "λόγος"),
            (Language::Sanskrit, "kṛṣṇa"),
            (Language::Sanskrit, "agni"),
        ] {
            let first = n.normalize(lang, raw).unwrap();
            let second = n.normalize(lang, &first.canonical).unwrap();
            assert_eq!(second.canonical, first.canonical, "{raw}");
        }
    }

    #[test]
    fn alternates_exclude_canonical_and_duplicates() {
        let q = normalizer().normalize(Language::Sanskrit, "agni").unwrap();
        assert!(!q.alternates.contains(&q.canonical));
        let mut deduped = q.alternates.clone();
        deduped.dedup();
        assert_eq!(deduped.len(), q.alternates.len());
    }
}
