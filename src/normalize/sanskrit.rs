//! Sanskrit normalization: any supported encoding → canonical SLP1.

use unicode_normalization::UnicodeNormalization;

use crate::detect::Detection;
use crate::error::NormalizeError;
use crate::normalize::{CanonicalQuery, probe::CanonicalProbe};
use crate::translit::{Encoding, sanskrit as skt};

/// Penalty applied when the canonical-lookup probe was attempted and failed.
const PROBE_FAILURE_PENALTY: f32 = 0.3;

/// Tokens at or under this length that already read as SLP1 skip the probe.
const FAST_PATH_LEN: usize = 5;

pub(super) fn normalize(
    query: &mut CanonicalQuery,
    raw: &str,
    detection: Detection,
    probe: Option<&CanonicalProbe>,
) -> Result<(), NormalizeError> {
    let nfc: String = raw.nfc().collect();
    if nfc != raw {
        query.notes.push("unicode_nfc".into());
    }

    let canonical = match detection.encoding {
        Encoding::Devanagari => {
            let slp1 = skt::devanagari_to_slp1(&nfc)?;
            query.notes.push("devanagari_to_slp1".into());
            slp1
        }
        Encoding::Iast => {
            let slp1 = skt::iast_to_slp1(&nfc)?;
            query.notes.push("iast_to_slp1".into());
            slp1
        }
        Encoding::Velthuis => {
            let mut vel = nfc.clone();
            if let Some(stripped) = vel.strip_prefix('.') {
                // A bare leading dot is a wire-format stray, not a retroflex
                // marker; `.t`-style digraphs never start a headword.
                if !stripped.starts_with(|c: char| "tdnsmhrl".contains(c)) {
                    vel = stripped.to_string();
                    query.notes.push("velthuis_stripped_leading_dot".into());
                }
            }
            vel = undouble_final_vowel(&vel, query);
            let slp1 = skt::velthuis_to_slp1(&vel)?;
            query.notes.push("velthuis_to_slp1".into());
            slp1
        }
        Encoding::Hk => {
            let slp1 = skt::hk_to_slp1(&nfc)?;
            query.notes.push("hk_to_slp1".into());
            slp1
        }
        Encoding::Slp1 => {
            if !skt::is_slp1_token(&nfc) {
                return Err(crate::error::EncodingError::Malformed {
                    offset: 0,
                    expected: "SLP1".into(),
                }
                .into());
            }
            nfc.clone()
        }
        // Bare ASCII reads directly as SLP1 (all lowercase ASCII letters are
        // valid SLP1 graphemes); the probe may replace it with the proper form.
        _ => {
            let lowered = nfc.to_lowercase();
            if !skt::is_slp1_token(&lowered) {
                return Err(crate::error::EncodingError::Malformed {
                    offset: 0,
                    expected: "SLP1".into(),
                }
                .into());
            }
            query.notes.push("ascii_as_slp1".into());
            lowered
        }
    };

    query.canonical = canonical;

    if detection.encoding == Encoding::AsciiRoman {
        maybe_probe(query, probe);
    }

    generate_alternates(query);

    // Scenario: a Velthuis input keeps its original spelling as an alternate
    // so backends that speak Velthuis can echo the user's form.
    if detection.encoding == Encoding::Velthuis {
        query.push_alternate(raw.to_string());
    }

    Ok(())
}

/// Heritage's wire convention doubles a *final* long vowel; on input the
/// doubling is undone so `.agnii` and `agni` normalize identically. Interior
/// doubled vowels still read as long vowels.
fn undouble_final_vowel(vel: &str, query: &mut CanonicalQuery) -> String {
    for pair in ["aa", "ii", "uu"] {
        if let Some(stem) = vel.strip_suffix(pair) {
            if !stem.is_empty() {
                query
                    .notes
                    .push("velthuis_final_doubled_vowel_undoubled".into());
                let mut out = stem.to_string();
                out.push(pair.chars().next().unwrap());
                return out;
            }
        }
    }
    vel.to_string()
}

fn is_probe_eligible(token: &str) -> bool {
    let len = token.chars().count();
    (2..=24).contains(&len)
        && token.chars().all(|c| c.is_ascii_lowercase())
        && token.chars().any(|c| "aeiou".contains(c))
}

fn maybe_probe(query: &mut CanonicalQuery, probe: Option<&CanonicalProbe>) {
    let token = query.canonical.clone();
    if !is_probe_eligible(&token) {
        return;
    }
    // Fast path: a short token that already reads as clean SLP1 is looked up
    // as-is; the probe would only confirm it.
    if token.chars().count() <= FAST_PATH_LEN && skt::is_slp1_token(&token) {
        query.notes.push("probe_fast_path".into());
        return;
    }
    let Some(probe) = probe else {
        return;
    };
    match probe.lookup(&token) {
        Ok(Some(slp1)) => {
            tracing::debug!(from = %token, to = %slp1, "canonical probe enriched query");
            query.canonical = slp1;
            query.notes.push("enriched_via_external_probe".into());
        }
        Ok(None) => {
            query.notes.push("probe_no_match".into());
            query.confidence = (query.confidence - PROBE_FAILURE_PENALTY).max(0.0);
        }
        Err(err) => {
            tracing::warn!(error = %err, "canonical probe failed");
            query.notes.push(format!("probe_failed: {err}"));
            query.confidence = (query.confidence - PROBE_FAILURE_PENALTY).max(0.0);
        }
    }
}

fn generate_alternates(query: &mut CanonicalQuery) {
    let canonical = query.canonical.clone();
    let conversions: [(&str, fn(&str) -> crate::translit::TranslitResult<String>); 4] = [
        ("devanagari", skt::slp1_to_devanagari),
        ("iast", skt::slp1_to_iast),
        ("velthuis", skt::slp1_to_velthuis),
        ("hk", skt::slp1_to_hk),
    ];
    for (name, convert) in conversions {
        match convert(&canonical) {
            Ok(alt) => query.push_alternate(alt),
            Err(err) => {
                tracing::debug!(scheme = name, error = %err, "alternate generation skipped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::language::Language;
    use crate::normalize::Normalizer;
    use crate::translit::Encoding;

    fn n() -> Normalizer {
        Normalizer::new(true, None)
    }

    #[test]
    fn ascii_agni_takes_fast_path() {
        let q = n().normalize(Language::Sanskrit, "agni").unwrap();
        assert_eq!(q.canonical, "agni");
        assert_eq!(q.detected_encoding, Encoding::AsciiRoman);
        assert!(q.confidence >= 0.5);
        assert!(q.notes.iter().any(|s| s == "probe_fast_path"));
    }

    #[test]
    fn velthuis_wire_form_normalizes_to_lemma() {
        let q = n().normalize(Language::Sanskrit, ".agnii").unwrap();
        assert_eq!(q.detected_encoding, Encoding::Velthuis);
        assert_eq!(q.canonical, "agni");
        assert!(q.alternates.contains(&".agnii".to_string()));
        assert!(
            q.notes
                .iter()
                .any(|s| s == "velthuis_final_doubled_vowel_undoubled")
        );
    }

    #[test]
    fn interior_doubled_vowels_stay_long() {
        let q = n().normalize(Language::Sanskrit, "siitaa").unwrap();
        // Interior `ii` is long; only the final pair is un-doubled.
        assert_eq!(q.canonical, "sIta");
    }

    #[test]
    fn iast_converts_to_slp1() {
        let q = n().normalize(Language::Sanskrit, "kṛṣṇa").unwrap();
        assert_eq!(q.canonical, "kfzRa");
        assert_eq!(q.detected_encoding, Encoding::Iast);
    }

    #[test]
    fn devanagari_converts_and_generates_alternates() {
        let q = n().normalize(Language::Sanskrit, "अग्नि").unwrap();
        assert_eq!(q.canonical, "agni");
        assert!(q.alternates.iter().any(|a| a == "अग्नि"));
        // Schemes whose rendering coincides with the canonical are deduped.
        assert!(!q.alternates.contains(&"agni".to_string()));
    }

    #[test]
    fn sanskrit_canonical_is_well_formed_slp1() {
        for raw in ["agni", "kṛṣṇa", ".agnii", "jJAna", "अग्नि"] {
            let q = n().normalize(Language::Sanskrit, raw).unwrap();
            assert!(
                crate::translit::sanskrit::is_slp1_token(&q.canonical),
                "{raw} → {}",
                q.canonical
            );
        }
    }
}
