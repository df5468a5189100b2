//! Greek normalization: Betacode or Unicode → canonical NFC Unicode.

use unicode_normalization::UnicodeNormalization;

use crate::detect::Detection;
use crate::error::NormalizeError;
use crate::normalize::CanonicalQuery;
use crate::translit::{Encoding, greek};

pub(super) fn normalize(
    query: &mut CanonicalQuery,
    raw: &str,
    detection: Detection,
) -> Result<(), NormalizeError> {
    let canonical = match detection.encoding {
        Encoding::Betacode => {
            let uni = greek::betacode_to_unicode(raw)?;
            query.notes.push("betacode_to_unicode".into());
            uni
        }
        Encoding::Unicode => {
            let nfc: String = raw.nfc().collect();
            if nfc != raw {
                query.notes.push("unicode_nfc".into());
            }
            nfc
        }
        // Plain ASCII Greek is unmarked Betacode (`logos` for λόγος).
        _ => {
            let uni = greek::betacode_to_unicode(&raw.to_lowercase())?;
            query.notes.push("ascii_as_betacode".into());
            uni
        }
    };

    let corrected = greek::normalize_final_sigma(&canonical);
    if corrected != canonical {
        query.notes.push("final_sigma_corrected".into());
    }
    query.canonical = corrected;

    match greek::unicode_to_betacode(&query.canonical) {
        Ok(beta) => query.push_alternate(beta),
        Err(err) => {
            tracing::debug!(error = %err, "betacode alternate generation skipped");
        }
    }

    Ok(())
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
    fn unicode_logos_is_canonical_with_betacode_alternate() {
        let q = n().normalize(Language::Greek, "λόγος").unwrap();
        assert_eq!(q.canonical, "λόγος");
        assert_eq!(q.detected_encoding, Encoding::Unicode);
        assert!(q.alternates.contains(&"lo/gos".to_string()));
    }

    #[test]
    fn betacode_input_converts() {
        let q = n().normalize(Language::Greek, "lo/gos").unwrap();
        assert_eq!(q.canonical, "λόγος");
        assert_eq!(q.detected_encoding, Encoding::Betacode);
    }

    #[test]
    fn plain_ascii_reads_as_unmarked_betacode() {
        let q = n().normalize(Language::Greek, "logos").unwrap();
        assert_eq!(q.canonical, "λογος");
        assert!(q.notes.iter().any(|s| s == "ascii_as_betacode"));
    }

    #[test]
    fn medial_final_sigma_is_corrected() {
        let q = n().normalize(Language::Greek, "σοφοσ").unwrap();
        assert!(q.canonical.ends_with('ς'));
        assert!(q.notes.iter().any(|s| s == "final_sigma_corrected"));
    }
}
