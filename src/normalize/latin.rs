//! Latin normalization: macron folding, lowercasing, orthographic variants.

use crate::error::NormalizeError;
use crate::normalize::CanonicalQuery;
use crate::translit::latin;

pub(super) fn normalize(query: &mut CanonicalQuery, raw: &str) -> Result<(), NormalizeError> {
    let folded = latin::fold_macrons(raw);
    if folded != raw {
        query.notes.push("macrons_folded".into());
    }
    if folded.is_empty() {
        return Err(NormalizeError::Empty);
    }
    query.canonical = folded;

    for variant in latin::orthographic_variants(&query.canonical) {
        query.push_alternate(variant);
    }
    if !query.alternates.is_empty() {
        query.notes.push("orthographic_variants_generated".into());
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
    fn plain_word_passes_through() {
        let q = n().normalize(Language::Latin, "lupus").unwrap();
        assert_eq!(q.canonical, "lupus");
        assert_eq!(q.detected_encoding, Encoding::AsciiRoman);
    }

    #[test]
    fn macrons_fold_and_lowercase() {
        let q = n().normalize(Language::Latin, "Lupā").unwrap();
        assert_eq!(q.canonical, "lupa");
        assert!(q.notes.iter().any(|s| s == "macrons_folded"));
    }

    #[test]
    fn variants_become_alternates() {
        let q = n().normalize(Language::Latin, "iuvenis").unwrap();
        assert!(q.alternates.contains(&"juvenis".to_string()));
    }
}
