//! Encoding detection: classify a raw query string into one of the supported
//! encodings using priority-ordered syntactic tests.
//!
//! The priority matters because SLP1 and Velthuis share the ASCII alphabet:
//! `kRSNa` is valid-looking in both. Script tests (Devanagari, IAST
//! diacritics, Greek codepoints) run first because they are unambiguous; the
//! ASCII schemes are ranked by how distinctive their markers are. The
//! detector never consults a dictionary.

use crate::translit::Encoding;

/// A detection verdict: the winning encoding and how sure the rules are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub encoding: Encoding,
    pub confidence: f32,
}

/// SLP1 consonants and markers that no other ASCII scheme uses the same way.
const SLP1_SPECIFIC: &str = "KGCJTDNPBSzfxMH";

/// SLP1 codepoints that Harvard-Kyoto never produces.
const SLP1_ONLY: &str = "KCPBYwWqQzfx";

/// Velthuis/HK uppercase retroflexes.
const RETROFLEX_CAPS: &str = "RTDNS";

/// HK-specific capitals.
const HK_CAPS: &str = "GJTDNS";

fn has_devanagari(s: &str) -> bool {
    s.chars().any(|c| ('\u{0900}'..='\u{097F}').contains(&c))
}

fn has_iast_diacritic(s: &str) -> bool {
    s.chars().any(|c| {
        matches!(
            c,
            'ā' | 'ī' | 'ū' | 'ṛ' | 'ṝ' | 'ḷ' | 'ḹ' | 'ṃ' | 'ḥ' | 'ṅ' | 'ñ' | 'ṭ'
                | 'ḍ' | 'ṇ' | 'ś' | 'ṣ' | 'ḻ'
        ) || matches!(c, '\u{0304}' | '\u{0323}' | '\u{0325}' | '\u{0303}')
    })
}

fn has_greek(s: &str) -> bool {
    s.chars().any(|c| {
        ('\u{0370}'..='\u{03FF}').contains(&c) || ('\u{1F00}'..='\u{1FFF}').contains(&c)
    })
}

fn has_doubled_long_vowel(s: &str) -> bool {
    s.contains("aa") || s.contains("ii") || s.contains("uu")
}

fn looks_like_betacode(s: &str) -> bool {
    let ascii_letters = s.chars().any(|c| c.is_ascii_alphabetic());
    let accent_markers = s.contains('/') || s.contains('\\') || s.contains('=') || s.contains('|');
    ascii_letters && (s.starts_with('*') || accent_markers)
}

/// Classify `raw` into an [`Encoding`]. First matching rule wins.
pub fn detect(raw: &str) -> Detection {
    if has_devanagari(raw) {
        return Detection {
            encoding: Encoding::Devanagari,
            confidence: 1.0,
        };
    }
    if has_iast_diacritic(raw) {
        return Detection {
            encoding: Encoding::Iast,
            confidence: 1.0,
        };
    }

    let slp1_specific_count = raw.chars().filter(|c| SLP1_SPECIFIC.contains(*c)).count();
    if slp1_specific_count >= 2 && !raw.contains("sh") && !has_doubled_long_vowel(raw) {
        return Detection {
            encoding: Encoding::Slp1,
            confidence: 0.8,
        };
    }

    if raw.chars().any(|c| RETROFLEX_CAPS.contains(c)) || has_doubled_long_vowel(raw) {
        return Detection {
            encoding: Encoding::Velthuis,
            confidence: 0.8,
        };
    }

    let has_hk_caps = raw.chars().any(|c| HK_CAPS.contains(c));
    let has_slp1_only = raw.chars().any(|c| SLP1_ONLY.contains(c));
    if has_hk_caps && !has_slp1_only {
        return Detection {
            encoding: Encoding::Hk,
            confidence: 0.6,
        };
    }

    if has_greek(raw) {
        return Detection {
            encoding: Encoding::Unicode,
            confidence: 1.0,
        };
    }
    if looks_like_betacode(raw) {
        return Detection {
            encoding: Encoding::Betacode,
            confidence: 1.0,
        };
    }

    Detection {
        encoding: Encoding::AsciiRoman,
        confidence: 0.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(raw: &str) -> Encoding {
        detect(raw).encoding
    }

    #[test]
    fn devanagari_wins_over_everything() {
        assert_eq!(enc("अग्नि"), Encoding::Devanagari);
        assert_eq!(enc("agni अ"), Encoding::Devanagari);
        assert_eq!(detect("अग्नि").confidence, 1.0);
    }

    #[test]
    fn iast_diacritics() {
        assert_eq!(enc("kṛṣṇa"), Encoding::Iast);
        assert_eq!(enc("āgama"), Encoding::Iast);
        assert_eq!(detect("kṛṣṇa").confidence, 1.0);
    }

    #[test]
    fn slp1_needs_two_specific_consonants() {
        assert_eq!(enc("kfzRa"), Encoding::Slp1);
        // A single capital D is not enough for rule 3; rule 4 claims it.
        assert_eq!(enc("Darma"), Encoding::Velthuis);
        assert_eq!(detect("kfzRa").confidence, 0.8);
    }

    #[test]
    fn doubled_vowels_forbid_slp1() {
        // `ii` is a Velthuis long vowel, never SLP1.
        assert_eq!(enc("agnii"), Encoding::Velthuis);
        assert_eq!(enc("shaastra"), Encoding::Velthuis);
    }

    #[test]
    fn velthuis_retroflex_caps() {
        assert_eq!(enc(".agnii"), Encoding::Velthuis);
        assert_eq!(enc("kRSNa"), Encoding::Slp1); // S and N are SLP1-specific too, rule 3 first
    }

    #[test]
    fn hk_capitals_without_slp1_markers() {
        assert_eq!(enc("jJAna"), Encoding::Hk);
        assert_eq!(enc("saGgha"), Encoding::Hk);
        assert_eq!(detect("jJAna").confidence, 0.6);
    }

    #[test]
    fn greek_unicode_and_betacode() {
        assert_eq!(enc("λόγος"), Encoding::Unicode);
        assert_eq!(enc("lo/gos"), Encoding::Betacode);
        assert_eq!(enc("*)aqh=nai"), Encoding::Betacode);
    }

    #[test]
    fn plain_ascii_falls_through() {
        assert_eq!(enc("lupus"), Encoding::AsciiRoman);
        assert_eq!(enc("agni"), Encoding::AsciiRoman);
        assert_eq!(detect("lupus").confidence, 0.5);
    }
}
