//! Latin orthography helpers: macron folding and i/j, u/v variants.
//!
//! Dictionary headwords mark vowel length with macrons (`lupā`) and
//! occasionally breves; queries arrive in plain ASCII. Folding decomposes the
//! input, drops the length marks, and lowercases, preserving one output char
//! per input grapheme. The i/j and u/v variants cover the orthographic split
//! between upstream lexica (Lewis & Short files `iuvenis`, Whitaker's accepts
//! `juvenis`).

use unicode_normalization::UnicodeNormalization;

const MACRON: char = '\u{0304}';
const BREVE: char = '\u{0306}';

/// Fold macrons and breves to bare ASCII and lowercase the result.
///
/// One output char per input grapheme: `lupā` (4 graphemes however encoded)
/// folds to `lupa`.
pub fn fold_macrons(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.nfd() {
        if c == MACRON || c == BREVE {
            continue;
        }
        if unicode_normalization::char::is_combining_mark(c) {
            continue;
        }
        for low in c.to_lowercase() {
            out.push(low);
        }
    }
    out
}

/// Generate i/j and u/v orthographic variants of `word`.
///
/// Each variant replaces only the first occurrence of the letter in question,
/// which keeps the set small and closed; upstream lexica differ on the first
/// letter far more often than on later ones. The original word and duplicates
/// are excluded.
pub fn orthographic_variants(word: &str) -> Vec<String> {
    let mut variants = Vec::new();
    for (from, to) in [('i', 'j'), ('j', 'i'), ('u', 'v'), ('v', 'u')] {
        if let Some(pos) = word.find(from) {
            let mut variant = String::with_capacity(word.len());
            variant.push_str(&word[..pos]);
            variant.push(to);
            variant.push_str(&word[pos + from.len_utf8()..]);
            if variant != word && !variants.contains(&variant) {
                variants.push(variant);
            }
        }
    }
    variants
}
