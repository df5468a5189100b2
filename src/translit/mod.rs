//! Transliteration kernel: pure conversions among classical-text encodings.
//!
//! Three families of conversions, each side-effect-free and deterministic:
//!
//! - **Sanskrit** (`sanskrit`): Devanagari ↔ SLP1 ↔ {IAST, Velthuis, HK}.
//!   SLP1 is the pivot; any pair composes through it.
//! - **Greek** (`greek`): Betacode ↔ Unicode NFC, covering breathings,
//!   accents, iota subscript, diaeresis, and final-sigma handling.
//! - **Latin** (`latin`): macron/breve folding to ASCII and i/j, u/v
//!   orthographic variant generation.
//!
//! All functions are total over well-formed input and fail with
//! [`EncodingError::Malformed`](crate::error::EncodingError) otherwise.

pub mod greek;
pub mod latin;
pub mod sanskrit;

use serde::{Deserialize, Serialize};

use crate::error::EncodingError;

/// Result type for transliteration operations.
pub type TranslitResult<T> = std::result::Result<T, EncodingError>;

/// A textual encoding a query may arrive in.
///
/// Each language accepts a subset: Sanskrit takes the five Indic schemes plus
/// bare ASCII, Greek takes Unicode/Betacode/ASCII, Latin takes ASCII with
/// optional macrons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Devanagari script (U+0900–U+097F).
    Devanagari,
    /// International Alphabet of Sanskrit Transliteration (Unicode diacritics).
    Iast,
    /// Sanskrit Library Phonetic encoding, basic plan (pure ASCII, case-significant).
    Slp1,
    /// Velthuis ASCII scheme: doubled long vowels, uppercase retroflexes.
    Velthuis,
    /// Harvard-Kyoto ASCII scheme.
    Hk,
    /// Plain ASCII with no scheme-specific markers.
    AsciiRoman,
    /// Unicode Greek (polytonic or monotonic).
    Unicode,
    /// Betacode ASCII encoding of polytonic Greek.
    Betacode,
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Encoding::Devanagari => "devanagari",
            Encoding::Iast => "iast",
            Encoding::Slp1 => "slp1",
            Encoding::Velthuis => "velthuis",
            Encoding::Hk => "hk",
            Encoding::AsciiRoman => "ascii",
            Encoding::Unicode => "unicode",
            Encoding::Betacode => "betacode",
        };
        f.write_str(s)
    }
}

/// Scan `input` left to right, replacing the longest mapped prefix at each
/// position. `max_len` is the longest key length in chars. Unmapped characters
/// fail with `Malformed` naming the target scheme.
///
/// This is the shared workhorse for the ASCII scheme conversions; the
/// Devanagari and Betacode converters need stateful scans and roll their own.
pub(crate) fn map_longest(
    input: &str,
    table: &[(&str, &str)],
    max_len: usize,
    scheme: &str,
) -> TranslitResult<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        let mut matched = None;
        for len in (1..=max_len.min(chars.len() - i)).rev() {
            let slice: String = chars[i..i + len].iter().collect();
            if let Some((_, to)) = table.iter().find(|(from, _)| *from == slice) {
                matched = Some((*to, len));
                break;
            }
        }
        match matched {
            Some((to, len)) => {
                out.push_str(to);
                i += len;
            }
            None => {
                let offset: usize = chars[..i].iter().map(|c| c.len_utf8()).sum();
                return Err(EncodingError::Malformed {
                    offset,
                    expected: scheme.to_string(),
                });
            }
        }
    }
    Ok(out)
}
