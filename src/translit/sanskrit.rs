//! Sanskrit transliteration: Devanagari, SLP1, IAST, Velthuis, Harvard-Kyoto.
//!
//! SLP1 is the pivot encoding: every SLP1 grapheme is a single ASCII char,
//! which keeps the parsers and the cache key simple. Conversions between two
//! non-SLP1 schemes compose through SLP1.
//!
//! The ASCII schemes are handled by greedy longest-match table scans; the
//! Devanagari converter is stateful because the script is an abugida
//! (consonants carry an inherent `a` unless a vowel sign or virama follows).

use unicode_normalization::UnicodeNormalization;

use crate::error::EncodingError;
use crate::translit::{TranslitResult, map_longest};

/// SLP1 vowels, in traditional order.
const SLP1_VOWELS: &str = "aAiIuUfFxXeEoO";

/// SLP1 consonants (stops, nasals, semivowels, sibilants, h, retroflex l).
const SLP1_CONSONANTS: &str = "kKgGNcCjJYwWqQRtTdDnpPbBmyrlvSzshL";

/// Whether `c` is a valid SLP1 grapheme (vowel, consonant, anusvara, visarga).
pub fn is_slp1_char(c: char) -> bool {
    SLP1_VOWELS.contains(c) || SLP1_CONSONANTS.contains(c) || c == 'M' || c == 'H'
}

/// Whether `token` is a well-formed SLP1 token: non-empty, every char in the
/// SLP1 inventory.
pub fn is_slp1_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(is_slp1_char)
}

fn is_slp1_vowel(c: char) -> bool {
    SLP1_VOWELS.contains(c)
}

fn is_slp1_consonant(c: char) -> bool {
    SLP1_CONSONANTS.contains(c)
}

// ---------------------------------------------------------------------------
// IAST
// ---------------------------------------------------------------------------

/// SLP1 → IAST, one row per SLP1 grapheme.
const SLP1_TO_IAST: &[(&str, &str)] = &[
    ("a", "a"), ("A", "ā"), ("i", "i"), ("I", "ī"), ("u", "u"), ("U", "ū"),
    ("f", "ṛ"), ("F", "ṝ"), ("x", "ḷ"), ("X", "ḹ"),
    ("e", "e"), ("E", "ai"), ("o", "o"), ("O", "au"),
    ("M", "ṃ"), ("H", "ḥ"),
    ("k", "k"), ("K", "kh"), ("g", "g"), ("G", "gh"), ("N", "ṅ"),
    ("c", "c"), ("C", "ch"), ("j", "j"), ("J", "jh"), ("Y", "ñ"),
    ("w", "ṭ"), ("W", "ṭh"), ("q", "ḍ"), ("Q", "ḍh"), ("R", "ṇ"),
    ("t", "t"), ("T", "th"), ("d", "d"), ("D", "dh"), ("n", "n"),
    ("p", "p"), ("P", "ph"), ("b", "b"), ("B", "bh"), ("m", "m"),
    ("y", "y"), ("r", "r"), ("l", "l"), ("v", "v"),
    ("S", "ś"), ("z", "ṣ"), ("s", "s"), ("h", "h"), ("L", "ḻ"),
];

/// IAST → SLP1. Digraphs (aspirates, `ai`/`au`) before their single-char
/// prefixes; the scan is longest-match so order in the table is cosmetic.
const IAST_TO_SLP1: &[(&str, &str)] = &[
    ("kh", "K"), ("gh", "G"), ("ch", "C"), ("jh", "J"),
    ("ṭh", "W"), ("ḍh", "Q"), ("th", "T"), ("dh", "D"),
    ("ph", "P"), ("bh", "B"),
    ("ai", "E"), ("au", "O"),
    ("a", "a"), ("ā", "A"), ("i", "i"), ("ī", "I"), ("u", "u"), ("ū", "U"),
    ("ṛ", "f"), ("ṝ", "F"), ("ḷ", "x"), ("ḹ", "X"),
    ("e", "e"), ("o", "o"), ("ṃ", "M"), ("ḥ", "H"),
    ("k", "k"), ("g", "g"), ("ṅ", "N"), ("c", "c"), ("j", "j"), ("ñ", "Y"),
    ("ṭ", "w"), ("ḍ", "q"), ("ṇ", "R"), ("t", "t"), ("d", "d"), ("n", "n"),
    ("p", "p"), ("b", "b"), ("m", "m"),
    ("y", "y"), ("r", "r"), ("l", "l"), ("v", "v"),
    ("ś", "S"), ("ṣ", "z"), ("s", "s"), ("h", "h"), ("ḻ", "L"),
];

/// Convert an SLP1 token to IAST.
pub fn slp1_to_iast(input: &str) -> TranslitResult<String> {
    map_longest(input, SLP1_TO_IAST, 1, "SLP1")
}

/// Convert an IAST token to SLP1. Input is NFC-normalized first so that
/// decomposed diacritics (`a` + combining macron) match the table.
pub fn iast_to_slp1(input: &str) -> TranslitResult<String> {
    let nfc: String = input.nfc().collect();
    map_longest(&nfc, IAST_TO_SLP1, 2, "IAST")
}

// ---------------------------------------------------------------------------
// Velthuis
// ---------------------------------------------------------------------------

/// SLP1 → Velthuis, canonical form: doubled long vowels, uppercase
/// retroflexes (`T`, `D`, `N`, `S`), `R` for vocalic r.
const SLP1_TO_VELTHUIS: &[(&str, &str)] = &[
    ("a", "a"), ("A", "aa"), ("i", "i"), ("I", "ii"), ("u", "u"), ("U", "uu"),
    ("f", "R"), ("F", "RR"), ("x", ".l"), ("X", ".ll"),
    ("e", "e"), ("E", "ai"), ("o", "o"), ("O", "au"),
    ("M", ".m"), ("H", ".h"),
    ("k", "k"), ("K", "kh"), ("g", "g"), ("G", "gh"), ("N", "\"n"),
    ("c", "c"), ("C", "ch"), ("j", "j"), ("J", "jh"), ("Y", "~n"),
    ("w", "T"), ("W", "Th"), ("q", "D"), ("Q", "Dh"), ("R", "N"),
    ("t", "t"), ("T", "th"), ("d", "d"), ("D", "dh"), ("n", "n"),
    ("p", "p"), ("P", "ph"), ("b", "b"), ("B", "bh"), ("m", "m"),
    ("y", "y"), ("r", "r"), ("l", "l"), ("v", "v"),
    ("S", "\"s"), ("z", "S"), ("s", "s"), ("h", "h"), ("L", "L"),
];

/// Velthuis → SLP1. Accepts the dotted classical forms (`.t`, `.r`) alongside
/// the uppercase canonical ones.
const VELTHUIS_TO_SLP1: &[(&str, &str)] = &[
    (".ll", "X"), (".rr", "F"),
    ("aa", "A"), ("ii", "I"), ("uu", "U"), ("ai", "E"), ("au", "O"),
    ("RR", "F"), (".l", "x"), (".r", "f"), (".m", "M"), (".h", "H"),
    (".t", "w"), (".th", "W"), (".d", "q"), (".dh", "Q"), (".n", "R"), (".s", "z"),
    ("\"n", "N"), ("~n", "Y"), ("\"s", "S"),
    ("kh", "K"), ("gh", "G"), ("ch", "C"), ("jh", "J"),
    ("Th", "W"), ("Dh", "Q"), ("th", "T"), ("dh", "D"), ("ph", "P"), ("bh", "B"),
    ("R", "f"), ("T", "w"), ("D", "q"), ("N", "R"), ("S", "z"), ("L", "L"),
    ("a", "a"), ("i", "i"), ("u", "u"), ("e", "e"), ("o", "o"),
    ("k", "k"), ("g", "g"), ("c", "c"), ("j", "j"),
    ("t", "t"), ("d", "d"), ("n", "n"), ("p", "p"), ("b", "b"), ("m", "m"),
    ("y", "y"), ("r", "r"), ("l", "l"), ("v", "v"), ("s", "s"), ("h", "h"),
];

/// Convert an SLP1 token to canonical Velthuis.
pub fn slp1_to_velthuis(input: &str) -> TranslitResult<String> {
    map_longest(input, SLP1_TO_VELTHUIS, 1, "SLP1")
}

/// Convert a Velthuis token to SLP1.
pub fn velthuis_to_slp1(input: &str) -> TranslitResult<String> {
    map_longest(input, VELTHUIS_TO_SLP1, 3, "Velthuis")
}

// ---------------------------------------------------------------------------
// Harvard-Kyoto
// ---------------------------------------------------------------------------

const SLP1_TO_HK: &[(&str, &str)] = &[
    ("a", "a"), ("A", "A"), ("i", "i"), ("I", "I"), ("u", "u"), ("U", "U"),
    ("f", "R"), ("F", "RR"), ("x", "lR"), ("X", "lRR"),
    ("e", "e"), ("E", "ai"), ("o", "o"), ("O", "au"),
    ("M", "M"), ("H", "H"),
    ("k", "k"), ("K", "kh"), ("g", "g"), ("G", "gh"), ("N", "G"),
    ("c", "c"), ("C", "ch"), ("j", "j"), ("J", "jh"), ("Y", "J"),
    ("w", "T"), ("W", "Th"), ("q", "D"), ("Q", "Dh"), ("R", "N"),
    ("t", "t"), ("T", "th"), ("d", "d"), ("D", "dh"), ("n", "n"),
    ("p", "p"), ("P", "ph"), ("b", "b"), ("B", "bh"), ("m", "m"),
    ("y", "y"), ("r", "r"), ("l", "l"), ("v", "v"),
    ("S", "z"), ("z", "S"), ("s", "s"), ("h", "h"), ("L", "L"),
];

const HK_TO_SLP1: &[(&str, &str)] = &[
    ("lRR", "X"), ("lR", "x"), ("RR", "F"),
    ("ai", "E"), ("au", "O"),
    ("kh", "K"), ("gh", "G"), ("ch", "C"), ("jh", "J"),
    ("Th", "W"), ("Dh", "Q"), ("th", "T"), ("dh", "D"), ("ph", "P"), ("bh", "B"),
    ("a", "a"), ("A", "A"), ("i", "i"), ("I", "I"), ("u", "u"), ("U", "U"),
    ("R", "f"), ("e", "e"), ("o", "o"), ("M", "M"), ("H", "H"),
    ("k", "k"), ("g", "g"), ("G", "N"), ("c", "c"), ("j", "j"), ("J", "Y"),
    ("T", "w"), ("D", "q"), ("N", "R"), ("t", "t"), ("d", "d"), ("n", "n"),
    ("p", "p"), ("b", "b"), ("m", "m"),
    ("y", "y"), ("r", "r"), ("l", "l"), ("v", "v"),
    ("z", "S"), ("S", "z"), ("s", "s"), ("h", "h"), ("L", "L"),
];

/// Convert an SLP1 token to Harvard-Kyoto.
pub fn slp1_to_hk(input: &str) -> TranslitResult<String> {
    map_longest(input, SLP1_TO_HK, 1, "SLP1")
}

/// Convert a Harvard-Kyoto token to SLP1.
pub fn hk_to_slp1(input: &str) -> TranslitResult<String> {
    map_longest(input, HK_TO_SLP1, 3, "HK")
}

// ---------------------------------------------------------------------------
// Devanagari
// ---------------------------------------------------------------------------

const VIRAMA: char = '\u{094D}';
const ANUSVARA: char = '\u{0902}';
const VISARGA: char = '\u{0903}';

fn independent_vowel(c: char) -> Option<char> {
    Some(match c {
        '\u{0905}' => 'a', '\u{0906}' => 'A', '\u{0907}' => 'i', '\u{0908}' => 'I',
        '\u{0909}' => 'u', '\u{090A}' => 'U', '\u{090B}' => 'f', '\u{0960}' => 'F',
        '\u{090C}' => 'x', '\u{0961}' => 'X',
        '\u{090F}' => 'e', '\u{0910}' => 'E', '\u{0913}' => 'o', '\u{0914}' => 'O',
        _ => return None,
    })
}

fn vowel_sign(c: char) -> Option<char> {
    Some(match c {
        '\u{093E}' => 'A', '\u{093F}' => 'i', '\u{0940}' => 'I',
        '\u{0941}' => 'u', '\u{0942}' => 'U', '\u{0943}' => 'f', '\u{0944}' => 'F',
        '\u{0962}' => 'x', '\u{0963}' => 'X',
        '\u{0947}' => 'e', '\u{0948}' => 'E', '\u{094B}' => 'o', '\u{094C}' => 'O',
        _ => return None,
    })
}

fn consonant(c: char) -> Option<char> {
    Some(match c {
        '\u{0915}' => 'k', '\u{0916}' => 'K', '\u{0917}' => 'g', '\u{0918}' => 'G',
        '\u{0919}' => 'N',
        '\u{091A}' => 'c', '\u{091B}' => 'C', '\u{091C}' => 'j', '\u{091D}' => 'J',
        '\u{091E}' => 'Y',
        '\u{091F}' => 'w', '\u{0920}' => 'W', '\u{0921}' => 'q', '\u{0922}' => 'Q',
        '\u{0923}' => 'R',
        '\u{0924}' => 't', '\u{0925}' => 'T', '\u{0926}' => 'd', '\u{0927}' => 'D',
        '\u{0928}' => 'n',
        '\u{092A}' => 'p', '\u{092B}' => 'P', '\u{092C}' => 'b', '\u{092D}' => 'B',
        '\u{092E}' => 'm',
        '\u{092F}' => 'y', '\u{0930}' => 'r', '\u{0932}' => 'l', '\u{0935}' => 'v',
        '\u{0936}' => 'S', '\u{0937}' => 'z', '\u{0938}' => 's', '\u{0939}' => 'h',
        '\u{0933}' => 'L',
        _ => return None,
    })
}

fn devanagari_consonant(slp1: char) -> Option<char> {
    Some(match slp1 {
        'k' => '\u{0915}', 'K' => '\u{0916}', 'g' => '\u{0917}', 'G' => '\u{0918}',
        'N' => '\u{0919}',
        'c' => '\u{091A}', 'C' => '\u{091B}', 'j' => '\u{091C}', 'J' => '\u{091D}',
        'Y' => '\u{091E}',
        'w' => '\u{091F}', 'W' => '\u{0920}', 'q' => '\u{0921}', 'Q' => '\u{0922}',
        'R' => '\u{0923}',
        't' => '\u{0924}', 'T' => '\u{0925}', 'd' => '\u{0926}', 'D' => '\u{0927}',
        'n' => '\u{0928}',
        'p' => '\u{092A}', 'P' => '\u{092B}', 'b' => '\u{092C}', 'B' => '\u{092D}',
        'm' => '\u{092E}',
        'y' => '\u{092F}', 'r' => '\u{0930}', 'l' => '\u{0932}', 'v' => '\u{0935}',
        'S' => '\u{0936}', 'z' => '\u{0937}', 's' => '\u{0938}', 'h' => '\u{0939}',
        'L' => '\u{0933}',
        _ => return None,
    })
}

fn devanagari_independent(slp1: char) -> Option<char> {
    Some(match slp1 {
        'a' => '\u{0905}', 'A' => '\u{0906}', 'i' => '\u{0907}', 'I' => '\u{0908}',
        'u' => '\u{0909}', 'U' => '\u{090A}', 'f' => '\u{090B}', 'F' => '\u{0960}',
        'x' => '\u{090C}', 'X' => '\u{0961}',
        'e' => '\u{090F}', 'E' => '\u{0910}', 'o' => '\u{0913}', 'O' => '\u{0914}',
        _ => return None,
    })
}

fn devanagari_sign(slp1: char) -> Option<char> {
    Some(match slp1 {
        'A' => '\u{093E}', 'i' => '\u{093F}', 'I' => '\u{0940}',
        'u' => '\u{0941}', 'U' => '\u{0942}', 'f' => '\u{0943}', 'F' => '\u{0944}',
        'x' => '\u{0962}', 'X' => '\u{0963}',
        'e' => '\u{0947}', 'E' => '\u{0948}', 'o' => '\u{094B}', 'O' => '\u{094C}',
        _ => return None,
    })
}

/// Convert an SLP1 token to Devanagari.
///
/// A consonant with no following vowel takes a virama; a consonant followed
/// by `a` takes neither (the inherent vowel); any other vowel after a
/// consonant becomes a vowel sign.
pub fn slp1_to_devanagari(input: &str) -> TranslitResult<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::new();
    let mut pending_consonant = false;
    for (idx, &c) in chars.iter().enumerate() {
        if let Some(dev) = devanagari_consonant(c) {
            if pending_consonant {
                out.push(VIRAMA);
            }
            out.push(dev);
            pending_consonant = true;
        } else if is_slp1_vowel(c) {
            if pending_consonant {
                if c != 'a' {
                    // `a` is inherent; anything else needs its sign.
                    out.push(devanagari_sign(c).ok_or(EncodingError::Malformed {
                        offset: idx,
                        expected: "SLP1".into(),
                    })?);
                }
                pending_consonant = false;
            } else {
                out.push(devanagari_independent(c).ok_or(EncodingError::Malformed {
                    offset: idx,
                    expected: "SLP1".into(),
                })?);
            }
        } else if c == 'M' || c == 'H' {
            if pending_consonant {
                out.push(VIRAMA);
                pending_consonant = false;
            }
            out.push(if c == 'M' { ANUSVARA } else { VISARGA });
        } else {
            return Err(EncodingError::Malformed {
                offset: idx,
                expected: "SLP1".into(),
            });
        }
    }
    if pending_consonant {
        out.push(VIRAMA);
    }
    Ok(out)
}

/// Convert a Devanagari token to SLP1.
pub fn devanagari_to_slp1(input: &str) -> TranslitResult<String> {
    let nfc: String = input.nfc().collect();
    let chars: Vec<char> = nfc.chars().collect();
    let mut out = String::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if let Some(v) = independent_vowel(c) {
            out.push(v);
            i += 1;
        } else if let Some(k) = consonant(c) {
            out.push(k);
            i += 1;
            match chars.get(i) {
                Some(&next) if next == VIRAMA => {
                    i += 1;
                }
                Some(&next) if vowel_sign(next).is_some() => {
                    out.push(vowel_sign(next).unwrap());
                    i += 1;
                }
                _ => out.push('a'),
            }
        } else if c == ANUSVARA {
            out.push('M');
            i += 1;
        } else if c == VISARGA {
            out.push('H');
            i += 1;
        } else {
            let offset: usize = chars[..i].iter().map(|ch| ch.len_utf8()).sum();
            return Err(EncodingError::Malformed {
                offset,
                expected: "Devanagari".into(),
            });
        }
    }
    Ok(out)
}
