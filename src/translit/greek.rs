//! Greek transliteration: Betacode ↔ Unicode.
//!
//! Betacode encodes polytonic Greek in ASCII: letters map one-to-one,
//! `*` marks uppercase, and `) ( / \ = | +` carry breathing, accent, iota
//! subscript, and diaeresis. Conversion to Unicode goes through combining
//! marks and NFC composition, so precomposed polytonic codepoints come out
//! wherever Unicode defines them. The reverse direction decomposes with NFD
//! and serializes diacritics in the order breathing, accent, iota subscript.

use unicode_normalization::UnicodeNormalization;

use crate::error::EncodingError;
use crate::translit::TranslitResult;

const SMOOTH: char = '\u{0313}';
const ROUGH: char = '\u{0314}';
const ACUTE: char = '\u{0301}';
const GRAVE: char = '\u{0300}';
const CIRCUMFLEX: char = '\u{0342}';
const IOTA_SUB: char = '\u{0345}';
const DIAERESIS: char = '\u{0308}';

fn betacode_letter(c: char) -> Option<char> {
    Some(match c.to_ascii_lowercase() {
        'a' => 'α', 'b' => 'β', 'g' => 'γ', 'd' => 'δ', 'e' => 'ε',
        'z' => 'ζ', 'h' => 'η', 'q' => 'θ', 'i' => 'ι', 'k' => 'κ',
        'l' => 'λ', 'm' => 'μ', 'n' => 'ν', 'c' => 'ξ', 'o' => 'ο',
        'p' => 'π', 'r' => 'ρ', 's' => 'σ', 't' => 'τ', 'u' => 'υ',
        'f' => 'φ', 'x' => 'χ', 'y' => 'ψ', 'w' => 'ω',
        _ => return None,
    })
}

fn betacode_diacritic(c: char) -> Option<char> {
    Some(match c {
        ')' => SMOOTH,
        '(' => ROUGH,
        '/' => ACUTE,
        '\\' => GRAVE,
        '=' => CIRCUMFLEX,
        '|' => IOTA_SUB,
        '+' => DIAERESIS,
        _ => return None,
    })
}

fn greek_base_to_ascii(c: char) -> Option<char> {
    Some(match c {
        'α' => 'a', 'β' => 'b', 'γ' => 'g', 'δ' => 'd', 'ε' => 'e',
        'ζ' => 'z', 'η' => 'h', 'θ' => 'q', 'ι' => 'i', 'κ' => 'k',
        'λ' => 'l', 'μ' => 'm', 'ν' => 'n', 'ξ' => 'c', 'ο' => 'o',
        'π' => 'p', 'ρ' => 'r', 'σ' => 's', 'ς' => 's', 'τ' => 't',
        'υ' => 'u', 'φ' => 'f', 'χ' => 'x', 'ψ' => 'y', 'ω' => 'w',
        _ => return None,
    })
}

/// Convert a Betacode token to Unicode Greek in NFC.
///
/// `*` uppercases the following letter; diacritics between `*` and the letter
/// (the usual Betacode convention for capitals) and diacritics after the
/// letter are both accepted. A trailing lowercase sigma becomes final `ς`.
pub fn betacode_to_unicode(input: &str) -> TranslitResult<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '*' {
            // Capital: optional diacritics, then the letter, then more diacritics.
            let mut marks = Vec::new();
            i += 1;
            while i < chars.len() {
                match betacode_diacritic(chars[i]) {
                    Some(m) => {
                        marks.push(m);
                        i += 1;
                    }
                    None => break,
                }
            }
            let Some(&letter) = chars.get(i) else {
                return Err(EncodingError::Malformed {
                    offset: byte_offset(&chars, i),
                    expected: "Betacode".into(),
                });
            };
            let base = betacode_letter(letter).ok_or(EncodingError::Malformed {
                offset: byte_offset(&chars, i),
                expected: "Betacode".into(),
            })?;
            i += 1;
            while i < chars.len() {
                match betacode_diacritic(chars[i]) {
                    Some(m) => {
                        marks.push(m);
                        i += 1;
                    }
                    None => break,
                }
            }
            for up in base.to_uppercase() {
                out.push(up);
            }
            push_marks(&mut out, &marks);
        } else if let Some(base) = betacode_letter(c) {
            let is_sigma = c.to_ascii_lowercase() == 's';
            i += 1;
            let mut marks = Vec::new();
            while i < chars.len() {
                match betacode_diacritic(chars[i]) {
                    Some(m) => {
                        marks.push(m);
                        i += 1;
                    }
                    None => break,
                }
            }
            // Final sigma: `s` with no diacritics at the end of a letter run.
            let at_word_end = i >= chars.len()
                || (betacode_letter(chars[i]).is_none() && chars[i] != '*');
            if is_sigma && marks.is_empty() && at_word_end {
                out.push('ς');
            } else {
                out.push(base);
                push_marks(&mut out, &marks);
            }
        } else {
            return Err(EncodingError::Malformed {
                offset: byte_offset(&chars, i),
                expected: "Betacode".into(),
            });
        }
    }
    Ok(out.nfc().collect())
}

/// Convert Unicode Greek to Betacode.
///
/// Diacritics serialize in the order breathing, accent, iota subscript;
/// capitals serialize as `*` + diacritics + letter. Final sigma folds to `s`.
pub fn unicode_to_betacode(input: &str) -> TranslitResult<String> {
    let decomposed: Vec<char> = input.nfd().collect();
    let mut out = String::new();
    let mut i = 0;
    while i < decomposed.len() {
        let c = decomposed[i];
        let lower: char = c.to_lowercase().next().unwrap_or(c);
        let is_upper = c.is_uppercase();
        let Some(ascii) = greek_base_to_ascii(lower) else {
            let offset: usize = decomposed[..i].iter().map(|ch| ch.len_utf8()).sum();
            return Err(EncodingError::Malformed {
                offset,
                expected: "Greek Unicode".into(),
            });
        };
        i += 1;
        let mut breathing = None;
        let mut accent = None;
        let mut iota = false;
        let mut diaeresis = false;
        while i < decomposed.len() {
            match decomposed[i] {
                SMOOTH => breathing = Some(')'),
                ROUGH => breathing = Some('('),
                ACUTE => accent = Some('/'),
                GRAVE => accent = Some('\\'),
                CIRCUMFLEX | '\u{0303}' => accent = Some('='),
                IOTA_SUB => iota = true,
                DIAERESIS => diaeresis = true,
                _ => break,
            }
            i += 1;
        }
        if is_upper {
            // Capitals carry their marks between the asterisk and the letter.
            out.push('*');
            serialize_marks(&mut out, breathing, diaeresis, accent, iota);
            out.push(ascii);
        } else {
            out.push(ascii);
            serialize_marks(&mut out, breathing, diaeresis, accent, iota);
        }
    }
    Ok(out)
}

fn serialize_marks(
    out: &mut String,
    breathing: Option<char>,
    diaeresis: bool,
    accent: Option<char>,
    iota: bool,
) {
    if let Some(b) = breathing {
        out.push(b);
    }
    if diaeresis {
        out.push('+');
    }
    if let Some(a) = accent {
        out.push(a);
    }
    if iota {
        out.push('|');
    }
}

fn push_marks(out: &mut String, marks: &[char]) {
    // Combining classes order breathings/accents (230) before iota (240);
    // emit in received order and let NFC put them right.
    for &m in marks {
        out.push(m);
    }
}

fn byte_offset(chars: &[char], idx: usize) -> usize {
    chars[..idx.min(chars.len())]
        .iter()
        .map(|c| c.len_utf8())
        .sum()
}

/// Normalize final sigma: a medial `ς` becomes `σ`, a trailing `σ` becomes `ς`.
pub fn normalize_final_sigma(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    for (i, &c) in chars.iter().enumerate() {
        let at_end = chars
            .get(i + 1)
            .map(|n| !n.is_alphabetic())
            .unwrap_or(true);
        match c {
            'σ' if at_end => out.push('ς'),
            'ς' if !at_end => out.push('σ'),
            _ => out.push(c),
        }
    }
    out
}
