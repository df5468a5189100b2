//! CDSL (Cologne) Sanskrit entry grammar.
//!
//! Block shape: `headword "/" WS+ grammatical_spec* sense_body citation_abbrev?`
//!
//! - `grammatical_spec` is a gender letter (`m.`/`f.`/`n.`) or a root
//!   parenthetical `(√ ROOT [, grammar_ref])`
//! - senses are comma-separated where the comma is followed by lowercase text
//! - a trailing `, X.` with `X` a known citation abbreviation is lifted out
//!   of the gloss into a citation

use std::sync::LazyLock;

use regex::Regex;

use crate::adapter::Source;
use crate::language::Language;
use crate::parse::{ParseIssue, ParsedCitation, ParsedEntry, ParsedSense, fallback_entry};

/// Citation abbreviations recognized at the tail of a sense body. The list
/// follows Monier-Williams' sigla for the texts that actually show up in
/// sense tails.
const CITATION_ABBREVS: &[&str] = &[
    "L", "RV", "AV", "VS", "TS", "TBr", "ŚBr", "AitBr", "ChUp", "Up", "Mn",
    "MBh", "R", "Hariv", "BhP", "Pañcat", "Hit", "Kathās", "Rājat", "Ragh",
    "Kum", "Megh", "Śak", "Mṛcch", "Suśr", "Car", "Pāṇ", "Uṇ", "Nir", "Var",
    "Sūryas", "Kāv", "Daś", "Veṇīs", "Sāh", "ib", "W", "MW",
];

static GENDER_SPEC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([mfn])\.\s*").unwrap());

static ROOT_SPEC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(\s*√\s*([^,)]+?)(?:\s*,\s*([^)]+?))?\s*\)\s*").unwrap());

static TRAILING_CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([^\s,.]+)\.\s*$").unwrap());

/// Parse one CDSL block. Never fails: grammar mismatches produce a fallback
/// entry with the raw text as its single gloss.
pub fn parse(raw: &str) -> ParsedEntry {
    match try_parse(raw) {
        Ok(entry) => entry,
        Err(issue) => {
            let headword = raw
                .split(['/', ' '])
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            fallback_entry(Source::Cdsl, Language::Sanskrit, &headword, raw, issue)
        }
    }
}

fn try_parse(raw: &str) -> Result<ParsedEntry, ParseIssue> {
    let Some(slash) = raw.find('/') else {
        return Err(ParseIssue {
            source: Source::Cdsl,
            reason: "missing headword separator '/'".into(),
            offset: 0,
        });
    };
    let headword = raw[..slash].trim();
    if headword.is_empty() {
        return Err(ParseIssue {
            source: Source::Cdsl,
            reason: "empty headword".into(),
            offset: 0,
        });
    }

    let mut entry = ParsedEntry::new(headword, Source::Cdsl, Language::Sanskrit);
    entry.raw_text = raw.to_string();

    let mut rest = raw[slash + 1..].trim_start();

    // Grammatical specs in any order before the sense body.
    loop {
        if let Some(caps) = GENDER_SPEC.captures(rest) {
            entry.gender = Some(caps[1].to_string());
            rest = &rest[caps[0].len()..];
            continue;
        }
        if let Some(caps) = ROOT_SPEC.captures(rest) {
            entry.root = Some(caps[1].trim().to_string());
            if let Some(gref) = caps.get(2) {
                let abbrev = gref.as_str().trim().trim_end_matches('.');
                entry.citations.push(ParsedCitation {
                    text: gref.as_str().trim().to_string(),
                    source_ref: format!("citation_abbrev:{abbrev}"),
                    cts_urn: None,
                });
            }
            rest = &rest[caps[0].len()..];
            continue;
        }
        break;
    }

    let mut body = rest.trim().to_string();

    // Trailing `, X.` with a known abbreviation becomes a citation.
    if let Some(caps) = TRAILING_CITATION.captures(&body) {
        let abbrev = caps[1].to_string();
        if CITATION_ABBREVS.contains(&abbrev.as_str()) {
            entry.citations.push(ParsedCitation {
                text: format!("{abbrev}."),
                source_ref: format!("citation_abbrev:{abbrev}"),
                cts_urn: None,
            });
            let cut = caps.get(0).unwrap().start();
            body.truncate(cut);
        }
    }

    for gloss in split_senses(&body) {
        entry.senses.push(ParsedSense::new(gloss));
    }

    if !entry.is_well_formed() {
        return Err(ParseIssue {
            source: Source::Cdsl,
            reason: "no senses or citations found".into(),
            offset: slash + 1,
        });
    }
    Ok(entry)
}

/// Split a sense body on commas followed by lowercase text. Commas before
/// capitals or digits stay inside the sense (they separate citations and
/// references, not senses).
fn split_senses(body: &str) -> Vec<String> {
    let mut senses = Vec::new();
    let mut start = 0;
    let bytes = body.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b',' {
            continue;
        }
        let after = body[i + 1..].trim_start();
        if after
            .chars()
            .next()
            .map(|c| c.is_lowercase())
            .unwrap_or(false)
        {
            let piece = body[start..i].trim();
            if !piece.is_empty() {
                senses.push(piece.to_string());
            }
            start = i + 1;
        }
    }
    let tail = body[start..].trim();
    if !tail.is_empty() {
        senses.push(tail.to_string());
    }
    senses
}
