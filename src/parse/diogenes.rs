//! Diogenes sense-block grammar (Latin and Greek lexica).
//!
//! Block shape: `sense_marker? sense_content`.
//!
//! A sense marker is a Roman numeral, a single Greek lowercase letter, an
//! Arabic numeral, or a single lowercase Latin letter, followed by `.` and
//! exactly TWO spaces. The two-space sequence is the disambiguator: `I.` with
//! a single space is ordinary prose, so the input stream must arrive with its
//! spacing uncollapsed.
//!
//! Sense content is an optional etymology note, a gloss body, and
//! semicolon-separated embedded citations in Perseus style
//! (`Verg. E. 2, 63`, `IG 1(2).374.191`).

use std::sync::LazyLock;

use regex::Regex;

use crate::adapter::Source;
use crate::language::Language;
use crate::parse::{ParsedCitation, ParsedEntry, ParsedSense};

static SENSE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([IVXLCDM]+|[0-9]+|[α-ω]|[a-z])\.  ").unwrap());

static CITATION_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"((?:[A-Z][A-Za-z]*\.\s+)+[0-9][0-9(),.\s]*|[A-Z]{2,}\s+[0-9][0-9().]*)\s*$")
        .unwrap()
});

const ETYMOLOGY_PREFIXES: &[&str] = &["verbal noun of", "kindred with", "cf."];

/// Parse one Diogenes block for `language`. The headword comes from the
/// enclosing response, not the block itself.
///
/// Blocks that match no grammar still come back as a well-formed entry with
/// the whole block as one gloss; this parser has no failure mode.
pub fn parse(language: Language, headword: &str, block: &str) -> ParsedEntry {
    let source = match language {
        Language::Greek => Source::DiogenesGreek,
        _ => Source::DiogenesLatin,
    };
    let mut entry = ParsedEntry::new(headword, source, language);
    entry.raw_text = block.to_string();

    let (sense_id, content) = match SENSE_MARKER.captures(block) {
        Some(caps) => {
            let marker = caps[1].to_string();
            (Some(marker), &block[caps[0].len()..])
        }
        None => (None, block),
    };

    let mut sense = ParsedSense::new("");
    sense.sense_id = sense_id;

    let mut gloss_parts: Vec<String> = Vec::new();
    for (i, segment) in content.split(';').enumerate() {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        if i == 0 && ETYMOLOGY_PREFIXES.iter().any(|p| segment.starts_with(p)) {
            entry.etymology = Some(segment.to_string());
            continue;
        }
        match CITATION_REF.captures(segment) {
            Some(caps) => {
                let source_ref = caps[1].trim().to_string();
                entry.citations.push(ParsedCitation {
                    text: segment.to_string(),
                    source_ref,
                    cts_urn: None,
                });
                // Quoted text ahead of the reference still reads as gloss
                // when it is the only content the segment carries.
                let lead = segment[..caps.get(1).unwrap().start()].trim();
                if gloss_parts.is_empty() && !lead.is_empty() {
                    gloss_parts.push(lead.trim_end_matches(',').trim().to_string());
                }
            }
            None => gloss_parts.push(segment.to_string()),
        }
    }

    sense.gloss = gloss_parts.join("; ");
    if !sense.gloss.is_empty() || entry.citations.is_empty() {
        // Always emit the sense unless the block was citations only.
        if sense.gloss.is_empty() {
            sense.gloss = content.trim().to_string();
        }
        entry.senses.push(sense);
    } else if let Some(id) = sense.sense_id {
        // Citations-only block: keep the marker on a stub sense so joins by
        // sense_id still work.
        let mut stub = ParsedSense::new("");
        stub.sense_id = Some(id);
        stub.gloss = content.trim().to_string();
        entry.senses.push(stub);
    }

    entry
}
