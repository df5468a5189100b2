//! Lewis & Short full-entry grammar (Latin).
//!
//! Block shape: `headword principal_parts? root_marker? sense_list`.
//!
//! - the headword may carry macrons; principal parts sit on a
//!   whitespace-led line (` āvī, ātus, āre`)
//! - a root marker is an all-uppercase token followed by `-,` (`SED-,`)
//! - senses separate on em-dash `—`; examples follow `: ` and may close with
//!   `, AUTHOR.` for a known author abbreviation
//! - a gloss the typesetter wrapped in newlines inside an example is lifted
//!   to the example's own gloss field, never concatenated into its text

use std::sync::LazyLock;

use regex::Regex;

use crate::adapter::Source;
use crate::language::Language;
use crate::parse::{ParsedEntry, ParsedExample, ParsedSense};

/// Author abbreviations Lewis & Short closes examples with.
const AUTHOR_ABBREVS: &[&str] = &[
    "Cic", "Verg", "Hor", "Ov", "Liv", "Plaut", "Ter", "Caes", "Sall", "Tac",
    "Quint", "Juv", "Mart", "Sen", "Plin", "Suet", "Cat", "Tib", "Prop",
    "Luc", "Stat", "Vulg", "Enn", "Lucr", "Nep", "Curt", "Gell", "Varr",
];

static ROOT_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b([A-Z]{2,})-,").unwrap());

static PRINCIPAL_PARTS_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]+([a-zāēīōūȳăĕĭŏŭ]+(?:,\s*[a-zāēīōūȳăĕĭŏŭ]+)+)\s*$").unwrap());

static TRAILING_AUTHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([A-Z][a-z]+)\.\s*$").unwrap());

static WRAPPED_GLOSS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n([^\n]+)\n").unwrap());

/// Parse one Lewis & Short block. The headword is the block's first token;
/// blocks with no recognizable structure come back as a single-sense entry.
pub fn parse(raw: &str) -> ParsedEntry {
    let mut lines = raw.lines();
    let first = lines.next().unwrap_or("").trim();
    let headword = first
        .split([',', ' '])
        .next()
        .unwrap_or_default()
        .to_string();

    let mut entry = ParsedEntry::new(&headword, Source::DiogenesLatin, Language::Latin);
    entry.raw_text = raw.to_string();

    let mut body_lines: Vec<&str> = Vec::new();
    // Anything after the headword on the first line is body.
    let first_rest = first[headword.len()..].trim_start_matches(',').trim();
    if !first_rest.is_empty() {
        body_lines.push(first_rest);
    }
    for line in lines {
        if entry.principal_parts.is_empty() {
            if let Some(caps) = PRINCIPAL_PARTS_LINE.captures(line) {
                entry.principal_parts = caps[1]
                    .split(',')
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect();
                continue;
            }
        }
        body_lines.push(line);
    }
    let mut body = body_lines.join("\n");

    if let Some(caps) = ROOT_MARKER.captures(&body) {
        entry.root = Some(caps[1].to_string());
        let full = caps.get(0).unwrap().range();
        body.replace_range(full, "");
    }

    for sense_text in body.split('—') {
        let sense_text = sense_text.trim_matches(|c: char| c == '\n' || c == ' ');
        if sense_text.is_empty() {
            continue;
        }
        entry.senses.push(parse_sense(sense_text));
    }

    if entry.senses.is_empty() {
        entry.senses.push(ParsedSense::new(raw.trim()));
    }
    entry
}

/// One em-dash-delimited sense: gloss, then `: `-introduced examples.
fn parse_sense(text: &str) -> ParsedSense {
    let Some(colon) = text.find(": ") else {
        return ParsedSense::new(text.trim());
    };
    let mut sense = ParsedSense::new(text[..colon].trim());
    let mut example_text = text[colon + 2..].to_string();

    let mut example = ParsedExample {
        text: String::new(),
        author: None,
        gloss: None,
    };

    // A translation the source wraps in its own line belongs to the example's
    // gloss field, not its text.
    if let Some(caps) = WRAPPED_GLOSS.captures(&example_text) {
        example.gloss = Some(caps[1].trim().to_string());
        let full = caps.get(0).unwrap().range();
        example_text.replace_range(full, " ");
    }

    let mut flat = example_text.replace('\n', " ").trim().to_string();
    if let Some(caps) = TRAILING_AUTHOR.captures(&flat) {
        let author = caps[1].to_string();
        if AUTHOR_ABBREVS.contains(&author.as_str()) {
            example.author = Some(format!("{author}."));
            let cut = caps.get(0).unwrap().start();
            flat.truncate(cut);
        }
    }
    example.text = flat.trim().to_string();
    sense.examples.push(example);
    sense
}
