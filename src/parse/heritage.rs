//! Heritage morphology-block grammar (Sanskrit).
//!
//! The adapter extracts each result row of the upstream HTML table into a
//! synthetic text block: `[ headword ]{ morph_code+ ( "|" morph_code+ )* }`.
//! Each `|`-separated group is one alternative analysis; each group becomes
//! its own [`ParsedEntry`] carrying a [`MorphologyInfo`] with the French
//! abbreviations expanded to English features.
//!
//! Cell background color never appears here; the adapter keeps it in the
//! entry's tool-specific map.

use std::collections::BTreeMap;

use crate::adapter::Source;
use crate::language::Language;
use crate::parse::{ParseIssue, ParsedEntry, ParsedSense, fallback_entry, morph_table};
use crate::schema::MorphologyInfo;

/// Parse one Heritage block into one entry per alternative analysis.
pub fn parse(raw: &str) -> Vec<ParsedEntry> {
    match try_parse(raw) {
        Ok(entries) => entries,
        Err(issue) => {
            vec![fallback_entry(
                Source::Heritage,
                Language::Sanskrit,
                raw.trim(),
                raw,
                issue,
            )]
        }
    }
}

fn try_parse(raw: &str) -> Result<Vec<ParsedEntry>, ParseIssue> {
    let open = raw.find('[').ok_or_else(|| ParseIssue {
        source: Source::Heritage,
        reason: "missing '[' headword delimiter".into(),
        offset: 0,
    })?;
    let close = raw.find(']').ok_or_else(|| ParseIssue {
        source: Source::Heritage,
        reason: "missing ']' headword delimiter".into(),
        offset: open,
    })?;
    let headword = raw[open + 1..close].trim();
    if headword.is_empty() {
        return Err(ParseIssue {
            source: Source::Heritage,
            reason: "empty headword".into(),
            offset: open,
        });
    }

    let brace_open = raw[close..].find('{').ok_or_else(|| ParseIssue {
        source: Source::Heritage,
        reason: "missing '{' analysis delimiter".into(),
        offset: close,
    })? + close;
    let brace_close = raw[brace_open..].find('}').ok_or_else(|| ParseIssue {
        source: Source::Heritage,
        reason: "missing '}' analysis delimiter".into(),
        offset: brace_open,
    })? + brace_open;
    let analyses = &raw[brace_open + 1..brace_close];

    let mut entries = Vec::new();
    for group in analyses.split('|') {
        let codes: Vec<&str> = group.split_whitespace().collect();
        if codes.is_empty() {
            continue;
        }
        let mut entry = ParsedEntry::new(headword, Source::Heritage, Language::Sanskrit);
        entry.raw_text = raw.to_string();
        entry.morphology = Some(expand_group(headword, &codes));

        // The upstream displays the analysis as text; keep that rendering as
        // the entry's sense so the entry says something without morphology
        // support downstream.
        let mut sense = ParsedSense::new(format!("{headword}: {}", codes.join(" ")));
        sense.register.push("morphology".into());
        entry.senses.push(sense);
        entries.push(entry);
    }

    if entries.is_empty() {
        return Err(ParseIssue {
            source: Source::Heritage,
            reason: "no analysis groups".into(),
            offset: brace_open,
        });
    }
    Ok(entries)
}

/// Expand one code group into a feature map. Ambiguous codes keep every
/// reading: the primary under its key, the rest under `key#alt`, with
/// `ambiguous = true` flagged on the analysis.
fn expand_group(headword: &str, codes: &[&str]) -> MorphologyInfo {
    let mut features: BTreeMap<String, String> = BTreeMap::new();
    let mut ambiguous = false;
    let mut unrecognized: Vec<&str> = Vec::new();

    for code in codes {
        match morph_table::expand(code) {
            Some(expansions) => {
                for (i, expansion) in expansions.iter().enumerate() {
                    let key = if i == 0 {
                        expansion.key.to_string()
                    } else {
                        ambiguous = true;
                        format!("{}#alt", expansion.key)
                    };
                    features.entry(key).or_insert_with(|| expansion.value.to_string());
                }
            }
            None => unrecognized.push(code),
        }
    }
    if ambiguous {
        features.insert("ambiguous".into(), "true".into());
    }
    if !unrecognized.is_empty() {
        features.insert("unrecognized".into(), unrecognized.join(" "));
    }

    let pos = derive_pos(&features);
    let confidence = if ambiguous { 0.7 } else { 0.9 };
    MorphologyInfo {
        lemma: headword.to_string(),
        pos,
        features,
        confidence,
    }
}

fn derive_pos(features: &BTreeMap<String, String>) -> String {
    if let Some(pos) = features.get("pos") {
        return pos.clone();
    }
    if features.contains_key("tense")
        || features.contains_key("mood")
        || features.contains_key("person")
        || features.contains_key("form")
    {
        return "verb".to_string();
    }
    if features.contains_key("case") || features.contains_key("gender") {
        return "noun".to_string();
    }
    "indeclinable".to_string()
}
