//! Whitaker's Words adapter: a local subprocess, one query per invocation.
//!
//! The binary reads a word on stdin and prints analysis lines followed by
//! `;`-separated gloss lines. The child is polled against a deadline and
//! killed on expiry, so a wedged binary costs one timeout, not a hung
//! request.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::adapter::{AdapterResponse, DictionaryAdapter, Source};
use crate::engine::health::ComponentStatus;
use crate::error::AdapterError;
use crate::fact::{Fact, FactPayload, ProvenanceRecord};
use crate::language::Language;
use crate::normalize::CanonicalQuery;
use crate::schema::{DictionaryDefinition, DictionaryEntry, MorphologyInfo};

const MAX_OUTPUT_SIZE: usize = 64 * 1024;

pub struct WhitakersAdapter {
    binary: PathBuf,
    timeout: Duration,
}

impl WhitakersAdapter {
    pub fn new(binary: &Path, timeout: Duration) -> Self {
        Self {
            binary: binary.to_path_buf(),
            timeout,
        }
    }

    fn run(&self, term: &str) -> Result<String, AdapterError> {
        let source_tag = Source::Whitakers;
        let mut child = Command::new(&self.binary)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| AdapterError::Transport {
                source_tag,
                message: format!("failed to spawn {}: {e}", self.binary.display()),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            let _ = writeln!(stdin, "{term}");
            // Dropping stdin closes the pipe; the binary answers and exits.
        }

        let started = Instant::now();
        let deadline = started + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(_)) => break,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(AdapterError::Timeout {
                            source_tag,
                            elapsed_ms: started.elapsed().as_millis() as u64,
                        });
                    }
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(e) => {
                    return Err(AdapterError::Transport {
                        source_tag,
                        message: format!("wait failed: {e}"),
                    });
                }
            }
        }

        let mut output = String::new();
        if let Some(mut stdout) = child.stdout.take() {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).map_err(|e| AdapterError::Protocol {
                source_tag,
                message: format!("failed to read stdout: {e}"),
            })?;
            buf.truncate(MAX_OUTPUT_SIZE);
            output = String::from_utf8_lossy(&buf).into_owned();
        }
        Ok(output)
    }

    /// Parse the binary's output for one query.
    ///
    /// Analysis lines look like `lup.us N 2 1 NOM S M`; a dictionary line
    /// looks like `lupus, lupi N (2nd) M`; gloss lines are lowercase and
    /// `;`-separated (`wolf; grey wolf;`).
    fn parse_output(term: &str, output: &str) -> Option<DictionaryEntry> {
        let mut morphology: Option<MorphologyInfo> = None;
        let mut glosses: Vec<String> = Vec::new();
        let mut pos: Option<String> = None;

        for line in output.lines() {
            let line = line.trim_end();
            if line.is_empty() || line.contains("UNKNOWN") {
                continue;
            }
            if let Some((code, features)) = parse_analysis_line(line) {
                pos = Some(code.clone());
                if morphology.is_none() {
                    morphology = Some(MorphologyInfo {
                        lemma: lemma_from_line(line).unwrap_or_else(|| term.to_string()),
                        pos: code,
                        features,
                        confidence: 0.85,
                    });
                }
            } else if is_gloss_line(line) {
                glosses.extend(
                    line.split(';')
                        .map(str::trim)
                        .filter(|g| !g.is_empty())
                        .map(str::to_string),
                );
            }
        }

        if morphology.is_none() && glosses.is_empty() {
            return None;
        }

        let mut entry = DictionaryEntry {
            source: Source::Whitakers,
            headword: morphology
                .as_ref()
                .map(|m| m.lemma.clone())
                .unwrap_or_else(|| term.to_string()),
            language: Language::Latin,
            definitions: Vec::new(),
            citations: Vec::new(),
            morphology,
            metadata: BTreeMap::new(),
        };
        for gloss in glosses {
            let mut definition = DictionaryDefinition::new(gloss);
            definition.pos = pos.clone();
            entry.definitions.push(definition);
        }
        // A morphology-only answer still needs something to say.
        if entry.definitions.is_empty() {
            if let Some(morph) = &entry.morphology {
                let mut definition =
                    DictionaryDefinition::new(format!("{}: {}", morph.lemma, morph.pos));
                definition.pos = Some(morph.pos.clone());
                entry.definitions.push(definition);
            }
        }
        Some(entry)
    }
}

/// A gloss line starts lowercase and carries no analysis-code tokens.
fn is_gloss_line(line: &str) -> bool {
    let starts_lower = line
        .chars()
        .next()
        .map(|c| c.is_lowercase())
        .unwrap_or(false);
    let has_code_token = line.split_whitespace().any(|t| {
        matches!(
            t,
            "N" | "V" | "ADJ" | "ADV" | "PREP" | "CONJ" | "PRON" | "NUM" | "INTERJ"
        )
    });
    starts_lower && !has_code_token
}

/// `lup.us N 2 1 NOM S M` → ("noun", {case: nominative, number: singular,
/// gender: masculine, declension: 2}).
fn parse_analysis_line(line: &str) -> Option<(String, BTreeMap<String, String>)> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }
    let pos = match tokens[1] {
        "N" => "noun",
        "V" => "verb",
        "ADJ" => "adjective",
        "ADV" => "adverb",
        "PREP" => "preposition",
        "CONJ" => "conjunction",
        "PRON" => "pronoun",
        "NUM" => "numeral",
        "INTERJ" => "interjection",
        _ => return None,
    };
    // The stem token carries a `.` splitting stem from ending.
    if !tokens[0].contains('.') && tokens[0].chars().any(|c| c.is_uppercase()) {
        return None;
    }

    let mut features = BTreeMap::new();
    for token in &tokens[2..] {
        let mapped = match *token {
            "NOM" => Some(("case", "nominative")),
            "GEN" => Some(("case", "genitive")),
            "DAT" => Some(("case", "dative")),
            "ACC" => Some(("case", "accusative")),
            "ABL" => Some(("case", "ablative")),
            "VOC" => Some(("case", "vocative")),
            "S" => Some(("number", "singular")),
            "P" => Some(("number", "plural")),
            "M" => Some(("gender", "masculine")),
            "F" => Some(("gender", "feminine")),
            "N" => Some(("gender", "neuter")),
            "PRES" => Some(("tense", "present")),
            "IMPF" => Some(("tense", "imperfect")),
            "FUT" => Some(("tense", "future")),
            "PERF" => Some(("tense", "perfect")),
            "ACTIVE" => Some(("voice", "active")),
            "PASSIVE" => Some(("voice", "passive")),
            "IND" => Some(("mood", "indicative")),
            "SUB" => Some(("mood", "subjunctive")),
            "IMP" => Some(("mood", "imperative")),
            _ => None,
        };
        if let Some((key, value)) = mapped {
            features.insert(key.to_string(), value.to_string());
        } else if token.len() == 1 && token.chars().all(|c| c.is_ascii_digit()) {
            features
                .entry("declension".to_string())
                .or_insert_with(|| token.to_string());
        }
    }
    if features.is_empty() {
        return None;
    }
    Some((pos.to_string(), features))
}

/// Recover the lemma from the stem token: `lup.us` → `lupus`.
fn lemma_from_line(line: &str) -> Option<String> {
    let stem = line.split_whitespace().next()?;
    Some(stem.replace('.', ""))
}

impl DictionaryAdapter for WhitakersAdapter {
    fn source(&self) -> Source {
        Source::Whitakers
    }

    fn query(&self, query: &CanonicalQuery) -> Result<AdapterResponse, AdapterError> {
        let output = self.run(&query.canonical)?;
        tracing::debug!(
            term = %query.canonical,
            bytes = output.len(),
            "whitakers subprocess answered"
        );
        let entries = Self::parse_output(&query.canonical, &output)
            .into_iter()
            .collect();
        let provenance = ProvenanceRecord::new(Source::Whitakers, &query.canonical);
        Ok(AdapterResponse {
            entries,
            raw: (!output.is_empty()).then_some(output),
            provenance,
        })
    }

    fn extract_facts(&self, raw: &str, provenance: &ProvenanceRecord) -> Vec<Fact> {
        let Some(entry) = Self::parse_output("", raw) else {
            return Vec::new();
        };
        let mut facts = Vec::new();
        let mut ordinal = 0;
        for definition in &entry.definitions {
            facts.push(Fact::new(
                Source::Whitakers,
                Language::Latin,
                entry.headword.clone(),
                FactPayload::Gloss {
                    gloss: definition.definition.clone(),
                    domains: Vec::new(),
                    register: Vec::new(),
                    source_ref: None,
                    tool_specific: BTreeMap::new(),
                },
                &provenance.provenance_id,
                ordinal,
            ));
            ordinal += 1;
        }
        if let Some(morphology) = &entry.morphology {
            facts.push(Fact::new(
                Source::Whitakers,
                Language::Latin,
                entry.headword.clone(),
                FactPayload::Morphology {
                    morphology: morphology.clone(),
                    tool_specific: BTreeMap::new(),
                },
                &provenance.provenance_id,
                ordinal,
            ));
        }
        facts
    }

    fn probe(&self) -> ComponentStatus {
        if self.binary.exists() {
            ComponentStatus::Healthy
        } else {
            ComponentStatus::Unavailable {
                detail: format!("binary not found at {}", self.binary.display()),
            }
        }
    }
}
