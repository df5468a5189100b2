//! Diogenes adapter: Perseus-style Greek and Latin lexica over a local HTTP
//! service.
//!
//! One adapter type covers both languages; the engine registers a Latin and a
//! Greek instance. Greek requests go out in Betacode (the service's search
//! encoding); responses are HTML pages whose sense blocks are extracted with
//! CSS selectors and fed block-by-block to the Diogenes grammar. Blocks that
//! share a sense marker stay separate entries — joining is the engine's job.

use std::io::Read;
use std::time::Duration;

use scraper::{Html, Selector};

use crate::adapter::{
    AdapterResponse, DictionaryAdapter, Source, parsed_to_entry, parsed_to_facts,
};
use crate::engine::health::ComponentStatus;
use crate::error::AdapterError;
use crate::fact::{Fact, ProvenanceRecord};
use crate::language::Language;
use crate::normalize::CanonicalQuery;
use crate::parse::{diogenes, lewis_short};
use crate::translit::greek;

const MAX_RESPONSE_SIZE: u64 = 1024 * 1024;

pub struct DiogenesAdapter {
    language: Language,
    base_url: String,
    agent: ureq::Agent,
}

impl DiogenesAdapter {
    pub fn new(language: Language, base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            language,
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    fn lang_code(&self) -> &'static str {
        match self.language {
            Language::Greek => "grc",
            _ => "lat",
        }
    }

    /// The term in the encoding the service searches by: Betacode for Greek,
    /// folded ASCII for Latin.
    fn wire_term(&self, query: &CanonicalQuery) -> String {
        if self.language == Language::Greek {
            if let Ok(beta) = greek::unicode_to_betacode(&query.canonical) {
                return beta;
            }
            if let Some(alt) = query.alternates.iter().find(|a| a.is_ascii()) {
                return alt.clone();
            }
        }
        query.canonical.clone()
    }

    fn fetch(&self, term: &str) -> Result<(String, String), AdapterError> {
        let source_tag = self.source();
        let url = format!(
            "{}/search?lang={}&q={}",
            self.base_url,
            self.lang_code(),
            term
        );
        let response = self.agent.get(&url).call().map_err(|e| match e {
            ureq::Error::Status(code, _) => AdapterError::Protocol {
                source_tag,
                message: format!("HTTP {code} from {url}"),
            },
            ureq::Error::Transport(t) => AdapterError::Transport {
                source_tag,
                message: t.to_string(),
            },
        })?;
        let mut body = String::new();
        response
            .into_reader()
            .take(MAX_RESPONSE_SIZE)
            .read_to_string(&mut body)
            .map_err(|e| AdapterError::Protocol {
                source_tag,
                message: format!("failed to read body: {e}"),
            })?;
        Ok((body, url))
    }

    /// Pull the headword and sense blocks out of a response page.
    ///
    /// Full Lewis & Short entry bodies arrive under `div.entry`; numbered
    /// sense blocks under `div.sense`/`p.sense`. A page with neither is
    /// treated as one opaque block.
    fn extract_blocks(html: &str) -> (Option<String>, Vec<ExtractedBlock>) {
        let document = Html::parse_document(html);
        let mut headword = None;

        if let Ok(selector) = Selector::parse("h2.headword, span.headword") {
            if let Some(el) = document.select(&selector).next() {
                let text = el.text().collect::<String>().trim().to_string();
                if !text.is_empty() {
                    headword = Some(text);
                }
            }
        }

        let mut blocks = Vec::new();
        if let Ok(selector) = Selector::parse("div.entry") {
            for el in document.select(&selector) {
                let text = element_text(&el);
                if !text.is_empty() {
                    blocks.push(ExtractedBlock {
                        kind: BlockKind::FullEntry,
                        text,
                    });
                }
            }
        }
        if let Ok(selector) = Selector::parse("div.sense, p.sense") {
            for el in document.select(&selector) {
                let text = element_text(&el);
                if !text.is_empty() {
                    blocks.push(ExtractedBlock {
                        kind: BlockKind::Sense,
                        text,
                    });
                }
            }
        }
        if blocks.is_empty() {
            let body_text = document
                .root_element()
                .text()
                .collect::<String>()
                .trim()
                .to_string();
            if !body_text.is_empty() {
                blocks.push(ExtractedBlock {
                    kind: BlockKind::Sense,
                    text: body_text,
                });
            }
        }
        (headword, blocks)
    }

    fn parse_blocks(&self, headword: &str, blocks: &[ExtractedBlock]) -> Vec<crate::schema::DictionaryEntry> {
        let mut entries = Vec::new();
        for block in blocks {
            let parsed = match block.kind {
                BlockKind::FullEntry if self.language == Language::Latin => {
                    lewis_short::parse(&block.text)
                }
                _ => diogenes::parse(self.language, headword, &block.text),
            };
            entries.push(parsed_to_entry(&parsed));
        }
        entries
    }

    /// Rebuild the block list from stored raw HTML.
    fn blocks_from_raw(&self, raw: &str) -> (String, Vec<ExtractedBlock>) {
        let (headword, blocks) = Self::extract_blocks(raw);
        (headword.unwrap_or_default(), blocks)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BlockKind {
    FullEntry,
    Sense,
}

#[derive(Debug, Clone)]
struct ExtractedBlock {
    kind: BlockKind,
    text: String,
}

/// Element text with the markup dropped but line structure kept.
///
/// The upstream delivers an entry's headword, principal-parts line, and sense
/// body as separate DOM nodes (child elements and `<br>`s), not as one text
/// node with embedded newlines. The Lewis & Short grammar is line-oriented —
/// its principal-parts rule only matches a whitespace-led line of its own —
/// so the walk inserts a `\n` at every block-level boundary instead of
/// jamming the text nodes together. Inter-element formatting whitespace
/// collapses to a single space. Only the outer ends are trimmed; interior
/// leading whitespace (the principal-parts marker) survives.
fn element_text(el: &scraper::ElementRef<'_>) -> String {
    let mut out = String::new();
    append_node_text(*el, &mut out);
    out.trim().to_string()
}

fn append_node_text(el: scraper::ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            if text.trim().is_empty() {
                // Formatting whitespace between elements, not content.
                if !out.is_empty() && !out.ends_with(char::is_whitespace) {
                    out.push(' ');
                }
                continue;
            }
            out.push_str(text);
        } else if let Some(child_el) = scraper::ElementRef::wrap(child) {
            let block = is_block_tag(child_el.value().name());
            if block && !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            append_node_text(child_el, out);
            if block && !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
        }
    }
}

fn is_block_tag(name: &str) -> bool {
    matches!(
        name,
        "div" | "p" | "br" | "li" | "ul" | "ol" | "table" | "tr" | "blockquote" | "h1" | "h2"
            | "h3" | "h4" | "h5" | "h6"
    )
}

impl DictionaryAdapter for DiogenesAdapter {
    fn source(&self) -> Source {
        match self.language {
            Language::Greek => Source::DiogenesGreek,
            _ => Source::DiogenesLatin,
        }
    }

    fn query(&self, query: &CanonicalQuery) -> Result<AdapterResponse, AdapterError> {
        let term = self.wire_term(query);
        let (body, url) = self.fetch(&term)?;
        let (headword, blocks) = Self::extract_blocks(&body);
        let headword = headword.unwrap_or_else(|| query.canonical.clone());
        tracing::debug!(
            source = %self.source(),
            term = %term,
            blocks = blocks.len(),
            "diogenes response extracted"
        );
        let entries = self.parse_blocks(&headword, &blocks);
        let provenance = ProvenanceRecord::new(self.source(), &term).with_request_url(url);
        Ok(AdapterResponse {
            entries,
            raw: Some(body),
            provenance,
        })
    }

    fn extract_facts(&self, raw: &str, provenance: &ProvenanceRecord) -> Vec<Fact> {
        let (headword, blocks) = self.blocks_from_raw(raw);
        let mut ordinal = 0;
        let mut facts = Vec::new();
        for block in &blocks {
            let parsed = match block.kind {
                BlockKind::FullEntry if self.language == Language::Latin => {
                    lewis_short::parse(&block.text)
                }
                _ => diogenes::parse(self.language, &headword, &block.text),
            };
            facts.extend(parsed_to_facts(&parsed, provenance, &mut ordinal));
        }
        facts
    }

    fn probe(&self) -> ComponentStatus {
        match self.agent.get(&self.base_url).call() {
            Ok(_) => ComponentStatus::Healthy,
            Err(ureq::Error::Status(code, _)) => ComponentStatus::Degraded {
                detail: format!("HTTP {code}"),
            },
            Err(ureq::Error::Transport(t)) => ComponentStatus::Unavailable {
                detail: t.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LATIN_PAGE: &str = r#"
        <html><body>
        <h2 class="headword">lupus</h2>
        <div class="sense">I.  a wolf; qui amant ipsi sibi somnia fingunt, Verg. E. 2, 63</div>
        <div class="sense">II.  a voracious fish, the wolf-fish; Plin. 9, 17</div>
        </body></html>
    "#;

    #[test]
    fn extracts_headword_and_sense_blocks() {
        let (headword, blocks) = DiogenesAdapter::extract_blocks(LATIN_PAGE);
        assert_eq!(headword.as_deref(), Some("lupus"));
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].text.starts_with("I.  a wolf"));
    }

    #[test]
    fn parsed_blocks_stay_separate_entries() {
        let adapter =
            DiogenesAdapter::new(Language::Latin, "http://localhost:8888", Duration::from_secs(5));
        let (headword, blocks) = DiogenesAdapter::extract_blocks(LATIN_PAGE);
        let entries = adapter.parse_blocks(&headword.unwrap(), &blocks);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].definitions[0].definition.contains("wolf"));
        assert_eq!(entries[0].source, Source::DiogenesLatin);
    }

    #[test]
    fn greek_wire_term_is_betacode() {
        let adapter =
            DiogenesAdapter::new(Language::Greek, "http://localhost:8888", Duration::from_secs(5));
        let query = crate::normalize::Normalizer::new(true, None)
            .normalize(Language::Greek, "λόγος")
            .unwrap();
        assert_eq!(adapter.wire_term(&query), "lo/gos");
    }

    #[test]
    fn pages_without_selectors_fall_back_to_body_text() {
        let (_, blocks) =
            DiogenesAdapter::extract_blocks("<html><body>plain prose entry</body></html>");
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].text.contains("plain prose"));
    }

    // A full Lewis & Short entry as the upstream actually serves it: the
    // headword, the whitespace-led principal-parts line, and the sense body
    // arrive as separate DOM nodes split by <br>, never as one text node
    // with embedded newlines.
    const LATIN_ENTRY_PAGE: &str = r#"
        <html><body>
        <h2 class="headword">lavo</h2>
        <div class="entry">lavo<br> āvī, ātus, āre<br>LAV-, to wash, bathe: manus manum lavat, Cic. — to wet, moisten: lacrimis vestem, Ov.</div>
        </body></html>
    "#;

    #[test]
    fn entry_text_keeps_line_structure_across_dom_nodes() {
        let (headword, blocks) = DiogenesAdapter::extract_blocks(LATIN_ENTRY_PAGE);
        assert_eq!(headword.as_deref(), Some("lavo"));
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::FullEntry);

        let mut lines = blocks[0].text.lines();
        assert_eq!(lines.next(), Some("lavo"));
        // The principal-parts line must stay its own line AND keep its
        // leading whitespace, or the grammar below cannot see it.
        let parts_line = lines.next().unwrap();
        assert!(parts_line.starts_with(' '), "lost leading whitespace: {parts_line:?}");
        assert!(parts_line.contains("āvī"));
        assert!(lines.next().unwrap().starts_with("LAV-,"));
    }

    #[test]
    fn full_entry_blocks_parse_through_lewis_short() {
        let adapter =
            DiogenesAdapter::new(Language::Latin, "http://localhost:8888", Duration::from_secs(5));
        let (headword, blocks) = DiogenesAdapter::extract_blocks(LATIN_ENTRY_PAGE);
        let entries = adapter.parse_blocks(&headword.unwrap(), &blocks);
        assert_eq!(entries.len(), 1);

        let entry = &entries[0];
        assert_eq!(entry.headword, "lavo");
        assert_eq!(entry.source, Source::DiogenesLatin);
        assert_eq!(
            entry.metadata.get("principal_parts").map(String::as_str),
            Some("āvī, ātus, āre")
        );
        assert_eq!(entry.metadata.get("root").map(String::as_str), Some("LAV"));
        assert_eq!(entry.definitions.len(), 2);
        assert_eq!(entry.definitions[0].definition, "to wash, bathe");
        assert_eq!(entry.definitions[1].definition, "to wet, moisten");
    }
}
