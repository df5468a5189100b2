//! Heritage adapter: Sanskrit morphology over the Heritage CGI.
//!
//! The wire format is idiosyncratic: parameters are semicolon-separated in a
//! fixed order (`t;lex;font;cache;st;us;text`), the text travels as Velthuis,
//! and a long vowel in final position must be doubled. The response is an
//! HTML table; each row is re-serialized into the synthetic
//! `[ headword ]{ codes }` block the Heritage grammar parses, and the row's
//! background color rides along as tool-specific metadata only.

use std::io::Read;
use std::time::Duration;

use scraper::{Html, Selector};

use crate::adapter::{
    AdapterResponse, DictionaryAdapter, Source, parsed_to_entry, parsed_to_facts,
};
use crate::engine::health::ComponentStatus;
use crate::error::AdapterError;
use crate::fact::{Fact, ProvenanceRecord};
use crate::normalize::CanonicalQuery;
use crate::parse::heritage;
use crate::translit::sanskrit;

const MAX_RESPONSE_SIZE: u64 = 512 * 1024;

pub struct HeritageAdapter {
    base_url: String,
    agent: ureq::Agent,
}

impl HeritageAdapter {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    /// The Velthuis wire form of an SLP1 canonical, final long vowel doubled.
    fn wire_text(canonical: &str) -> String {
        match sanskrit::slp1_to_velthuis(canonical) {
            Ok(velthuis) => velthuis,
            Err(_) => canonical.to_string(),
        }
    }

    fn request_url(&self, text: &str) -> String {
        // Parameter order is fixed; the CGI rejects reordered queries.
        format!(
            "{}?t=VH;lex=MW;font=roma;cache=f;st=t;us=f;text={}",
            self.base_url, text
        )
    }

    fn fetch(&self, url: &str) -> Result<String, AdapterError> {
        let source_tag = Source::Heritage;
        let response = self.agent.get(url).call().map_err(|e| match e {
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
        Ok(body)
    }

    /// Re-serialize each result row into a synthetic block plus its cell
    /// color. Rows are `<tr><th>headword</th><td bgcolor=...>codes</td></tr>`;
    /// alternative analyses within a cell separate on `|`.
    fn extract_blocks(html: &str) -> Vec<(String, Option<String>)> {
        let document = Html::parse_document(html);
        let mut blocks = Vec::new();

        let Ok(row_selector) = Selector::parse("tr") else {
            return blocks;
        };
        let th = Selector::parse("th").ok();
        let td = Selector::parse("td").ok();
        for row in document.select(&row_selector) {
            let Some(th_sel) = &th else { continue };
            let Some(td_sel) = &td else { continue };
            let Some(head_el) = row.select(th_sel).next() else {
                continue;
            };
            let Some(cell_el) = row.select(td_sel).next() else {
                continue;
            };
            let headword = head_el.text().collect::<String>().trim().to_string();
            let codes = cell_el.text().collect::<String>().trim().to_string();
            if headword.is_empty() || codes.is_empty() {
                continue;
            }
            let color = cell_el
                .value()
                .attr("bgcolor")
                .map(str::to_string)
                .or_else(|| {
                    cell_el.value().attr("style").and_then(|style| {
                        style
                            .split(';')
                            .find_map(|rule| rule.trim().strip_prefix("background:"))
                            .map(|c| c.trim().to_string())
                    })
                });
            blocks.push((format!("[ {headword} ]{{ {codes} }}"), color));
        }

        // Some deployments answer with preformatted blocks instead of a table.
        if blocks.is_empty() {
            for line in html.lines() {
                let line = line.trim();
                if line.starts_with('[') && line.contains("]{") && line.ends_with('}') {
                    blocks.push((line.to_string(), None));
                }
            }
        }
        blocks
    }

    fn entries_from_html(html: &str) -> Vec<crate::schema::DictionaryEntry> {
        let mut entries = Vec::new();
        for (block, color) in Self::extract_blocks(html) {
            for mut parsed in heritage::parse(&block) {
                if let Some(color) = &color {
                    parsed
                        .tool_specific
                        .insert("color".to_string(), color.clone());
                }
                entries.push(parsed_to_entry(&parsed));
            }
        }
        entries
    }
}

impl DictionaryAdapter for HeritageAdapter {
    fn source(&self) -> Source {
        Source::Heritage
    }

    fn query(&self, query: &CanonicalQuery) -> Result<AdapterResponse, AdapterError> {
        let text = Self::wire_text(&query.canonical);
        let url = self.request_url(&text);
        let body = self.fetch(&url)?;
        let entries = Self::entries_from_html(&body);
        tracing::debug!(
            text = %text,
            entries = entries.len(),
            "heritage response parsed"
        );
        let provenance = ProvenanceRecord::new(Source::Heritage, &text).with_request_url(url);
        Ok(AdapterResponse {
            entries,
            raw: Some(body),
            provenance,
        })
    }

    fn extract_facts(&self, raw: &str, provenance: &ProvenanceRecord) -> Vec<Fact> {
        let mut ordinal = 0;
        let mut facts = Vec::new();
        for (block, color) in Self::extract_blocks(raw) {
            for mut parsed in heritage::parse(&block) {
                if let Some(color) = &color {
                    parsed
                        .tool_specific
                        .insert("color".to_string(), color.clone());
                }
                facts.extend(parsed_to_facts(&parsed, provenance, &mut ordinal));
            }
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

    const TABLE_PAGE: &str = r#"
        <html><body><table>
        <tr><th>agni</th><td bgcolor="lightblue">m. sg. nom. | m. sg. voc.</td></tr>
        <tr><th>agni</th><td>iic.</td></tr>
        </table></body></html>
    "#;

    #[test]
    fn wire_text_doubles_final_long_vowel() {
        assert_eq!(HeritageAdapter::wire_text("agnI"), "agnii");
        assert_eq!(HeritageAdapter::wire_text("agni"), "agni");
        assert_eq!(HeritageAdapter::wire_text("devA"), "devaa");
    }

    #[test]
    fn request_url_uses_fixed_parameter_order() {
        let adapter = HeritageAdapter::new("http://localhost:8080/cgi-bin/sktreader", Duration::from_secs(5));
        let url = adapter.request_url("agni");
        assert!(url.ends_with("?t=VH;lex=MW;font=roma;cache=f;st=t;us=f;text=agni"));
    }

    #[test]
    fn table_rows_become_synthetic_blocks_with_color() {
        let blocks = HeritageAdapter::extract_blocks(TABLE_PAGE);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].0, "[ agni ]{ m. sg. nom. | m. sg. voc. }");
        assert_eq!(blocks[0].1.as_deref(), Some("lightblue"));
        assert_eq!(blocks[1].1, None);
    }

    #[test]
    fn entries_carry_morphology_and_color_metadata() {
        let entries = HeritageAdapter::entries_from_html(TABLE_PAGE);
        // Two analyses from row one, one from row two.
        assert_eq!(entries.len(), 3);
        assert!(entries[0].morphology.is_some());
        assert_eq!(
            entries[0].metadata.get("color").map(String::as_str),
            Some("lightblue")
        );
        // Color never enters the universal morphology features.
        assert!(!entries[0]
            .morphology
            .as_ref()
            .unwrap()
            .features
            .contains_key("color"));
    }

    #[test]
    fn preformatted_fallback_blocks() {
        let raw = "[ bhavati ]{ 3 sg. pr. ac. ind. }\n";
        let blocks = HeritageAdapter::extract_blocks(raw);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].0, "[ bhavati ]{ 3 sg. pr. ac. ind. }");
    }
}
