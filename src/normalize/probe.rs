//! External canonical-lookup probe for bare ASCII Sanskrit.
//!
//! The probe asks a Heritage-style CGI endpoint whether a plain-ASCII token
//! has a known canonical form. The endpoint answers with an HTML index page;
//! a hit appears as an anchor whose href carries a `#H_<word>` fragment and
//! whose text is the Devanagari form. Everything here is best-effort: callers
//! treat any failure as "no enrichment", never as a request failure.

use std::io::Read;

use scraper::{Html, Selector};

use crate::error::NormalizeError;
use crate::translit::sanskrit;

/// Maximum response body size (256 KB). Index pages are small; anything
/// bigger is a misbehaving upstream.
const MAX_RESPONSE_SIZE: u64 = 256 * 1024;

/// HTTP client for the canonical-lookup CGI.
pub struct CanonicalProbe {
    agent: ureq::Agent,
    base_url: String,
    lexicon: String,
}

impl CanonicalProbe {
    /// Build a probe against `base_url` with a bounded connection pool.
    pub fn new(base_url: &str, pool_size: usize, timeout: std::time::Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .max_idle_connections(pool_size)
            .build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            lexicon: "MW".to_string(),
        }
    }

    /// Look up the canonical form of `token` (plain ASCII, sent as Velthuis).
    ///
    /// Returns `Ok(Some(slp1))` on a hit, `Ok(None)` when the upstream
    /// answered but had no matching headword.
    pub fn lookup(&self, token: &str) -> Result<Option<String>, NormalizeError> {
        let response = self
            .agent
            .get(&self.base_url)
            .query("q", token)
            .query("lex", &self.lexicon)
            .query("t", "VH")
            .call()
            .map_err(|e| NormalizeError::ProbeFailed {
                message: e.to_string(),
            })?;

        let body = response
            .into_reader()
            .take(MAX_RESPONSE_SIZE)
            .bytes()
            .collect::<Result<Vec<u8>, _>>()
            .map_err(|e| NormalizeError::ProbeFailed {
                message: format!("failed to read body: {e}"),
            })?;
        let body = String::from_utf8_lossy(&body).into_owned();

        Ok(Self::extract_canonical(&body))
    }

    /// Pull the first headword anchor out of the index page and convert its
    /// Devanagari text to SLP1.
    fn extract_canonical(html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let selector = Selector::parse("a[href]").ok()?;
        for anchor in document.select(&selector) {
            let href = anchor.value().attr("href").unwrap_or("");
            if !href.contains("/skt/") || !href.contains("#H_") {
                continue;
            }
            let text: String = anchor.text().collect::<String>().trim().to_string();
            if text.is_empty() {
                continue;
            }
            match sanskrit::devanagari_to_slp1(&text) {
                Ok(slp1) if !slp1.is_empty() => return Some(slp1),
                _ => continue,
            }
        }
        None
    }
}
