//! Query engine: routing, concurrent fan-out, joining, caching, and fact
//! integration.
//!
//! The engine owns nothing ambient: every shared resource (cache, fact index,
//! CTS index, probe, adapters) arrives inside an explicit [`Wiring`] built at
//! startup. One request runs as: normalize → cache probe → fact-index probe →
//! adapter fan-out on OS threads with a deadline → join/order → enrich →
//! store. Per-adapter failures degrade into the response's error map; only
//! normalization failures and unsupported languages fail the request.

pub mod health;
pub mod response;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crate::adapter::{
    AdapterResponse, DictionaryAdapter, Source, cdsl::CdslAdapter, cltk::CltkAdapter,
    diogenes::DiogenesAdapter, heritage::HeritageAdapter, whitakers::WhitakersAdapter,
};
use crate::cache::{CacheStats, ResponseCache};
use crate::config::Config;
use crate::cts::CtsIndex;
use crate::error::{AdapterErrorKind, GlossarionResult, QueryError};
use crate::fact::{FactIndex, Predicate, transform};
use crate::language::Language;
use crate::normalize::{CanonicalProbe, CanonicalQuery, Normalizer};
use crate::schema::DictionaryEntry;
use crate::translit::Encoding;

use health::{ComponentHealth, ComponentStatus, HealthReport};
use response::{NormalizationInfo, QueryResponse, ResponseError};

/// Fixed source priority per language; the response orders entries by it.
const LATIN_PRIORITY: &[Source] = &[Source::DiogenesLatin, Source::Whitakers, Source::CltkLatin];
const GREEK_PRIORITY: &[Source] = &[Source::DiogenesGreek, Source::CltkGreek];
const SANSKRIT_PRIORITY: &[Source] = &[Source::Cdsl, Source::Heritage];

/// Grace added to the engine-side deadline so an adapter's own timeout fires
/// first and reports with a better message.
const FAN_OUT_GRACE: Duration = Duration::from_millis(250);

fn priority_table(language: Language) -> &'static [Source] {
    match language {
        Language::Latin => LATIN_PRIORITY,
        Language::Greek => GREEK_PRIORITY,
        Language::Sanskrit => SANSKRIT_PRIORITY,
    }
}

fn source_priority(language: Language, source: Source) -> usize {
    priority_table(language)
        .iter()
        .position(|s| *s == source)
        .unwrap_or(usize::MAX)
}

/// Everything the engine needs, wired once at startup. No singletons: tests
/// build a `Wiring` with mock adapters and temp stores.
pub struct Wiring {
    pub config: Config,
    pub normalizer: Normalizer,
    pub cache: Option<ResponseCache>,
    pub facts: Option<FactIndex>,
    pub cts: Option<CtsIndex>,
    pub adapters: Vec<Arc<dyn DictionaryAdapter>>,
}

impl Wiring {
    /// Build the full production wiring from configuration: storage files
    /// under the data dir, one adapter per upstream.
    pub fn open(config: &Config) -> GlossarionResult<Self> {
        let paths = match &config.data_dir {
            Some(root) => crate::paths::GlossarionPaths::rooted_at(root.clone()),
            None => crate::paths::GlossarionPaths::resolve()?,
        };
        paths.ensure_dirs()?;

        let cache = if config.cache_enabled {
            let path = config
                .cache_path
                .clone()
                .unwrap_or_else(|| paths.cache_file());
            match ResponseCache::open(&path) {
                Ok(cache) => Some(cache),
                Err(err) => {
                    tracing::warn!(error = %err, "cache unavailable, running without");
                    None
                }
            }
        } else {
            None
        };

        let facts = if config.fact_index_enabled {
            match FactIndex::open(&paths.facts_file()) {
                Ok(index) => Some(index),
                Err(err) => {
                    tracing::warn!(error = %err, "fact index unavailable, running without");
                    None
                }
            }
        } else {
            None
        };

        let cts = match CtsIndex::open(&paths.cts_file()) {
            Ok(index) => index,
            Err(err) => {
                tracing::warn!(error = %err, "CTS index unreadable, citations stay unresolved");
                None
            }
        };

        let probe = config.canonical_probe_enabled.then(|| {
            CanonicalProbe::new(
                &config.canonical_probe_url,
                config.probe_pool_size,
                config.adapter_timeout(),
            )
        });
        let normalizer = Normalizer::new(config.normalization_enabled, probe);

        let timeout = config.adapter_timeout();
        let adapters: Vec<Arc<dyn DictionaryAdapter>> = vec![
            Arc::new(DiogenesAdapter::new(
                Language::Latin,
                &config.diogenes_url,
                timeout,
            )),
            Arc::new(WhitakersAdapter::new(&config.whitakers_bin, timeout)),
            Arc::new(CltkAdapter::new(Language::Latin)),
            Arc::new(DiogenesAdapter::new(
                Language::Greek,
                &config.diogenes_url,
                timeout,
            )),
            Arc::new(CltkAdapter::new(Language::Greek)),
            Arc::new(CdslAdapter::open(&paths.cdsl_file())),
            Arc::new(HeritageAdapter::new(&config.heritage_url, timeout)),
        ];

        Ok(Self {
            config: config.clone(),
            normalizer,
            cache,
            facts,
            cts,
            adapters,
        })
    }

    /// Assemble a wiring from parts. Tests and embedders use this to swap in
    /// mock adapters or disable stores.
    pub fn assemble(
        config: Config,
        adapters: Vec<Arc<dyn DictionaryAdapter>>,
        cache: Option<ResponseCache>,
        facts: Option<FactIndex>,
        cts: Option<CtsIndex>,
    ) -> Self {
        let probe = config.canonical_probe_enabled.then(|| {
            CanonicalProbe::new(
                &config.canonical_probe_url,
                config.probe_pool_size,
                config.adapter_timeout(),
            )
        });
        let normalizer = Normalizer::new(config.normalization_enabled, probe);
        Self {
            config,
            normalizer,
            cache,
            facts,
            cts,
            adapters,
        }
    }
}

/// The query engine. Construct once, share freely; all methods take `&self`.
pub struct QueryEngine {
    wiring: Wiring,
}

impl QueryEngine {
    pub fn new(wiring: Wiring) -> Self {
        Self { wiring }
    }

    pub fn wiring(&self) -> &Wiring {
        &self.wiring
    }

    /// Route a textual language code, for the CLI and HTTP surfaces.
    pub fn query_code(
        &self,
        language_code: &str,
        term: &str,
        refresh: bool,
    ) -> Result<QueryResponse, QueryError> {
        let language =
            Language::from_code(language_code).ok_or_else(|| QueryError::UnsupportedLanguage {
                language: language_code.to_string(),
            })?;
        self.query(language, term, refresh)
    }

    /// Run one query end to end.
    pub fn query(
        &self,
        language: Language,
        term: &str,
        refresh: bool,
    ) -> Result<QueryResponse, QueryError> {
        let started = Instant::now();
        let canonical = self.wiring.normalizer.normalize(language, term)?;
        tracing::info!(
            language = %language,
            canonical = %canonical.canonical,
            encoding = %canonical.detected_encoding,
            "query normalized"
        );
        let mut response = QueryResponse::new(&canonical);

        if !refresh {
            if let Some(cache) = &self.wiring.cache {
                if let Some(entries) = cache.get(language, &canonical.canonical) {
                    tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, "cache hit");
                    response.entries = entries;
                    response.from_cache = true;
                    return Ok(response);
                }
            }
            if let Some(entries) = self.entries_from_facts(language, &canonical.canonical) {
                response.entries = self.finalize(language, entries, &mut response.violations);
                response.from_facts = true;
                return Ok(response);
            }
        }

        let (mut successes, errors) = self.fan_out(language, &canonical);
        response.errors = errors;

        // Normalization fallback: bare ASCII Sanskrit that found nothing gets
        // one retry with the externally-probed form.
        let mut effective_query = canonical.clone();
        if successes.iter().all(|(_, r)| r.entries.is_empty())
            && language == Language::Sanskrit
            && canonical.detected_encoding == Encoding::AsciiRoman
        {
            if let Some(probed) = self.wiring.normalizer.probe_recover(&canonical.canonical) {
                if probed != canonical.canonical {
                    tracing::info!(from = %canonical.canonical, to = %probed, "retrying with probed form");
                    let mut retry = canonical.clone();
                    retry.canonical = probed;
                    retry.notes.push("engine_retry_with_probed_form".into());
                    let (retry_successes, retry_errors) = self.fan_out(language, &retry);
                    if retry_successes.iter().any(|(_, r)| !r.entries.is_empty()) {
                        successes = retry_successes;
                        response.errors = retry_errors;
                        response.normalization = NormalizationInfo::from(&retry);
                        effective_query = retry;
                    }
                }
            }
        }

        self.write_facts_back(&successes);

        let mut tagged: Vec<(usize, usize, DictionaryEntry)> = Vec::new();
        for (source, adapter_response) in successes {
            let priority = source_priority(language, source);
            for (emitted, entry) in adapter_response.entries.into_iter().enumerate() {
                tagged.push((priority, emitted, entry));
            }
        }
        tagged.sort_by(|a, b| {
            (a.0, a.1, a.2.headword.as_str()).cmp(&(b.0, b.1, b.2.headword.as_str()))
        });
        let entries: Vec<DictionaryEntry> = tagged.into_iter().map(|(_, _, e)| e).collect();

        response.entries = self.finalize(language, entries, &mut response.violations);

        if let Some(cache) = &self.wiring.cache {
            cache.put(language, &effective_query.canonical, &response.entries);
        }
        tracing::info!(
            entries = response.entries.len(),
            errors = response.errors.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "query complete"
        );
        Ok(response)
    }

    /// Lookup-first mode: synthesize a response from stored facts.
    fn entries_from_facts(&self, language: Language, canonical: &str) -> Option<Vec<DictionaryEntry>> {
        let facts = self.wiring.facts.as_ref()?;
        let found = match facts.lookup(
            language,
            canonical,
            &[
                Predicate::HasGloss,
                Predicate::HasMorphology,
                Predicate::HasCitation,
            ],
        ) {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(error = %err, "fact lookup failed, falling through to fan-out");
                return None;
            }
        };
        if found.is_empty() {
            return None;
        }
        tracing::debug!(facts = found.len(), "synthesizing response from fact index");
        let entries = transform::synthesize_entries(canonical, language, &found);
        (!entries.is_empty()).then_some(entries)
    }

    fn adapters_for(&self, language: Language) -> Vec<Arc<dyn DictionaryAdapter>> {
        let table = priority_table(language);
        table
            .iter()
            .filter_map(|source| {
                self.wiring
                    .adapters
                    .iter()
                    .find(|a| a.source() == *source)
                    .cloned()
            })
            .collect()
    }

    /// Fan out to every adapter for the language on its own thread, collect
    /// under a deadline. Late results are discarded with their threads.
    fn fan_out(
        &self,
        language: Language,
        query: &CanonicalQuery,
    ) -> (
        Vec<(Source, AdapterResponse)>,
        BTreeMap<String, ResponseError>,
    ) {
        let adapters = self.adapters_for(language);
        let timeout = self.wiring.config.adapter_timeout();
        let (tx, rx) = mpsc::channel();

        for adapter in &adapters {
            let tx = tx.clone();
            let adapter = Arc::clone(adapter);
            let query = query.clone();
            std::thread::spawn(move || {
                let started = Instant::now();
                let source = adapter.source();
                let result = adapter.query(&query);
                tracing::debug!(
                    source = %source,
                    ok = result.is_ok(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "adapter finished"
                );
                // The receiver may be gone after the deadline; that is fine.
                let _ = tx.send((source, result));
            });
        }
        drop(tx);

        let deadline = Instant::now() + timeout + FAN_OUT_GRACE;
        let mut successes = Vec::new();
        let mut errors = BTreeMap::new();
        let mut received: Vec<Source> = Vec::new();

        while received.len() < adapters.len() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match rx.recv_timeout(remaining) {
                Ok((source, Ok(adapter_response))) => {
                    received.push(source);
                    successes.push((source, adapter_response));
                }
                Ok((source, Err(err))) => {
                    received.push(source);
                    tracing::warn!(source = %source, error = %err, "adapter failed");
                    errors.insert(
                        source.tag().to_string(),
                        ResponseError {
                            kind: err.kind(),
                            message: err.to_string(),
                        },
                    );
                }
                Err(mpsc::RecvTimeoutError::Timeout) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                    break;
                }
            }
        }

        for adapter in &adapters {
            let source = adapter.source();
            if !received.contains(&source) {
                errors.insert(
                    source.tag().to_string(),
                    ResponseError {
                        kind: AdapterErrorKind::Timeout,
                        message: format!("no answer within {} ms", timeout.as_millis()),
                    },
                );
            }
        }
        (successes, errors)
    }

    /// Write extracted facts (and optionally raw payloads) back to the fact
    /// index, one transaction per adapter response.
    fn write_facts_back(&self, successes: &[(Source, AdapterResponse)]) {
        let Some(fact_index) = &self.wiring.facts else {
            return;
        };
        for (source, adapter_response) in successes {
            let Some(raw) = &adapter_response.raw else {
                continue;
            };
            let Some(adapter) = self.wiring.adapters.iter().find(|a| a.source() == *source)
            else {
                continue;
            };
            let mut provenance = adapter_response.provenance.clone();
            let store_raw = self.wiring.config.store_raw_responses;
            if store_raw {
                provenance.raw_ref = Some(provenance.derive_raw_ref());
            }
            let facts = adapter.extract_facts(raw, &provenance);
            if facts.is_empty() {
                continue;
            }
            let raw_bytes = store_raw.then(|| raw.as_bytes());
            if let Err(err) = fact_index.write(&facts, &provenance, raw_bytes) {
                tracing::warn!(source = %source, error = %err, "fact write-back failed");
            } else {
                tracing::debug!(source = %source, facts = facts.len(), "facts written");
            }
        }
    }

    /// Invariant enforcement and CTS enrichment over the joined entry list.
    ///
    /// Malformed entries are dropped (last-chance fallback: keep the rest,
    /// record the violation); duplicate source refs within one source lose
    /// the ref on the later definition.
    fn finalize(
        &self,
        language: Language,
        entries: Vec<DictionaryEntry>,
        violations: &mut Vec<String>,
    ) -> Vec<DictionaryEntry> {
        let _ = language;
        let mut seen_refs: Vec<(Source, String)> = Vec::new();
        let mut kept = Vec::new();

        for mut entry in entries {
            if !entry.is_well_formed() {
                let note = format!(
                    "dropped malformed entry from {} for {:?}: no definitions or citations",
                    entry.source, entry.headword
                );
                tracing::error!(source = %entry.source, headword = %entry.headword, "entry invariant violated");
                violations.push(note);
                continue;
            }

            let mut inherited = false;
            for definition in &mut entry.definitions {
                match &definition.source_ref {
                    Some(source_ref) => {
                        let key = (entry.source, source_ref.clone());
                        if seen_refs.contains(&key) {
                            violations.push(format!(
                                "duplicate source_ref {} within {}",
                                source_ref, entry.source
                            ));
                            definition.source_ref = None;
                            inherited = true;
                        } else {
                            seen_refs.push(key);
                        }
                    }
                    None => inherited = true,
                }
            }
            if inherited {
                let tag = entry.source.tag().to_string();
                entry
                    .metadata
                    .entry("_inherited_from".to_string())
                    .or_insert(tag);
            }

            if let Some(cts) = &self.wiring.cts {
                for citation in &mut entry.citations {
                    if citation.cts_urn.is_some() {
                        continue;
                    }
                    let Some(source_ref) = &citation.source_ref else {
                        continue;
                    };
                    citation.cts_urn = match source_ref.strip_prefix("citation_abbrev:") {
                        Some(abbrev) => cts.resolve(abbrev),
                        None => cts.resolve_reference(source_ref),
                    };
                }
            }

            kept.push(entry);
        }
        kept
    }

    /// The health surface: every wired component with its status.
    pub fn health(&self) -> HealthReport {
        let mut components = Vec::new();

        components.push(ComponentHealth {
            name: "cache".into(),
            status: match &self.wiring.cache {
                Some(cache) => match cache.stats() {
                    Ok(_) => ComponentStatus::Healthy,
                    Err(err) => ComponentStatus::Degraded {
                        detail: err.to_string(),
                    },
                },
                None => ComponentStatus::Unavailable {
                    detail: "disabled".into(),
                },
            },
        });
        components.push(ComponentHealth {
            name: "fact-index".into(),
            status: match &self.wiring.facts {
                Some(_) => ComponentStatus::Healthy,
                None => ComponentStatus::Unavailable {
                    detail: "disabled".into(),
                },
            },
        });
        components.push(ComponentHealth {
            name: "cts-index".into(),
            status: match &self.wiring.cts {
                Some(index) if !index.is_empty() => ComponentStatus::Healthy,
                Some(_) => ComponentStatus::Degraded {
                    detail: "index is empty".into(),
                },
                None => ComponentStatus::Unavailable {
                    detail: "not built".into(),
                },
            },
        });
        for adapter in &self.wiring.adapters {
            components.push(ComponentHealth {
                name: adapter.source().tag().to_string(),
                status: adapter.probe(),
            });
        }
        HealthReport { components }
    }

    /// Cache statistics, empty when the cache is disabled.
    pub fn cache_stats(&self) -> CacheStats {
        match &self.wiring.cache {
            Some(cache) => cache.stats().unwrap_or_else(|err| {
                tracing::warn!(error = %err, "cache stats failed");
                CacheStats {
                    total_entries: 0,
                    total_bytes: 0,
                    by_language: Vec::new(),
                }
            }),
            None => CacheStats {
                total_entries: 0,
                total_bytes: 0,
                by_language: Vec::new(),
            },
        }
    }

    /// Clear cached rows, for one language or all of them. Returns deleted
    /// row count.
    pub fn cache_clear(&self, language: Option<Language>) -> u64 {
        let Some(cache) = &self.wiring.cache else {
            return 0;
        };
        let languages: Vec<Language> = match language {
            Some(language) => vec![language],
            None => Language::all().to_vec(),
        };
        languages
            .into_iter()
            .map(|language| cache.clear_by_language(language).unwrap_or(0))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdapterError;
    use crate::fact::{Fact, ProvenanceRecord};
    use crate::schema::DictionaryDefinition;

    /// Test adapter answering with fixed entries (or a fixed error).
    struct FixedAdapter {
        source: Source,
        entries: Vec<DictionaryEntry>,
        fail: bool,
    }

    impl FixedAdapter {
        fn entry(source: Source, language: Language, headword: &str, gloss: &str) -> DictionaryEntry {
            DictionaryEntry {
                source,
                headword: headword.into(),
                language,
                definitions: vec![DictionaryDefinition::new(gloss)],
                citations: Vec::new(),
                morphology: None,
                metadata: Default::default(),
            }
        }

        fn ok(source: Source, entries: Vec<DictionaryEntry>) -> Arc<dyn DictionaryAdapter> {
            Arc::new(Self {
                source,
                entries,
                fail: false,
            })
        }

        fn failing(source: Source) -> Arc<dyn DictionaryAdapter> {
            Arc::new(Self {
                source,
                entries: Vec::new(),
                fail: true,
            })
        }
    }

    impl DictionaryAdapter for FixedAdapter {
        fn source(&self) -> Source {
            self.source
        }

        fn query(&self, query: &CanonicalQuery) -> Result<AdapterResponse, AdapterError> {
            if self.fail {
                return Err(AdapterError::Transport {
                    source_tag: self.source,
                    message: "connection refused".into(),
                });
            }
            Ok(AdapterResponse {
                entries: self.entries.clone(),
                raw: None,
                provenance: ProvenanceRecord::new(self.source, &query.canonical),
            })
        }

        fn extract_facts(&self, _raw: &str, _provenance: &ProvenanceRecord) -> Vec<Fact> {
            Vec::new()
        }
    }

    fn test_config() -> Config {
        Config {
            cache_enabled: false,
            canonical_probe_enabled: false,
            adapter_timeout_ms: 1_000,
            ..Config::default()
        }
    }

    fn engine_with(adapters: Vec<Arc<dyn DictionaryAdapter>>) -> QueryEngine {
        QueryEngine::new(Wiring::assemble(test_config(), adapters, None, None, None))
    }

    #[test]
    fn entries_order_by_source_priority() {
        let engine = engine_with(vec![
            // Registered out of priority order on purpose.
            FixedAdapter::ok(
                Source::CltkLatin,
                vec![FixedAdapter::entry(
                    Source::CltkLatin,
                    Language::Latin,
                    "lupus",
                    "wolf (cltk)",
                )],
            ),
            FixedAdapter::ok(
                Source::DiogenesLatin,
                vec![FixedAdapter::entry(
                    Source::DiogenesLatin,
                    Language::Latin,
                    "lupus",
                    "wolf (diogenes)",
                )],
            ),
            FixedAdapter::ok(
                Source::Whitakers,
                vec![FixedAdapter::entry(
                    Source::Whitakers,
                    Language::Latin,
                    "lupus",
                    "wolf (whitakers)",
                )],
            ),
        ]);
        let response = engine.query(Language::Latin, "lupus", false).unwrap();
        let sources: Vec<Source> = response.entries.iter().map(|e| e.source).collect();
        assert_eq!(
            sources,
            vec![Source::DiogenesLatin, Source::Whitakers, Source::CltkLatin]
        );
    }

    #[test]
    fn one_failing_adapter_does_not_abort() {
        let engine = engine_with(vec![
            FixedAdapter::failing(Source::DiogenesLatin),
            FixedAdapter::ok(
                Source::Whitakers,
                vec![FixedAdapter::entry(
                    Source::Whitakers,
                    Language::Latin,
                    "lupus",
                    "wolf",
                )],
            ),
        ]);
        let response = engine.query(Language::Latin, "lupus", false).unwrap();
        assert_eq!(response.entries.len(), 1);
        let error = response.errors.get("diogenes-latin").unwrap();
        assert_eq!(error.kind, AdapterErrorKind::Transport);
    }

    #[test]
    fn all_adapters_failing_yields_empty_entries_and_errors() {
        let engine = engine_with(vec![
            FixedAdapter::failing(Source::DiogenesLatin),
            FixedAdapter::failing(Source::Whitakers),
        ]);
        let response = engine.query(Language::Latin, "lupus", false).unwrap();
        assert!(response.entries.is_empty());
        assert_eq!(response.errors.len(), 2);
        assert_eq!(response.normalization.canonical, "lupus");
    }

    #[test]
    fn empty_input_fails_before_fan_out() {
        let engine = engine_with(vec![FixedAdapter::failing(Source::DiogenesLatin)]);
        let err = engine.query(Language::Latin, "   ", false).unwrap_err();
        assert!(matches!(err, QueryError::Normalization(_)));
    }

    #[test]
    fn unsupported_language_code_fails() {
        let engine = engine_with(vec![]);
        let err = engine.query_code("xx", "word", false).unwrap_err();
        assert!(matches!(err, QueryError::UnsupportedLanguage { .. }));
    }

    #[test]
    fn malformed_entries_are_dropped_and_recorded() {
        let malformed = DictionaryEntry {
            source: Source::DiogenesLatin,
            headword: "lupus".into(),
            language: Language::Latin,
            definitions: Vec::new(),
            citations: Vec::new(),
            morphology: None,
            metadata: Default::default(),
        };
        let engine = engine_with(vec![FixedAdapter::ok(
            Source::DiogenesLatin,
            vec![
                malformed,
                FixedAdapter::entry(Source::DiogenesLatin, Language::Latin, "lupus", "wolf"),
            ],
        )]);
        let response = engine.query(Language::Latin, "lupus", false).unwrap();
        assert_eq!(response.entries.len(), 1);
        assert_eq!(response.violations.len(), 1);
    }

    #[test]
    fn duplicate_source_refs_lose_the_later_ref() {
        let mut first =
            FixedAdapter::entry(Source::DiogenesLatin, Language::Latin, "lupus", "wolf");
        first.definitions[0].source_ref = Some("ls:123".into());
        let mut second =
            FixedAdapter::entry(Source::DiogenesLatin, Language::Latin, "lupus", "wolf again");
        second.definitions[0].source_ref = Some("ls:123".into());

        let engine = engine_with(vec![FixedAdapter::ok(
            Source::DiogenesLatin,
            vec![first, second],
        )]);
        let response = engine.query(Language::Latin, "lupus", false).unwrap();
        let refs: Vec<Option<&str>> = response
            .entries
            .iter()
            .map(|e| e.definitions[0].source_ref.as_deref())
            .collect();
        assert_eq!(refs, vec![Some("ls:123"), None]);
        assert!(!response.violations.is_empty());
    }

    #[test]
    fn routing_skips_other_language_adapters() {
        let engine = engine_with(vec![
            FixedAdapter::ok(
                Source::Cdsl,
                vec![FixedAdapter::entry(
                    Source::Cdsl,
                    Language::Sanskrit,
                    "agni",
                    "fire",
                )],
            ),
            FixedAdapter::ok(
                Source::DiogenesLatin,
                vec![FixedAdapter::entry(
                    Source::DiogenesLatin,
                    Language::Latin,
                    "agni",
                    "should not appear",
                )],
            ),
        ]);
        let response = engine.query(Language::Sanskrit, "agni", false).unwrap();
        assert_eq!(response.entries.len(), 1);
        assert_eq!(response.entries[0].source, Source::Cdsl);
    }
}
