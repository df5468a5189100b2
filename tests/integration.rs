//! End-to-end integration tests for the glossarion query pipeline.
//!
//! These drive the engine through the public API with mock adapters layered
//! over the real parsers, covering the concrete lookup scenarios: Latin
//! `lupus`, Greek `λόγος`, Sanskrit `agni` and its Velthuis wire form, empty
//! input, and the cached repeat.

mod common;

use std::sync::Arc;

use glossarion::adapter::{DictionaryAdapter, Source};
use glossarion::cache::ResponseCache;
use glossarion::engine::{QueryEngine, Wiring};
use glossarion::error::{AdapterErrorKind, QueryError};
use glossarion::language::Language;
use glossarion::translit::Encoding;

use common::{BlockAdapter, FailingAdapter, MorphAdapter, SlowAdapter, offline_config};

fn latin_adapters() -> Vec<Arc<dyn DictionaryAdapter>> {
    vec![
        BlockAdapter::new(
            Source::DiogenesLatin,
            Language::Latin,
            &["I.  a wolf; qui amant ipsi sibi somnia fingunt, Verg. E. 2, 63"],
        ),
        MorphAdapter::new(
            Source::Whitakers,
            Language::Latin,
            "lupus",
            "noun",
            &["wolf", "grey wolf"],
        ),
        Arc::new(glossarion::adapter::cltk::CltkAdapter::new(Language::Latin)),
    ]
}

#[test]
fn latin_lupus_end_to_end() {
    let engine = QueryEngine::new(Wiring::assemble(
        offline_config(),
        latin_adapters(),
        None,
        None,
        None,
    ));
    let response = engine.query(Language::Latin, "lupus", false).unwrap();

    assert_eq!(response.normalization.canonical, "lupus");
    assert_eq!(response.normalization.detected_encoding, Encoding::AsciiRoman);

    let diogenes = response
        .entries
        .iter()
        .find(|e| e.source == Source::DiogenesLatin)
        .expect("diogenes entry present");
    assert!(
        diogenes
            .definitions
            .iter()
            .any(|d| d.definition.contains("wolf"))
    );

    let whitakers = response
        .entries
        .iter()
        .find(|e| e.source == Source::Whitakers)
        .expect("whitakers entry present");
    let morph = whitakers.morphology.as_ref().expect("morphology present");
    assert_eq!(morph.pos, "noun");

    // Source ordering: Diogenes before Whitaker's before CLTK.
    let order: Vec<Source> = response.entries.iter().map(|e| e.source).collect();
    let diogenes_pos = order.iter().position(|s| *s == Source::DiogenesLatin).unwrap();
    let whitakers_pos = order.iter().position(|s| *s == Source::Whitakers).unwrap();
    assert!(diogenes_pos < whitakers_pos);
    if let Some(cltk_pos) = order.iter().position(|s| *s == Source::CltkLatin) {
        assert!(whitakers_pos < cltk_pos);
    }
}

#[test]
fn greek_logos_end_to_end() {
    let engine = QueryEngine::new(Wiring::assemble(
        offline_config(),
        vec![
            BlockAdapter::new(
                Source::DiogenesGreek,
                Language::Greek,
                &["1.  account, reckoning; ἐν λόγῳ εἶναι; IG 1(2).374.191"],
            ),
            Arc::new(glossarion::adapter::cltk::CltkAdapter::new(Language::Greek)),
        ],
        None,
        None,
        None,
    ));
    let response = engine.query(Language::Greek, "λόγος", false).unwrap();

    assert_eq!(response.normalization.detected_encoding, Encoding::Unicode);
    assert_eq!(response.normalization.canonical, "λόγος");

    let diogenes = response
        .entries
        .iter()
        .find(|e| e.source == Source::DiogenesGreek)
        .expect("diogenes-greek entry present");
    assert!(
        diogenes
            .definitions
            .iter()
            .any(|d| d.definition.contains("account"))
    );

    // The Betacode alternate is generated during normalization.
    // (The normalization info only echoes notes; re-run the normalizer.)
    let normalizer = glossarion::normalize::Normalizer::new(true, None);
    let canonical = normalizer.normalize(Language::Greek, "λόγος").unwrap();
    assert!(canonical.alternates.contains(&"lo/gos".to_string()));
}

#[test]
fn sanskrit_agni_end_to_end() {
    let engine = QueryEngine::new(Wiring::assemble(
        offline_config(),
        vec![
            BlockAdapter::new(
                Source::Cdsl,
                Language::Sanskrit,
                &["agni/ m. (√ ag, Uṇ.) fire, sacrificial fire, RV."],
            ),
            BlockAdapter::new(
                Source::Heritage,
                Language::Sanskrit,
                &["[ agni ]{ m. sg. nom. | m. sg. voc. }"],
            ),
        ],
        None,
        None,
        None,
    ));
    let response = engine.query(Language::Sanskrit, "agni", false).unwrap();

    // Bare lowercase ASCII with no scheme markers; fast path keeps it as-is.
    assert_eq!(response.normalization.detected_encoding, Encoding::AsciiRoman);
    assert_eq!(response.normalization.canonical, "agni");
    assert!(response.normalization.confidence >= 0.5);

    let cdsl = response
        .entries
        .iter()
        .find(|e| e.source == Source::Cdsl)
        .expect("cdsl entry present");
    assert!(cdsl.definitions.iter().any(|d| d.definition.contains("fire")));

    let heritage = response
        .entries
        .iter()
        .find(|e| e.source == Source::Heritage)
        .expect("heritage entry present");
    assert!(heritage.morphology.is_some());

    // CDSL orders before Heritage.
    let cdsl_pos = response
        .entries
        .iter()
        .position(|e| e.source == Source::Cdsl)
        .unwrap();
    let heritage_pos = response
        .entries
        .iter()
        .position(|e| e.source == Source::Heritage)
        .unwrap();
    assert!(cdsl_pos < heritage_pos);
}

#[test]
fn sanskrit_velthuis_wire_form() {
    let engine = QueryEngine::new(Wiring::assemble(
        offline_config(),
        vec![BlockAdapter::new(
            Source::Heritage,
            Language::Sanskrit,
            &["[ agni ]{ m. sg. nom. }"],
        )],
        None,
        None,
        None,
    ));
    let response = engine.query(Language::Sanskrit, ".agnii", false).unwrap();

    assert_eq!(response.normalization.detected_encoding, Encoding::Velthuis);
    assert_eq!(response.normalization.canonical, "agni");
    assert!(
        response
            .entries
            .iter()
            .any(|e| e.source == Source::Heritage && e.morphology.is_some())
    );

    // The original Velthuis spelling stays available as an alternate.
    let normalizer = glossarion::normalize::Normalizer::new(true, None);
    let canonical = normalizer.normalize(Language::Sanskrit, ".agnii").unwrap();
    assert!(canonical.alternates.contains(&".agnii".to_string()));
}

#[test]
fn empty_input_never_reaches_adapters() {
    let engine = QueryEngine::new(Wiring::assemble(
        offline_config(),
        vec![Arc::new(FailingAdapter(Source::DiogenesLatin))],
        None,
        None,
        None,
    ));
    let err = engine.query(Language::Latin, "", false).unwrap_err();
    // A normalization failure, with no error map because fan-out never ran.
    assert!(matches!(err, QueryError::Normalization(_)));
}

#[test]
fn cached_repeat_is_identical_and_flagged() {
    let dir = tempfile::TempDir::new().unwrap();
    let cache = ResponseCache::open(&dir.path().join("cache.redb")).unwrap();
    let mut config = offline_config();
    config.cache_enabled = true;

    let engine = QueryEngine::new(Wiring::assemble(
        config,
        latin_adapters(),
        Some(cache),
        None,
        None,
    ));

    let first = engine.query(Language::Latin, "lupus", false).unwrap();
    assert!(!first.from_cache);

    let second = engine.query(Language::Latin, "lupus", false).unwrap();
    assert!(second.from_cache);

    // Byte-for-byte equivalent serialization of the entry lists.
    let first_bytes = serde_json::to_vec(&first.entries).unwrap();
    let second_bytes = serde_json::to_vec(&second.entries).unwrap();
    assert_eq!(first_bytes, second_bytes);
}

#[test]
fn timeouts_are_reported_per_adapter() {
    let mut config = offline_config();
    config.adapter_timeout_ms = 100;
    let engine = QueryEngine::new(Wiring::assemble(
        config,
        vec![
            Arc::new(SlowAdapter {
                source: Source::DiogenesLatin,
                delay: std::time::Duration::from_secs(5),
            }),
            Arc::new(SlowAdapter {
                source: Source::Whitakers,
                delay: std::time::Duration::from_secs(5),
            }),
        ],
        None,
        None,
        None,
    ));
    let response = engine.query(Language::Latin, "lupus", false).unwrap();
    assert!(response.entries.is_empty());
    assert_eq!(response.errors.len(), 2);
    assert!(
        response
            .errors
            .values()
            .all(|e| e.kind == AdapterErrorKind::Timeout)
    );
}

#[test]
fn citations_resolve_against_a_built_cts_index() {
    use std::io::Write;

    let dir = tempfile::TempDir::new().unwrap();
    let csv = dir.path().join("canonical.csv");
    let mut file = std::fs::File::create(&csv).unwrap();
    writeln!(file, "author_id,author_name,cts_namespace,title,abbrevs,cts_urn").unwrap();
    writeln!(
        file,
        "690,Vergil,latinLit,Eclogues,Verg. E.,urn:cts:latinLit:phi0690.phi001"
    )
    .unwrap();
    let cts_path = dir.path().join("cts.redb");
    glossarion::cts::build::build_index(&csv, None, &cts_path).unwrap();
    let cts = glossarion::cts::CtsIndex::open(&cts_path).unwrap();

    let engine = QueryEngine::new(Wiring::assemble(
        offline_config(),
        vec![BlockAdapter::new(
            Source::DiogenesLatin,
            Language::Latin,
            &["I.  a wolf; qui amant ipsi sibi somnia fingunt, Verg. E. 2, 63"],
        )],
        None,
        None,
        cts,
    ));
    let response = engine.query(Language::Latin, "lupus", false).unwrap();
    let citation = response
        .entries
        .iter()
        .flat_map(|e| &e.citations)
        .next()
        .expect("citation present");
    assert_eq!(
        citation.cts_urn.as_deref(),
        Some("urn:cts:latinLit:phi0690.phi001:2.63")
    );
}

#[test]
fn absent_cts_index_leaves_urns_null() {
    let engine = QueryEngine::new(Wiring::assemble(
        offline_config(),
        vec![BlockAdapter::new(
            Source::DiogenesLatin,
            Language::Latin,
            &["I.  a wolf; luporum more, Cic. Off. 1, 2"],
        )],
        None,
        None,
        None,
    ));
    let response = engine.query(Language::Latin, "lupus", false).unwrap();
    assert!(
        response
            .entries
            .iter()
            .flat_map(|e| &e.citations)
            .all(|c| c.cts_urn.is_none())
    );
}
