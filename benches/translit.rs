//! Benchmarks for the transliteration kernel and encoding detector.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use glossarion::detect;
use glossarion::translit::{greek, latin, sanskrit};

fn bench_slp1_devanagari(c: &mut Criterion) {
    c.bench_function("slp1_to_devanagari", |bench| {
        bench.iter(|| black_box(sanskrit::slp1_to_devanagari(black_box("BagavadgItA")).unwrap()))
    });
    c.bench_function("devanagari_to_slp1", |bench| {
        bench.iter(|| black_box(sanskrit::devanagari_to_slp1(black_box("भगवद्गीता")).unwrap()))
    });
}

fn bench_slp1_iast(c: &mut Criterion) {
    c.bench_function("iast_to_slp1", |bench| {
        bench.iter(|| black_box(sanskrit::iast_to_slp1(black_box("saṃskṛta")).unwrap()))
    });
}

fn bench_betacode(c: &mut Criterion) {
    c.bench_function("betacode_to_unicode", |bench| {
        bench.iter(|| black_box(greek::betacode_to_unicode(black_box("*)aqh=nai")).unwrap()))
    });
    c.bench_function("unicode_to_betacode", |bench| {
        bench.iter(|| black_box(greek::unicode_to_betacode(black_box("λόγος")).unwrap()))
    });
}

fn bench_latin_fold(c: &mut Criterion) {
    c.bench_function("fold_macrons", |bench| {
        bench.iter(|| black_box(latin::fold_macrons(black_box("āvī, ātus, āre"))))
    });
}

fn bench_detect(c: &mut Criterion) {
    c.bench_function("detect_mixed", |bench| {
        bench.iter(|| {
            for input in ["agni", "kṛṣṇa", ".agnii", "kfzRa", "lo/gos", "λόγος"] {
                black_box(detect::detect(black_box(input)));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_slp1_devanagari,
    bench_slp1_iast,
    bench_betacode,
    bench_latin_fold,
    bench_detect
);
criterion_main!(benches);
