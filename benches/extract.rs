use criterion::{criterion_group, criterion_main, Criterion};
use std::path::Path;

use patchroll::parser::patch::{extract_record_from_bytes, ExtractOptions};

fn fixture(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read(path).unwrap()
}

fn bench_extract_utf8(c: &mut Criterion) {
    let raw = fixture("utf8.patch");
    let options = ExtractOptions::default();

    c.bench_function("extract_utf8_patch", |b| {
        b.iter(|| extract_record_from_bytes(&raw, &options).unwrap())
    });
}

fn bench_extract_gbk(c: &mut Criterion) {
    let raw = fixture("gbk.patch");
    let options = ExtractOptions::default();

    c.bench_function("extract_gbk_patch", |b| {
        b.iter(|| extract_record_from_bytes(&raw, &options).unwrap())
    });
}

fn bench_to_text(c: &mut Criterion) {
    let raw = fixture("encoded_subject.patch");
    let record = extract_record_from_bytes(&raw, &ExtractOptions::default()).unwrap();

    c.bench_function("record_to_text", |b| b.iter(|| record.to_text()));
}

criterion_group!(benches, bench_extract_utf8, bench_extract_gbk, bench_to_text);
criterion_main!(benches);
