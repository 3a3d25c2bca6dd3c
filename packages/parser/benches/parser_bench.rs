use criterion::{black_box, criterion_group, criterion_main, Criterion};
use yamlpatch_parser::{parse, serialize};

fn openapi_source(paths: usize) -> String {
    let mut source = String::from(
        "openapi: 3.0.3\ninfo:\n  title: Generated API   # bench\n  version: '1.0.0'\npaths:\n",
    );
    for i in 0..paths {
        source.push_str(&format!(
            "  /items/{i}:\n    get:\n      operationId: getItem{i}\n      tags: [items, generated]\n      parameters:\n        - name: id\n          in: path\n          required: true\n      responses:\n        '200':\n          description: |\n            Item {i}\n            details\n"
        ));
    }
    source
}

fn parse_small_document(c: &mut Criterion) {
    let source = openapi_source(5);

    c.bench_function("parse_small_document", |b| b.iter(|| parse(black_box(&source))));
}

fn parse_large_document(c: &mut Criterion) {
    let source = openapi_source(500);

    c.bench_function("parse_large_document", |b| b.iter(|| parse(black_box(&source))));
}

fn serialize_clean_document(c: &mut Criterion) {
    let doc = parse(&openapi_source(500)).unwrap();

    c.bench_function("serialize_clean_document", |b| b.iter(|| serialize(black_box(&doc))));
}

fn decode_value(c: &mut Criterion) {
    let doc = parse(&openapi_source(500)).unwrap();

    c.bench_function("decode_value", |b| b.iter(|| black_box(&doc).to_value()));
}

criterion_group!(
    benches,
    parse_small_document,
    parse_large_document,
    serialize_clean_document,
    decode_value
);
criterion_main!(benches);
