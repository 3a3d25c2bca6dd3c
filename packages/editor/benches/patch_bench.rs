use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use serde_json::json;
use yamlpatch_common::MemoryStorage;
use yamlpatch_editor::{parse_text, EditSession, PatchPolicy, Patcher, SessionOptions};
use yamlpatch_parser::serialize;

fn openapi_source(paths: usize) -> String {
    let mut source = String::from("openapi: 3.0.3\ninfo:\n  title: Generated API\n  version: '1.0.0'\npaths:\n");
    for i in 0..paths {
        source.push_str(&format!(
            "  /items/{i}:   # generated\n    get:\n      operationId: getItem{i}\n      tags: [items]\n      responses:\n        '200':\n          description: Item {i}\n"
        ));
    }
    source
}

fn patch_single_scalar(c: &mut Criterion) {
    let document = parse_text(&openapi_source(500)).unwrap();
    let old = document.to_value();
    let mut new = old.clone();
    new["info"]["version"] = json!("2.0.0");
    let policy = PatchPolicy::default();

    c.bench_function("patch_single_scalar", |b| {
        b.iter_batched(
            || document.clone(),
            |mut document| {
                Patcher::new(&policy).patch_document(&mut document, black_box(&old), black_box(&new));
                serialize(&document)
            },
            BatchSize::LargeInput,
        )
    });
}

fn patch_many_paths(c: &mut Criterion) {
    let document = parse_text(&openapi_source(500)).unwrap();
    let old = document.to_value();
    let mut new = old.clone();
    for i in (0..500).step_by(10) {
        new["paths"][format!("/items/{i}")]["get"]["tags"] = json!(["items", "hot"]);
    }
    let policy = PatchPolicy::default();

    c.bench_function("patch_many_paths", |b| {
        b.iter_batched(
            || document.clone(),
            |mut document| {
                Patcher::new(&policy).patch_document(&mut document, black_box(&old), black_box(&new));
                serialize(&document)
            },
            BatchSize::LargeInput,
        )
    });
}

fn session_commit(c: &mut Criterion) {
    let source = openapi_source(200);

    c.bench_function("session_commit", |b| {
        b.iter_batched(
            || {
                let storage = MemoryStorage::new().with_file("openapi.yaml", source.as_str());
                EditSession::open(storage, "openapi.yaml", SessionOptions::default()).unwrap()
            },
            |mut session| {
                session
                    .commit(|value| {
                        let mut value = value.clone();
                        value["info"]["title"] = json!("Renamed API");
                        value
                    })
                    .unwrap()
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, patch_single_scalar, patch_many_paths, session_commit);
criterion_main!(benches);
