use serde_json::json;
use yamlpatch_parser::{format_error, parse, serialize, ParseError};

#[test]
fn test_compose_file() {
    let source = r#"version: "3.8"
services:
  web:
    image: nginx:1.25
    ports:
      - "8080:80"
    environment:
      - KEY=value
    depends_on: [db]
  db:
    image: postgres:16   # pinned
"#;

    let doc = parse(source).unwrap();
    assert_eq!(
        doc.to_value(),
        json!({
            "version": "3.8",
            "services": {
                "web": {
                    "image": "nginx:1.25",
                    "ports": ["8080:80"],
                    "environment": ["KEY=value"],
                    "depends_on": ["db"]
                },
                "db": {"image": "postgres:16"}
            }
        })
    );
    assert_eq!(serialize(&doc), source);
}

#[test]
fn test_github_workflow() {
    let source = r#"name: CI
on:
  push:
    branches: [main]
jobs:
  test:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - name: Run tests
        run: |
          cargo fmt --check
          cargo test --all
"#;

    let doc = parse(source).unwrap();
    let value = doc.to_value();
    assert_eq!(value["on"]["push"]["branches"], json!(["main"]));
    assert_eq!(
        value["jobs"]["test"]["steps"][1]["run"],
        json!("cargo fmt --check\ncargo test --all\n")
    );
    assert_eq!(serialize(&doc), source);
}

#[test]
fn test_error_report_names_the_file() {
    let source = "a: 1\na: 2\n";
    let error = parse(source).unwrap_err();
    assert!(matches!(error, ParseError::DuplicateKey { ref key, .. } if key == "a"));

    let report = format_error(source, "config.yaml", &error);
    assert!(report.contains("config.yaml"));
}

#[test]
fn test_byte_order_mark_round_trip() {
    let source = "\u{feff}# config\nname: app\n";
    let doc = parse(source).unwrap();
    assert_eq!(doc.to_value(), json!({"name": "app"}));
    assert_eq!(serialize(&doc), source);
}

#[test]
fn test_document_end_marker_only() {
    let doc = parse("...\n").unwrap();
    assert!(doc.root.is_none());
    assert_eq!(serialize(&doc), "...\n");
}

#[test]
fn test_lone_colon_is_a_missing_key() {
    let error = parse(":\n").unwrap_err();
    assert!(matches!(error, ParseError::MissingKey { pos } if pos.line == 1 && pos.column == 1));
    assert!(format_error(":\n", "config.yaml", &error).contains("without a key"));
}
