//! # Parsed Text Cache
//!
//! Parsing the committed text is the expensive part of a commit. A session
//! keeps the last parse, keyed by the text it came from, and replaces it on
//! every commit.
//!
//! ```text
//! text ──fingerprint + equality──▶ hit?  ── yes ──▶ cached tree + value
//!                                   └──── no ───▶ parse (or fall back) and store
//! ```

use tracing::{debug, warn};
use serde_json::Map;
use yamlpatch_parser::{parse, Document, ParseResult, Value};

/// CRC32 of a document's text
pub fn fingerprint(text: &str) -> u32 {
    crc32fast::hash(text.as_bytes())
}

/// Parse committed text. A document with no root node is read as an empty
/// mapping so it can grow keys.
pub fn parse_text(text: &str) -> ParseResult<Document> {
    let mut document = parse(text)?;
    if document.root.is_none() {
        document.set_value(Value::Object(Map::new()));
    }
    Ok(document)
}

fn empty_mapping() -> Document {
    let mut document = Document::empty();
    document.set_value(Value::Object(Map::new()));
    document
}

/// A parsed document together with the value it encodes
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub document: Document,
    pub value: Value,
    /// The text did not parse and `document` is the empty fallback
    pub fallback: bool,
}

impl ParsedDocument {
    pub fn new(document: Document) -> Self {
        let value = document.to_value();
        Self {
            document,
            value,
            fallback: false,
        }
    }

    /// Parse `text`, falling back to an empty mapping when it is malformed
    pub fn parse_or_default(text: &str) -> Self {
        match parse_text(text) {
            Ok(document) => Self::new(document),
            Err(err) => {
                warn!(error = %err, "committed text does not parse, using an empty document");
                Self {
                    fallback: true,
                    ..Self::new(empty_mapping())
                }
            }
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    fingerprint: u32,
    text: String,
    parsed: ParsedDocument,
}

/// Single-entry cache of the last parsed text
#[derive(Debug, Default)]
pub struct ParseCache {
    entry: Option<CacheEntry>,
}

impl ParseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parsed form of `text`, parsing only on a miss
    pub fn get(&mut self, text: &str) -> &ParsedDocument {
        let fingerprint = fingerprint(text);
        let hit = matches!(&self.entry, Some(entry) if entry.fingerprint == fingerprint && entry.text == text);

        if hit {
            debug!("parse cache hit");
        } else {
            debug!(bytes = text.len(), "parse cache miss");
            self.entry = None;
        }

        &self
            .entry
            .get_or_insert_with(|| CacheEntry {
                fingerprint,
                text: text.to_string(),
                parsed: ParsedDocument::parse_or_default(text),
            })
            .parsed
    }

    /// Store an already parsed document for `text`
    pub fn insert(&mut self, text: &str, parsed: ParsedDocument) {
        self.entry = Some(CacheEntry {
            fingerprint: fingerprint(text),
            text: text.to_string(),
            parsed,
        });
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }

    pub fn is_cached(&self, text: &str) -> bool {
        matches!(&self.entry, Some(entry) if entry.text == text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cache_hit_and_replace() {
        let mut cache = ParseCache::new();
        assert_eq!(cache.get("a: 1\n").value, json!({"a": 1}));
        assert!(cache.is_cached("a: 1\n"));

        assert_eq!(cache.get("a: 2\n").value, json!({"a": 2}));
        assert!(!cache.is_cached("a: 1\n"));
    }

    #[test]
    fn test_malformed_text_falls_back_to_empty_mapping() {
        let mut cache = ParseCache::new();
        let parsed = cache.get("a: [1, 2\n");
        assert!(parsed.fallback);
        assert_eq!(parsed.value, json!({}));
    }

    #[test]
    fn test_empty_text_is_an_empty_mapping() {
        let parsed = ParsedDocument::parse_or_default("# nothing yet\n");
        assert!(!parsed.fallback);
        assert_eq!(parsed.value, json!({}));
        assert!(parsed.document.root.is_none());
        assert_eq!(parsed.document.source(), "# nothing yet\n");
    }
}
