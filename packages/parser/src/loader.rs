//! Value decoding.
//!
//! The value a document encodes comes from yaml-rust2's event parser.
//! Scalars resolve with the core schema, aliases expand to a copy of their
//! anchored value, and mapping keys keep the text they were written with.

use crate::error::{ParseError, ParseResult, Position};
use crate::value::{resolve_plain, resolve_tagged, Map, Value};
use std::collections::HashMap;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser, Tag};
use yaml_rust2::scanner::{Marker, TScalarStyle};

const CORE_SCHEMA: &str = "tag:yaml.org,2002:";

/// Decode the value of a single-document stream. An empty stream is null.
pub fn load(source: &str) -> ParseResult<Value> {
    let mut loader = Loader::new(source);
    let mut parser = Parser::new_from_str(source);
    if let Err(err) = parser.load(&mut loader, false) {
        let mark = err.marker();
        return Err(ParseError::invalid_syntax(
            Position::at_line(source, mark.line(), mark.col()),
            err.info(),
        ));
    }

    match loader.error {
        Some(err) => Err(err),
        None => Ok(loader.root.unwrap_or(Value::Null)),
    }
}

enum Frame {
    Seq {
        items: Vec<Value>,
        anchor: usize,
    },
    Map {
        map: Map<String, Value>,
        anchor: usize,
        /// Key waiting for its value
        key: Option<(String, Marker)>,
    },
}

struct Loader<'s> {
    source: &'s str,
    root: Option<Value>,
    stack: Vec<Frame>,
    anchors: HashMap<usize, Value>,
    error: Option<ParseError>,
}

impl MarkedEventReceiver for Loader<'_> {
    fn on_event(&mut self, event: Event, mark: Marker) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.handle(event, mark) {
            self.error = Some(err);
        }
    }
}

impl<'s> Loader<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            root: None,
            stack: Vec::new(),
            anchors: HashMap::new(),
            error: None,
        }
    }

    fn position(&self, mark: Marker) -> Position {
        Position::at_line(self.source, mark.line(), mark.col())
    }

    fn handle(&mut self, event: Event, mark: Marker) -> ParseResult<()> {
        match event {
            Event::SequenceStart(anchor, _) => {
                self.reject_collection_key(mark)?;
                self.stack.push(Frame::Seq {
                    items: Vec::new(),
                    anchor,
                });
            }
            Event::MappingStart(anchor, _) => {
                self.reject_collection_key(mark)?;
                self.stack.push(Frame::Map {
                    map: Map::new(),
                    anchor,
                    key: None,
                });
            }
            Event::SequenceEnd | Event::MappingEnd => match self.stack.pop() {
                Some(Frame::Seq { items, anchor }) => self.push(Value::Array(items), anchor, mark)?,
                Some(Frame::Map { map, anchor, .. }) => self.push(Value::Object(map), anchor, mark)?,
                None => {}
            },
            Event::Scalar(text, style, anchor, tag) => {
                if self.expects_key() {
                    if anchor > 0 {
                        self.anchors.insert(anchor, Value::String(text.clone()));
                    }
                    self.set_key(text, mark);
                } else {
                    let value = resolve(&text, style, tag.as_ref()).ok_or_else(|| {
                        ParseError::invalid_syntax(
                            self.position(mark),
                            format!("'{}' does not match its tag", text),
                        )
                    })?;
                    self.push(value, anchor, mark)?;
                }
            }
            Event::Alias(id) => {
                let value = self.anchors.get(&id).cloned().ok_or_else(|| {
                    ParseError::invalid_syntax(self.position(mark), "alias to an unknown anchor")
                })?;
                if self.expects_key() {
                    let key = match value {
                        Value::String(text) => text,
                        Value::Object(_) | Value::Array(_) => {
                            return Err(ParseError::unsupported(
                                self.position(mark),
                                "alias to a collection used as a key",
                            ))
                        }
                        other => other.to_string(),
                    };
                    self.set_key(key, mark);
                } else {
                    self.push(value, 0, mark)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn expects_key(&self) -> bool {
        matches!(self.stack.last(), Some(Frame::Map { key: None, .. }))
    }

    fn reject_collection_key(&self, mark: Marker) -> ParseResult<()> {
        if self.expects_key() {
            return Err(ParseError::unsupported(
                self.position(mark),
                "collections used as mapping keys",
            ));
        }
        Ok(())
    }

    fn set_key(&mut self, text: String, mark: Marker) {
        if let Some(Frame::Map { key, .. }) = self.stack.last_mut() {
            *key = Some((text, mark));
        }
    }

    /// Hand a finished value to the enclosing collection
    fn push(&mut self, value: Value, anchor: usize, mark: Marker) -> ParseResult<()> {
        if anchor > 0 {
            self.anchors.insert(anchor, value.clone());
        }

        let source = self.source;
        match self.stack.last_mut() {
            None => self.root = Some(value),
            Some(Frame::Seq { items, .. }) => items.push(value),
            Some(Frame::Map { map, key, .. }) => {
                let Some((key, key_mark)) = key.take() else {
                    return Err(ParseError::invalid_syntax(
                        Position::at_line(source, mark.line(), mark.col()),
                        "value without a key",
                    ));
                };
                if map.contains_key(&key) {
                    return Err(ParseError::DuplicateKey {
                        pos: Position::at_line(source, key_mark.line(), key_mark.col()),
                        key,
                    });
                }
                map.insert(key, value);
            }
        }
        Ok(())
    }
}

/// Quoted and block scalars are strings; plain ones resolve by tag or by
/// the core schema
fn resolve(text: &str, style: TScalarStyle, tag: Option<&Tag>) -> Option<Value> {
    if !matches!(style, TScalarStyle::Plain) {
        return Some(Value::String(text.to_string()));
    }
    match tag {
        Some(tag) if tag.handle == CORE_SCHEMA => resolve_tagged(text, &tag.suffix),
        Some(_) => Some(Value::String(text.to_string())),
        None => Some(resolve_plain(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_resolves_core_schema() {
        let value = load("a: 1\nb: '1'\nc: ~\nd:\ne: [true, 0x1F, 1.5]\n").unwrap();
        assert_eq!(value, json!({"a": 1, "b": "1", "c": null, "d": null, "e": [true, 31, 1.5]}));
    }

    #[test]
    fn test_load_keeps_key_text() {
        let value = load("1: one\n\"two words\": 2\n").unwrap();
        assert_eq!(value, json!({"1": "one", "two words": 2}));
    }

    #[test]
    fn test_load_expands_aliases() {
        let value = load("base: &b\n  k: 1\ncopy: *b\n").unwrap();
        assert_eq!(value, json!({"base": {"k": 1}, "copy": {"k": 1}}));
    }

    #[test]
    fn test_load_tags() {
        let value = load("a: !!str 123\nb: !!float 1\nc: !custom 7\nd: !!int \"5\"\n").unwrap();
        assert_eq!(value, json!({"a": "123", "b": 1.0, "c": "7", "d": "5"}));
        assert!(load("a: !!int abc\n").is_err());
    }

    #[test]
    fn test_load_duplicate_key() {
        let err = load("a: 1\nb: 2\na: 3\n").unwrap_err();
        assert!(matches!(err, ParseError::DuplicateKey { ref key, pos } if key == "a" && pos.line == 3));
    }

    #[test]
    fn test_load_empty_stream() {
        assert_eq!(load("").unwrap(), Value::Null);
        assert_eq!(load("# only a comment\n").unwrap(), Value::Null);
    }
}
