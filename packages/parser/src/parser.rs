//! # Parser
//!
//! Reads YAML text into a [`Document`] in three passes:
//!
//! 1. tree-sitter-yaml builds the concrete syntax tree. Its byte ranges
//!    become the spans of the document tree.
//! 2. yaml-rust2 decodes the value the text encodes (see [`crate::loader`]).
//! 3. Mapping keys from the value are attached to the entries they belong to.
//!
//! A leading byte order mark is not part of the source; the document only
//! remembers that it was there.

use crate::ast::*;
use crate::error::{ParseError, ParseResult, Position};
use crate::loader;
use crate::value::Value;
use std::collections::HashSet;
use tree_sitter::Node as TsNode;

const BOM: char = '\u{feff}';

/// Parse YAML text into a span-annotated document
pub fn parse(text: &str) -> ParseResult<Document> {
    Parser::new(text).parse()
}

pub struct Parser<'s> {
    /// Text as given, byte order mark included
    text: &'s str,
    source: &'s str,
    anchors: HashSet<String>,
}

impl<'s> Parser<'s> {
    pub fn new(text: &'s str) -> Self {
        Self {
            text,
            source: text.strip_prefix(BOM).unwrap_or(text),
            anchors: HashSet::new(),
        }
    }

    fn bom_len(&self) -> usize {
        self.text.len() - self.source.len()
    }

    /// Position of a source offset within the text as given
    fn position(&self, offset: usize) -> Position {
        Position::in_text(self.text, offset + self.bom_len())
    }

    fn relocate(&self, err: ParseError) -> ParseError {
        err.map_position(|pos| self.position(pos.offset))
    }

    pub fn parse(mut self) -> ParseResult<Document> {
        let mut ts = tree_sitter::Parser::new();
        ts.set_language(&tree_sitter_yaml::LANGUAGE.into())
            .map_err(|err| ParseError::unsupported(self.position(0), err.to_string()))?;
        let tree = ts
            .parse(self.source, None)
            .ok_or_else(|| ParseError::invalid_syntax(self.position(0), "parser gave up"))?;

        let stream = tree.root_node();
        if stream.has_error() {
            return Err(self.syntax_error(stream));
        }

        let documents: Vec<TsNode> = children(stream)
            .into_iter()
            .filter(|child| child.kind() == "document")
            .collect();
        if let Some(second) = documents.get(1) {
            return Err(ParseError::unsupported(
                self.position(second.start_byte()),
                "more than one document in a stream",
            ));
        }

        let content = documents
            .first()
            .and_then(|document| children(*document).into_iter().find(|child| is_node(*child)));
        let mut root = match content {
            Some(node) => Some(self.node(node)?),
            None => None,
        };

        let value = loader::load(self.source).map_err(|err| self.relocate(err))?;
        match &mut root {
            Some(node) => self.attach(node, &value)?,
            None if !value.is_null() => {
                return Err(ParseError::unsupported(self.position(0), "value without a node"));
            }
            None => {}
        }

        let bom = self.bom_len() > 0;
        let mut document = Document::new(self.source.to_string(), bom, root, value);
        if let Some(step) = document.root.as_ref().and_then(|root| detect_indent(self.source, root)) {
            document.indent_step = step;
        }
        Ok(document)
    }

    /// Report the first problem in a tree that did not parse cleanly,
    /// preferring yaml-rust2's wording when it also rejects the text
    fn syntax_error(&self, stream: TsNode) -> ParseError {
        if let Err(err) = loader::load(self.source) {
            return self.relocate(err);
        }

        let Some(bad) = first_error(stream) else {
            return ParseError::invalid_syntax(self.position(stream.start_byte()), "invalid YAML");
        };
        let message = if bad.is_missing() {
            format!("missing `{}`", bad.kind())
        } else {
            let text = self.source[bad.start_byte()..bad.end_byte()]
                .lines()
                .next()
                .unwrap_or_default()
                .trim();
            format!("unexpected `{}`", text)
        };
        ParseError::invalid_syntax(self.position(bad.start_byte()), message)
    }

    fn span(&self, node: TsNode) -> Span {
        Span::new(node.start_byte(), node.end_byte())
    }

    /// Span of `node` without trailing whitespace and line breaks
    fn trimmed(&self, node: TsNode) -> Span {
        let start = node.start_byte();
        let text = &self.source[start..node.end_byte()];
        Span::new(start, start + text.trim_end_matches([' ', '\t', '\r', '\n']).len())
    }

    fn text(&self, node: TsNode) -> &'s str {
        &self.source[node.start_byte()..node.end_byte()]
    }

    /// Build a node from a `block_node` or `flow_node`
    fn node(&mut self, ts: TsNode) -> ParseResult<Node> {
        let mut props = Props::default();
        let mut content = None;
        for child in children(ts) {
            match child.kind() {
                "anchor" => {
                    let name = named_text(child, "anchor_name", self.source);
                    props.anchor = Some((name.to_string(), self.span(child)));
                }
                "tag" => props.tag = Some((self.text(child).to_string(), self.span(child))),
                "comment" => {}
                _ if child.is_named() => content = Some(child),
                _ => {}
            }
        }

        let mut node = match content {
            Some(content) => self.content(content)?,
            None => {
                let after = [props.anchor.as_ref(), props.tag.as_ref()]
                    .into_iter()
                    .flatten()
                    .map(|(_, span)| span.end)
                    .max()
                    .unwrap_or(ts.start_byte());
                Node::empty(after)
            }
        };

        if let Some((name, _)) = &props.anchor {
            self.anchors.insert(name.clone());
        }
        node.props = props;
        Ok(node)
    }

    fn content(&mut self, ts: TsNode) -> ParseResult<Node> {
        let node = match ts.kind() {
            "plain_scalar" => Node::new(self.trimmed(ts), NodeKind::Scalar(ScalarStyle::Plain)),
            "single_quote_scalar" => Node::new(self.span(ts), NodeKind::Scalar(ScalarStyle::SingleQuoted)),
            "double_quote_scalar" => Node::new(self.span(ts), NodeKind::Scalar(ScalarStyle::DoubleQuoted)),
            "block_scalar" => {
                let style = if self.text(ts).starts_with('>') {
                    ScalarStyle::Folded
                } else {
                    ScalarStyle::Literal
                };
                Node::new(self.trimmed(ts), NodeKind::Scalar(style))
            }
            "alias" => {
                let name = named_text(ts, "alias_name", self.source);
                if !self.anchors.contains(name) {
                    return Err(ParseError::UnknownAlias {
                        pos: self.position(ts.start_byte()),
                        name: name.to_string(),
                    });
                }
                Node::new(self.span(ts), NodeKind::Alias(name.to_string()))
            }
            "block_mapping" | "flow_mapping" => {
                let layout = layout_of(ts);
                let mut entries = Vec::new();
                for child in children(ts) {
                    match child.kind() {
                        "block_mapping_pair" | "flow_pair" => entries.push(self.entry(child)?),
                        "flow_node" => entries.push(self.bare_key(child)?),
                        _ => {}
                    }
                }
                let span = match (layout, entries.first(), entries.last()) {
                    (Layout::Block, Some(first), Some(last)) => Span::new(first.key_span.start, last.span().end),
                    _ => self.span(ts),
                };
                Node::new(span, NodeKind::Map(MapNode { layout, entries }))
            }
            "block_sequence" | "flow_sequence" => {
                let layout = layout_of(ts);
                let mut items = Vec::new();
                for child in children(ts) {
                    match child.kind() {
                        "block_sequence_item" => items.push(self.item(child)?),
                        "flow_node" => items.push(SeqItem {
                            dash: None,
                            value: self.node(child)?,
                        }),
                        "flow_pair" => {
                            return Err(ParseError::unsupported(
                                self.position(child.start_byte()),
                                "single-pair mappings inside flow sequences",
                            ))
                        }
                        _ => {}
                    }
                }
                let span = match (layout, items.first(), items.last()) {
                    (Layout::Block, Some(first), Some(last)) => Span::new(first.span().start, last.span().end),
                    _ => self.span(ts),
                };
                Node::new(span, NodeKind::Seq(SeqNode { layout, items }))
            }
            other => {
                return Err(ParseError::unsupported(
                    self.position(ts.start_byte()),
                    format!("`{}` nodes", other),
                ))
            }
        };
        Ok(node)
    }

    fn entry(&mut self, pair: TsNode) -> ParseResult<MapEntry> {
        let mut colon = None;
        for child in children(pair) {
            match child.kind() {
                "?" => {
                    return Err(ParseError::unsupported(
                        self.position(child.start_byte()),
                        "explicit `?` mapping keys",
                    ))
                }
                ":" if colon.is_none() => colon = Some(self.span(child)),
                _ => {}
            }
        }

        let Some(key) = pair.child_by_field_name("key") else {
            return Err(ParseError::MissingKey {
                pos: self.position(pair.start_byte()),
            });
        };
        let key_span = self.key(key)?;
        let colon = colon.unwrap_or(Span::at(key_span.end));
        let value = match pair.child_by_field_name("value") {
            Some(value) => self.node(value)?,
            None => Node::empty(colon.end),
        };

        Ok(MapEntry {
            key: String::new(),
            key_span,
            colon,
            value,
        })
    }

    /// `{a}`: a flow mapping entry with no `:` and a null value
    fn bare_key(&mut self, key: TsNode) -> ParseResult<MapEntry> {
        let key_span = self.key(key)?;
        Ok(MapEntry {
            key: String::new(),
            key_span,
            colon: Span::at(key_span.end),
            value: Node::empty(key_span.end),
        })
    }

    /// Check a key node and return its span. Keys are scalars or aliases.
    fn key(&mut self, key: TsNode) -> ParseResult<Span> {
        let node = self.node(key)?;
        match node.kind {
            NodeKind::Scalar(_) | NodeKind::Alias(_) => Ok(node.outer()),
            _ => Err(ParseError::unsupported(
                self.position(key.start_byte()),
                format!("{} used as a mapping key", node.kind_name()),
            )),
        }
    }

    fn item(&mut self, item: TsNode) -> ParseResult<SeqItem> {
        let mut dash = None;
        let mut value = None;
        for child in children(item) {
            match child.kind() {
                "-" => dash = Some(self.span(child)),
                _ if is_node(child) => value = Some(self.node(child)?),
                _ => {}
            }
        }
        let dash = dash.unwrap_or(Span::at(item.start_byte()));
        Ok(SeqItem {
            dash: Some(dash),
            value: value.unwrap_or_else(|| Node::empty(dash.end)),
        })
    }

    /// Copy decoded keys onto the entries they were read from
    fn attach(&self, node: &mut Node, value: &Value) -> ParseResult<()> {
        let start = node.span.start;
        let mismatch = || ParseError::unsupported(self.position(start), "node does not match its decoded value");
        match (&mut node.kind, value) {
            (NodeKind::Map(map), Value::Object(object)) => {
                if map.entries.len() != object.len() {
                    return Err(mismatch());
                }
                for (entry, (key, child)) in map.entries.iter_mut().zip(object) {
                    entry.key = key.clone();
                    self.attach(&mut entry.value, child)?;
                }
                Ok(())
            }
            (NodeKind::Seq(seq), Value::Array(items)) => {
                if seq.items.len() != items.len() {
                    return Err(mismatch());
                }
                for (item, child) in seq.items.iter_mut().zip(items) {
                    self.attach(&mut item.value, child)?;
                }
                Ok(())
            }
            (NodeKind::Map(_) | NodeKind::Seq(_), _) => Err(mismatch()),
            _ => Ok(()),
        }
    }
}

fn children(node: TsNode) -> Vec<TsNode> {
    (0..node.child_count()).filter_map(|idx| node.child(idx)).collect()
}

fn is_node(node: TsNode) -> bool {
    matches!(node.kind(), "block_node" | "flow_node")
}

fn layout_of(node: TsNode) -> Layout {
    if node.kind().starts_with("flow") {
        Layout::Flow
    } else {
        Layout::Block
    }
}

/// Text of the first child of kind `kind`
fn named_text<'s>(node: TsNode, kind: &str, source: &'s str) -> &'s str {
    children(node)
        .into_iter()
        .find(|child| child.kind() == kind)
        .map_or("", |child| &source[child.start_byte()..child.end_byte()])
}

fn first_error(node: TsNode) -> Option<TsNode> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    children(node).into_iter().find_map(first_error)
}

/// Indentation of the first block collection nested under a mapping entry
fn detect_indent(source: &str, node: &Node) -> Option<usize> {
    let column = |offset: usize| offset - source[..offset].rfind('\n').map_or(0, |idx| idx + 1);
    let line_of = |offset: usize| source[..offset].matches('\n').count();

    match &node.kind {
        NodeKind::Map(map) => map.entries.iter().find_map(|entry| {
            let value = &entry.value;
            let nested = value.is_block_collection()
                && line_of(value.span.start) > line_of(entry.key_span.start)
                && column(value.span.start) > column(entry.key_span.start);
            if nested {
                Some(column(value.span.start) - column(entry.key_span.start))
            } else {
                detect_indent(source, value)
            }
        }),
        NodeKind::Seq(seq) => seq.items.iter().find_map(|item| detect_indent(source, &item.value)),
        _ => None,
    }
}
