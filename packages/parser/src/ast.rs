//! Span-annotated document tree.
//!
//! A parsed document keeps its source text as it was read. Nodes record the
//! byte spans they came from, and changes are queued as edits over those
//! spans, so everything no edit touches (comments, spacing, line endings)
//! is written back byte for byte.

use crate::error::Position;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Half-open byte range into the document source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span at `offset`
    pub fn at(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// A pending replacement of `span` with `text`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub span: Span,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    /// Indentation based, one entry per line
    Block,
    /// Bracketed `{a: 1}` / `[a, b]`
    Flow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

impl ScalarStyle {
    pub fn is_block(self) -> bool {
        matches!(self, ScalarStyle::Literal | ScalarStyle::Folded)
    }
}

/// Anchor and tag written in front of a node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Props {
    pub anchor: Option<(String, Span)>,
    pub tag: Option<(String, Span)>,
}

impl Props {
    pub fn is_empty(&self) -> bool {
        self.anchor.is_none() && self.tag.is_none()
    }

    fn start(&self) -> Option<usize> {
        let anchor = self.anchor.as_ref().map(|(_, span)| span.start);
        let tag = self.tag.as_ref().map(|(_, span)| span.start);
        match (anchor, tag) {
            (Some(a), Some(t)) => Some(a.min(t)),
            (a, t) => a.or(t),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Content only: props excluded, trailing blank lines trimmed
    pub span: Span,
    pub props: Props,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Nothing written, e.g. the value of `key:`
    Empty,
    Scalar(ScalarStyle),
    Alias(String),
    Map(MapNode),
    Seq(SeqNode),
}

impl Node {
    pub fn new(span: Span, kind: NodeKind) -> Self {
        Self {
            span,
            props: Props::default(),
            kind,
        }
    }

    pub fn empty(at: usize) -> Self {
        Self::new(Span::at(at), NodeKind::Empty)
    }

    /// Span including the anchor and tag
    pub fn outer(&self) -> Span {
        match self.props.start() {
            Some(start) => Span::new(start.min(self.span.start), self.span.end),
            None => self.span,
        }
    }

    pub fn anchor(&self) -> Option<&str> {
        self.props.anchor.as_ref().map(|(name, _)| name.as_str())
    }

    pub fn tag(&self) -> Option<&str> {
        self.props.tag.as_ref().map(|(tag, _)| tag.as_str())
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Empty => "empty",
            NodeKind::Scalar(_) => "scalar",
            NodeKind::Alias(_) => "alias",
            NodeKind::Map(_) => "mapping",
            NodeKind::Seq(_) => "sequence",
        }
    }

    pub fn as_map(&self) -> Option<&MapNode> {
        match &self.kind {
            NodeKind::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&SeqNode> {
        match &self.kind {
            NodeKind::Seq(seq) => Some(seq),
            _ => None,
        }
    }

    /// Block collection with at least one entry
    pub fn is_block_collection(&self) -> bool {
        match &self.kind {
            NodeKind::Map(map) => map.layout == Layout::Block && !map.entries.is_empty(),
            NodeKind::Seq(seq) => seq.layout == Layout::Block && !seq.items.is_empty(),
            _ => false,
        }
    }

    /// Every anchor defined in this subtree
    pub fn anchors(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.visit(&mut |node| {
            if let Some(name) = node.anchor() {
                names.push(name.to_string());
            }
        });
        names
    }

    pub fn contains_alias(&self) -> bool {
        let mut found = false;
        self.visit(&mut |node| found |= matches!(node.kind, NodeKind::Alias(_)));
        found
    }

    fn visit(&self, f: &mut impl FnMut(&Node)) {
        f(self);
        match &self.kind {
            NodeKind::Map(map) => map.entries.iter().for_each(|entry| entry.value.visit(f)),
            NodeKind::Seq(seq) => seq.items.iter().for_each(|item| item.value.visit(f)),
            _ => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapNode {
    pub layout: Layout,
    pub entries: Vec<MapEntry>,
}

impl MapNode {
    pub fn get(&self, key: &str) -> Option<&MapEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntry {
    /// Decoded key text
    pub key: String,
    pub key_span: Span,
    /// The `:` indicator
    pub colon: Span,
    pub value: Node,
}

impl MapEntry {
    /// From the key to the end of the value
    pub fn span(&self) -> Span {
        let end = match self.value.kind {
            NodeKind::Empty => self.colon.end,
            _ => self.value.span.end,
        };
        Span::new(self.key_span.start, end.max(self.colon.end))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeqNode {
    pub layout: Layout,
    pub items: Vec<SeqItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeqItem {
    /// The `-` of a block sequence item
    pub dash: Option<Span>,
    pub value: Node,
}

impl SeqItem {
    pub fn span(&self) -> Span {
        let outer = self.value.outer();
        match self.dash {
            Some(dash) if matches!(self.value.kind, NodeKind::Empty) => dash,
            Some(dash) => Span::new(dash.start, outer.end),
            None => outer,
        }
    }
}

/// Root of a parsed YAML document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Source text, without a byte order mark
    source: String,
    /// The source started with U+FEFF
    bom: bool,
    pub root: Option<Node>,
    /// Value the source encodes
    value: Value,
    /// Indentation width used for nodes created after parsing
    pub indent_step: usize,
    /// Changes queued since parsing, applied by the serializer
    edits: Vec<Edit>,
}

impl Document {
    pub const DEFAULT_INDENT: usize = 2;

    pub(crate) fn new(source: String, bom: bool, root: Option<Node>, value: Value) -> Self {
        Self {
            source,
            bom,
            root,
            value,
            indent_step: Self::DEFAULT_INDENT,
            edits: Vec::new(),
        }
    }

    /// Document with no text and no root node
    pub fn empty() -> Self {
        Self::new(String::new(), false, None, Value::Null)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn has_bom(&self) -> bool {
        self.bom
    }

    /// Value of the source text as parsed. Queued edits are not reflected.
    pub fn to_value(&self) -> Value {
        self.value.clone()
    }

    /// Replace the value this document is taken to encode
    pub fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    pub fn text(&self, span: Span) -> &str {
        self.source.get(span.range()).unwrap_or_default()
    }

    /// Offset of the first byte of the line holding `offset`
    pub fn line_start(&self, offset: usize) -> usize {
        let offset = offset.min(self.source.len());
        self.source[..offset].rfind('\n').map_or(0, |idx| idx + 1)
    }

    /// Offset of the line break ending the line holding `offset`, or the
    /// end of the text on the last line
    pub fn line_end(&self, offset: usize) -> usize {
        let offset = offset.min(self.source.len());
        match self.source[offset..].find('\n') {
            Some(idx) if idx > 0 && self.source.as_bytes()[offset + idx - 1] == b'\r' => offset + idx - 1,
            Some(0) if offset > 0 && self.source.as_bytes()[offset - 1] == b'\r' => offset - 1,
            Some(idx) => offset + idx,
            None => self.source.len(),
        }
    }

    /// Offset just past the line break ending the line holding `offset`
    pub fn next_line_start(&self, offset: usize) -> usize {
        let offset = offset.min(self.source.len());
        self.source[offset..]
            .find('\n')
            .map_or(self.source.len(), |idx| offset + idx + 1)
    }

    /// Byte column of `offset` within its line
    pub fn column(&self, offset: usize) -> usize {
        offset.min(self.source.len()) - self.line_start(offset)
    }

    /// Whether only spaces precede `offset` on its line
    pub fn starts_line(&self, offset: usize) -> bool {
        let start = self.line_start(offset);
        self.source[start..offset.min(self.source.len())]
            .chars()
            .all(|c| c == ' ' || c == '\t')
    }

    /// Line break used around `offset`: the one ending its line, else the
    /// one ending the line before, else `\n`
    pub fn eol_at(&self, offset: usize) -> &'static str {
        let end = self.line_end(offset);
        if end < self.source.len() {
            return if self.source[end..].starts_with("\r\n") { "\r\n" } else { "\n" };
        }
        let start = self.line_start(offset);
        if start >= 2 && &self.source[start - 2..start] == "\r\n" {
            "\r\n"
        } else {
            "\n"
        }
    }

    /// Source ends with a line break
    pub fn ends_with_newline(&self) -> bool {
        self.source.ends_with('\n')
    }

    pub fn position(&self, offset: usize) -> Position {
        Position::in_text(&self.source, offset)
    }

    pub fn replace(&mut self, span: Span, text: impl Into<String>) {
        self.edits.push(Edit { span, text: text.into() });
    }

    pub fn insert(&mut self, at: usize, text: impl Into<String>) {
        self.replace(Span::at(at), text);
    }

    pub fn delete(&mut self, span: Span) {
        self.replace(span, String::new());
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn is_modified(&self) -> bool {
        !self.edits.is_empty()
    }
}
