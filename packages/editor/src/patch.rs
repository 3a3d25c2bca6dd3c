//! # Structural Patcher
//!
//! Queues text edits on a parsed document so it encodes a new value,
//! touching only the parts whose values changed.
//!
//! ## Rules
//!
//! - Equal values leave the text alone, formatting included
//! - Mappings: removed keys lose their lines, added keys are written after
//!   the last remaining entry, common keys are patched recursively. Existing
//!   keys never move.
//! - Sequences are matched by position: the common prefix is patched in
//!   place, extra items are appended, missing items are cut from the tail.
//!   Inserting at the front therefore rewrites every item.
//! - Scalars keep their place, comment, anchor and quoting style and only
//!   swap their text. A core schema tag that cannot hold the new value is
//!   dropped.
//! - Anything else is rendered fresh in the place of the old node
//! - An alias whose anchored node changed is written out with the value it
//!   used to stand for
//!
//! The patcher trusts `old` to be what the document encodes. Sessions verify
//! the result instead.

use crate::policy::PatchPolicy;
use crate::render::{format_key, pad, Rendered, Renderer};
use serde_json::Map;
use std::collections::HashSet;
use tracing::debug;
use yamlpatch_parser::{
    kind_of, tag_admits, values_equal, Document, Edit, Layout, MapEntry, MapNode, Node, NodeKind, ScalarStyle,
    SeqItem, SeqNode, Span, Value, ValueKind,
};

/// What happened to the node handed to the patcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Unchanged,
    /// The node was edited in place
    Updated,
    /// The node was rendered anew
    Replaced,
}

pub struct Patcher<'p> {
    policy: &'p PatchPolicy,
}

impl<'p> Patcher<'p> {
    pub fn new(policy: &'p PatchPolicy) -> Self {
        Self { policy }
    }

    /// Queue the edits that make `doc`, which encodes `old`, encode `new`
    pub fn patch_document(&self, doc: &mut Document, old: &Value, new: &Value) -> PatchOutcome {
        if values_equal(old, new) {
            return PatchOutcome::Unchanged;
        }

        let (outcome, edits) = {
            let mut pass = Pass::new(doc, self.policy);
            let outcome = match &doc.root {
                Some(root) => pass.patch(root, old, new, Slot::Root, None),
                None => {
                    pass.fill(new);
                    PatchOutcome::Replaced
                }
            };
            pass.restore_aliases();
            (outcome, pass.edits)
        };

        debug!(edits = edits.len(), ?outcome, "patched document");
        for edit in edits {
            doc.replace(edit.span, edit.text);
        }
        outcome
    }

    /// Text of a new document holding `value`
    pub fn render(&self, value: &Value) -> String {
        Renderer::new(self.policy, Document::DEFAULT_INDENT).document(value)
    }
}

/// Where a node sits, which decides how replacement text is laid out
#[derive(Debug, Clone, Copy)]
enum Slot {
    Root,
    /// Value of a block mapping entry whose key starts at column `indent`
    /// and whose `:` ends at `after`
    Entry { indent: usize, after: usize },
    /// Value of a block sequence item whose `-` is at column `indent` and
    /// ends at `after`
    Item { indent: usize, after: usize },
    /// Inside a flow collection
    Flow,
}

/// An alias in an unchanged part of the document
struct KeptAlias<'a> {
    node: &'a Node,
    value: &'a Value,
    slot: Slot,
    /// Number of edits queued when it was seen
    mark: usize,
}

/// One patching run over a document
struct Pass<'a> {
    doc: &'a Document,
    render: Renderer<'a>,
    policy: &'a PatchPolicy,
    edits: Vec<Edit>,
    track_aliases: bool,
    /// Anchors whose node no longer holds the value aliases copied from it
    dirty: HashSet<String>,
    aliases: Vec<KeptAlias<'a>>,
}

impl<'a> Pass<'a> {
    fn new(doc: &'a Document, policy: &'a PatchPolicy) -> Self {
        Self {
            doc,
            render: Renderer::new(policy, doc.indent_step),
            policy,
            edits: Vec::new(),
            track_aliases: doc.root.as_ref().is_some_and(Node::contains_alias),
            dirty: HashSet::new(),
            aliases: Vec::new(),
        }
    }

    /// Queue a replacement, writing line breaks the way the surrounding
    /// line does
    fn emit(&mut self, span: Span, text: String) {
        let eol = self.doc.eol_at(span.start);
        let text = if eol == "\n" { text } else { text.replace('\n', eol) };
        self.edits.push(Edit { span, text });
    }

    fn retire(&mut self, node: &Node) {
        self.dirty.extend(node.anchors());
    }

    fn patch(&mut self, node: &'a Node, old: &'a Value, new: &Value, slot: Slot, key: Option<&str>) -> PatchOutcome {
        if values_equal(old, new) {
            self.keep(node, old, slot);
            return PatchOutcome::Unchanged;
        }
        if let Some(anchor) = node.anchor() {
            self.dirty.insert(anchor.to_string());
        }

        match (&node.kind, old, new) {
            (NodeKind::Map(map), Value::Object(old_map), Value::Object(new_map)) => {
                self.patch_map(node, map, old_map, new_map, slot, key)
            }
            (NodeKind::Seq(seq), Value::Array(old_items), Value::Array(new_items)) => {
                self.patch_seq(node, seq, old_items, new_items, slot, key)
            }
            (NodeKind::Scalar(style), _, _)
                if kind_of(old) == ValueKind::Scalar && kind_of(new) == ValueKind::Scalar =>
            {
                debug!(key, "updating scalar");
                self.patch_scalar(node, *style, new, slot);
                PatchOutcome::Updated
            }
            _ => {
                debug!(key, from = node.kind_name(), "replacing node");
                self.replace(node, new, slot, key);
                PatchOutcome::Replaced
            }
        }
    }

    /// Note the aliases of an unchanged subtree in case their anchor changes
    fn keep(&mut self, node: &'a Node, value: &'a Value, slot: Slot) {
        if !self.track_aliases {
            return;
        }
        match (&node.kind, value) {
            (NodeKind::Alias(_), _) => self.aliases.push(KeptAlias {
                node,
                value,
                slot,
                mark: self.edits.len(),
            }),
            (NodeKind::Map(map), Value::Object(object)) => {
                for entry in &map.entries {
                    if let Some(child) = object.get(&entry.key) {
                        let slot = self.entry_slot(map, entry);
                        self.keep(&entry.value, child, slot);
                    }
                }
            }
            (NodeKind::Seq(seq), Value::Array(items)) => {
                for (item, child) in seq.items.iter().zip(items) {
                    let slot = self.item_slot(seq, item);
                    self.keep(&item.value, child, slot);
                }
            }
            _ => {}
        }
    }

    /// Write out aliases whose anchor changed, in the place they were seen
    fn restore_aliases(&mut self) {
        let aliases = std::mem::take(&mut self.aliases);
        for alias in aliases.into_iter().rev() {
            let NodeKind::Alias(name) = &alias.node.kind else {
                continue;
            };
            if !self.dirty.contains(name) {
                continue;
            }
            debug!(alias = name.as_str(), "writing out alias of a changed anchor");
            let start = self.edits.len();
            self.replace(alias.node, alias.value, alias.slot, None);
            let written = self.edits.split_off(start);
            let tail = self.edits.split_off(alias.mark);
            self.edits.extend(written);
            self.edits.extend(tail);
        }
    }

    fn entry_slot(&self, map: &MapNode, entry: &MapEntry) -> Slot {
        match map.layout {
            Layout::Block => Slot::Entry {
                indent: self.doc.column(entry.key_span.start),
                after: entry.colon.end,
            },
            Layout::Flow => Slot::Flow,
        }
    }

    fn item_slot(&self, seq: &SeqNode, item: &SeqItem) -> Slot {
        match (seq.layout, item.dash) {
            (Layout::Block, Some(dash)) => Slot::Item {
                indent: self.doc.column(dash.start),
                after: dash.end,
            },
            _ => Slot::Flow,
        }
    }

    // Scalars

    fn patch_scalar(&mut self, node: &Node, style: ScalarStyle, new: &Value, slot: Slot) {
        if let Some((tag, span)) = &node.props.tag {
            if !tag_admits(tag, new) {
                debug!(tag = tag.as_str(), "dropping tag that no longer fits");
                let end = self.skip_blanks(span.end).min(node.span.start.max(span.end));
                self.emit(Span::new(span.start, end), String::new());
            }
        }

        let indent = if style.is_block() {
            self.block_content_indent(node)
                .unwrap_or_else(|| self.child_indent(slot))
        } else {
            self.child_indent(slot)
        };
        let text = self.render.scalar(new, style, indent, matches!(slot, Slot::Flow));
        self.emit(node.span, text);
    }

    /// Indentation of the content lines of an existing block scalar
    fn block_content_indent(&self, node: &Node) -> Option<usize> {
        self.doc
            .text(node.span)
            .lines()
            .skip(1)
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.len() - line.trim_start_matches(' ').len())
            .min()
    }

    fn child_indent(&self, slot: Slot) -> usize {
        match slot {
            Slot::Entry { indent, .. } | Slot::Item { indent, .. } => indent + self.render.step(),
            Slot::Root | Slot::Flow => self.render.step(),
        }
    }

    fn skip_blanks(&self, offset: usize) -> usize {
        let rest = &self.doc.source()[offset.min(self.doc.source().len())..];
        offset + (rest.len() - rest.trim_start_matches([' ', '\t']).len())
    }

    // Whole nodes

    /// Render `value` in the place of `node`
    fn replace(&mut self, node: &Node, value: &Value, slot: Slot, key: Option<&str>) {
        self.retire(node);
        let outer = node.outer();

        match slot {
            Slot::Flow => {
                let text = self.render.flow(value);
                if outer.is_empty() {
                    self.emit(outer, format!(" {}", text));
                } else {
                    self.emit(outer, text);
                }
            }
            Slot::Root => {
                if self.doc.starts_line(outer.start) {
                    let text = self.render.root(value, self.doc.column(outer.start));
                    self.emit(Span::new(self.doc.line_start(outer.start), outer.end), text);
                } else {
                    let text = format!("\n{}", self.render.root(value, 0));
                    self.emit(outer, text);
                }
            }
            Slot::Entry { indent, after } | Slot::Item { indent, after } => {
                let on_key_line = self.doc.line_start(outer.start) == self.doc.line_start(after);
                match self.render.value_after(value, key, indent) {
                    Rendered::Inline(text) if outer.is_empty() => self.emit(Span::at(after), format!(" {}", text)),
                    Rendered::Inline(text) if on_key_line => self.emit(outer, text),
                    Rendered::Inline(text) => {
                        self.emit(Span::at(after), format!(" {}", text));
                        let line_end = self.doc.line_end(after);
                        self.emit(Span::new(line_end, outer.end), String::new());
                    }
                    Rendered::Block(_) if !on_key_line && self.doc.starts_line(outer.start) => {
                        let column = self.doc.column(outer.start);
                        let keeps_column = column > indent
                            || (matches!(slot, Slot::Entry { .. }) && value.is_array() && column == indent);
                        let text = if keeps_column {
                            self.block(value, column)
                        } else {
                            self.block(value, indent + self.render.step())
                        };
                        self.emit(Span::new(self.doc.line_start(outer.start), outer.end), text);
                    }
                    Rendered::Block(_) if matches!(slot, Slot::Item { .. }) && self.rest_of_line_is_blank(outer.end) => {
                        let text = self.render.item(value, indent);
                        let compact = text[indent + 1..].to_string();
                        self.emit(Span::new(after, outer.end), compact);
                    }
                    Rendered::Block(text) => {
                        if !outer.is_empty() {
                            self.emit(Span::new(after, outer.end), String::new());
                        }
                        let line_end = self.doc.line_end(outer.end.max(after));
                        self.emit(Span::at(line_end), format!("\n{}", text));
                    }
                }
            }
        }
    }

    /// A block collection with its first line at `indent`
    fn block(&self, value: &Value, indent: usize) -> String {
        match value {
            Value::Object(map) => self.render.block_map(map, indent),
            Value::Array(items) => self.render.block_seq(items, indent),
            other => format!("{}{}", pad(indent), self.render.flow(other)),
        }
    }

    fn rest_of_line_is_blank(&self, offset: usize) -> bool {
        let end = self.doc.line_end(offset);
        self.doc.source()[offset.min(end)..end].trim().is_empty()
    }

    /// Lines from the start of `first` through the end of `last`, with the
    /// line break that ends them
    fn line_range(&self, first: usize, last: usize) -> Span {
        let mut start = self.doc.line_start(first);
        let end = self.doc.next_line_start(last);
        if end == self.doc.source().len() && !self.doc.ends_with_newline() && start > 0 {
            start = self.doc.line_end(start - 1);
        }
        Span::new(start, end)
    }

    /// A document that has no node yet
    fn fill(&mut self, value: &Value) {
        let source = self.doc.source();
        let text = self.render.document(value);
        let end_marker = source
            .match_indices("...")
            .map(|(idx, _)| idx)
            .find(|idx| self.doc.column(*idx) == 0);

        match end_marker {
            Some(at) => self.emit(Span::at(at), text),
            None if source.is_empty() || self.doc.ends_with_newline() => self.emit(Span::at(source.len()), text),
            None => self.emit(Span::at(source.len()), format!("\n{}", text)),
        }
    }

    // Mappings

    fn patch_map(
        &mut self,
        node: &'a Node,
        map: &'a MapNode,
        old: &'a Map<String, Value>,
        new: &Map<String, Value>,
        slot: Slot,
        key: Option<&str>,
    ) -> PatchOutcome {
        match map.layout {
            Layout::Block => {
                if new.is_empty() || !map.entries.iter().any(|entry| new.contains_key(&entry.key)) {
                    self.replace(node, &Value::Object(new.clone()), slot, key);
                    return PatchOutcome::Replaced;
                }
                self.patch_block_map(map, old, new);
            }
            Layout::Flow if map.entries.is_empty() && !matches!(slot, Slot::Flow) => {
                self.replace(node, &Value::Object(new.clone()), slot, key);
                return PatchOutcome::Replaced;
            }
            Layout::Flow if old.len() == new.len() && old.keys().all(|key| new.contains_key(key)) => {
                for entry in &map.entries {
                    if let (Some(before), Some(after)) = (old.get(&entry.key), new.get(&entry.key)) {
                        self.patch(&entry.value, before, after, Slot::Flow, Some(&entry.key));
                    }
                }
            }
            Layout::Flow => self.regenerate_flow_map(node, map, old, new),
        }
        PatchOutcome::Updated
    }

    fn patch_block_map(&mut self, map: &'a MapNode, old: &'a Map<String, Value>, new: &Map<String, Value>) {
        for entry in &map.entries {
            if let (Some(before), Some(after)) = (old.get(&entry.key), new.get(&entry.key)) {
                let slot = self.entry_slot(map, entry);
                self.patch(&entry.value, before, after, slot, Some(&entry.key));
            }
        }

        let indent = map
            .entries
            .first()
            .map_or(0, |entry| self.doc.column(entry.key_span.start));
        let added: Vec<String> = new
            .iter()
            .filter(|(key, _)| !old.contains_key(*key) && map.get(key).is_none())
            .map(|(key, value)| {
                debug!(key = key.as_str(), "added key");
                self.render.entry(key, value, indent)
            })
            .collect();
        if !added.is_empty() {
            if let Some(last) = map.entries.iter().rev().find(|entry| new.contains_key(&entry.key)) {
                let at = self.doc.line_end(last.span().end);
                self.emit(Span::at(at), format!("\n{}", added.join("\n")));
            }
        }

        let mut idx = 0;
        while idx < map.entries.len() {
            if new.contains_key(&map.entries[idx].key) {
                idx += 1;
                continue;
            }
            let first = idx;
            while idx < map.entries.len() && !new.contains_key(&map.entries[idx].key) {
                debug!(key = map.entries[idx].key.as_str(), "removed key");
                self.retire(&map.entries[idx].value);
                idx += 1;
            }
            self.remove_entries(map, first, idx);
        }
    }

    /// Delete entries `first..end`; some entry of the map remains
    fn remove_entries(&mut self, map: &MapNode, first: usize, end: usize) {
        let head = &map.entries[first];
        let last = &map.entries[end - 1];

        if !self.doc.starts_line(head.key_span.start) {
            // `- key: value`: the next entry moves up onto the dash line
            if let Some(next) = map.entries.get(end) {
                self.emit(Span::new(head.key_span.start, next.key_span.start), String::new());
                return;
            }
        }
        let span = self.line_range(head.key_span.start, last.span().end);
        self.emit(span, String::new());
    }

    fn regenerate_flow_map(
        &mut self,
        node: &Node,
        map: &MapNode,
        old: &Map<String, Value>,
        new: &Map<String, Value>,
    ) {
        let mut entries = Vec::new();
        for (key, value) in new {
            let reusable = map.get(key).filter(|entry| {
                old.get(key).is_some_and(|before| values_equal(before, value))
                    && !entry.value.contains_alias()
                    && !self.doc.text(entry.span()).contains('\n')
            });
            match reusable {
                Some(entry) => entries.push(self.doc.text(entry.span()).to_string()),
                None => entries.push(format!("{}: {}", format_key(key, true), self.render.flow(value))),
            }
        }
        for entry in &map.entries {
            let kept = new.contains_key(&entry.key)
                && old
                    .get(&entry.key)
                    .zip(new.get(&entry.key))
                    .is_some_and(|(before, after)| values_equal(before, after));
            if !kept {
                self.retire(&entry.value);
            }
        }

        let text = if entries.is_empty() {
            String::from("{}")
        } else {
            format!("{{{}}}", entries.join(", "))
        };
        self.emit(node.span, text);
    }

    // Sequences

    fn patch_seq(
        &mut self,
        node: &'a Node,
        seq: &'a SeqNode,
        old: &'a [Value],
        new: &[Value],
        slot: Slot,
        key: Option<&str>,
    ) -> PatchOutcome {
        let in_flow = matches!(slot, Slot::Flow);
        let forced = key.is_some_and(|key| self.policy.force_block_style(key));

        match seq.layout {
            Layout::Flow if !in_flow && (seq.items.is_empty() || forced) => {
                self.replace(node, &Value::Array(new.to_vec()), slot, key);
                PatchOutcome::Replaced
            }
            Layout::Flow if old.len() == new.len() => {
                for ((item, before), after) in seq.items.iter().zip(old).zip(new) {
                    self.patch(&item.value, before, after, Slot::Flow, None);
                }
                PatchOutcome::Updated
            }
            Layout::Flow => {
                self.regenerate_flow_seq(node, seq, old, new);
                PatchOutcome::Updated
            }
            Layout::Block if new.is_empty() => {
                self.replace(node, &Value::Array(Vec::new()), slot, key);
                PatchOutcome::Replaced
            }
            Layout::Block => {
                self.patch_block_seq(seq, old, new);
                PatchOutcome::Updated
            }
        }
    }

    fn patch_block_seq(&mut self, seq: &'a SeqNode, old: &'a [Value], new: &[Value]) {
        let common = old.len().min(new.len()).min(seq.items.len());
        for idx in 0..common {
            let item = &seq.items[idx];
            let slot = self.item_slot(seq, item);
            self.patch(&item.value, &old[idx], &new[idx], slot, None);
        }

        let (Some(first), Some(last)) = (seq.items.first(), seq.items.last()) else {
            return;
        };

        if new.len() > seq.items.len() {
            debug!(count = new.len() - seq.items.len(), "appending items");
            let indent = first.dash.map_or(0, |dash| self.doc.column(dash.start));
            let items: Vec<String> = new[seq.items.len()..]
                .iter()
                .map(|value| self.render.item(value, indent))
                .collect();
            let at = self.doc.line_end(last.span().end);
            self.emit(Span::at(at), format!("\n{}", items.join("\n")));
        } else if new.len() < seq.items.len() {
            debug!(count = seq.items.len() - new.len(), "truncating items");
            let removed = &seq.items[new.len()..];
            for item in removed {
                self.retire(&item.value);
            }
            let span = self.line_range(removed[0].span().start, last.span().end);
            self.emit(span, String::new());
        }
    }

    fn regenerate_flow_seq(&mut self, node: &Node, seq: &SeqNode, old: &[Value], new: &[Value]) {
        let mut items = Vec::new();
        for (idx, value) in new.iter().enumerate() {
            let reusable = seq.items.get(idx).filter(|item| {
                old.get(idx).is_some_and(|before| values_equal(before, value))
                    && !item.value.contains_alias()
                    && !self.doc.text(item.value.outer()).contains('\n')
            });
            match reusable {
                Some(item) => items.push(self.doc.text(item.value.outer()).to_string()),
                None => items.push(self.render.flow(value)),
            }
        }
        for (idx, item) in seq.items.iter().enumerate() {
            let kept = old
                .get(idx)
                .zip(new.get(idx))
                .is_some_and(|(before, after)| values_equal(before, after));
            if !kept {
                self.retire(&item.value);
            }
        }
        self.emit(node.span, format!("[{}]", items.join(", ")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use yamlpatch_parser::{parse, serialize};

    fn apply(source: &str, new: Value) -> String {
        apply_with(&PatchPolicy::default(), source, new)
    }

    fn apply_with(policy: &PatchPolicy, source: &str, new: Value) -> String {
        let mut doc = parse(source).unwrap();
        let old = doc.to_value();
        Patcher::new(policy).patch_document(&mut doc, &old, &new);
        let output = serialize(&doc);
        assert!(
            values_equal(&parse(&output).unwrap().to_value(), &new),
            "output does not decode to the new value:\n{}",
            output
        );
        output
    }

    #[test]
    fn test_update_quoted_scalar_keeps_style() {
        let output = apply("title: Foo\nversion: '1.0'\n", json!({"title": "Foo", "version": "2.0"}));
        assert_eq!(output, "title: Foo\nversion: '2.0'\n");
    }

    #[test]
    fn test_unchanged_returns_unchanged() {
        let source = "a: 1   # keep\nb: [x, y]\n";
        let mut doc = parse(source).unwrap();
        let value = doc.to_value();
        let policy = PatchPolicy::default();
        let outcome = Patcher::new(&policy).patch_document(&mut doc, &value, &value);
        assert_eq!(outcome, PatchOutcome::Unchanged);
        assert!(!doc.is_modified());
        assert_eq!(serialize(&doc), source);
    }

    #[test]
    fn test_sibling_comment_survives() {
        let output = apply(
            "# header\nname: api   # the name\nversion: 1\n",
            json!({"name": "api", "version": 2}),
        );
        assert_eq!(output, "# header\nname: api   # the name\nversion: 2\n");
    }

    #[test]
    fn test_scalar_comment_survives_value_change() {
        let output = apply("port: 80   # http\n", json!({"port": 8080}));
        assert_eq!(output, "port: 8080   # http\n");
    }

    #[test]
    fn test_added_keys_go_last() {
        let output = apply("b: 1\na: 2\n", json!({"c": 3, "a": 2, "b": 1}));
        assert_eq!(output, "b: 1\na: 2\nc: 3\n");
    }

    #[test]
    fn test_removed_key_keeps_order() {
        let output = apply("a: 1\nb: 2\nc: 3\n", json!({"a": 1, "c": 3}));
        assert_eq!(output, "a: 1\nc: 3\n");
    }

    #[test]
    fn test_removed_last_key_without_final_newline() {
        let output = apply("a: 1\nb: 2", json!({"a": 1}));
        assert_eq!(output, "a: 1");
    }

    #[test]
    fn test_removed_first_key_of_compact_item() {
        let output = apply("- a: 1\n  b: 2\n", json!([{"b": 2}]));
        assert_eq!(output, "- b: 2\n");
    }

    #[test]
    fn test_added_nested_structure() {
        let output = apply(
            "info:\n    title: API\n",
            json!({"info": {"title": "API", "contact": {"name": "Team", "urls": ["a", "b"]}}}),
        );
        assert_eq!(
            output,
            "info:\n    title: API\n    contact:\n        name: Team\n        urls:\n            - a\n            - b\n"
        );
    }

    #[test]
    fn test_nested_and_outer_additions_stay_ordered() {
        let output = apply("info:\n  title: API\n", json!({"info": {"title": "API", "version": 1}, "x": 2}));
        assert_eq!(output, "info:\n  title: API\n  version: 1\nx: 2\n");
    }

    #[test]
    fn test_sequence_insert_at_front_is_positional() {
        let output = apply("- x   # first\n- y\n- z\n", json!(["w", "x", "y", "z"]));
        assert_eq!(output, "- w   # first\n- x\n- y\n- z\n");
    }

    #[test]
    fn test_sequence_truncation_keeps_head_formatting() {
        let output = apply("- 'a'   # one\n- b\n- c\n", json!(["a", "b"]));
        assert_eq!(output, "- 'a'   # one\n- b\n");
    }

    #[test]
    fn test_sequence_of_maps_append() {
        let output = apply(
            "servers:\n  - url: http://a\n",
            json!({"servers": [{"url": "http://a"}, {"url": "http://b", "name": "b"}]}),
        );
        assert_eq!(output, "servers:\n  - url: http://a\n  - url: http://b\n    name: b\n");
    }

    #[test]
    fn test_kind_change_replaces_node() {
        let output = apply("a: 1  # num\nb: x\n", json!({"a": {"nested": true}, "b": "x"}));
        assert_eq!(output, "a:  # num\n  nested: true\nb: x\n");
    }

    #[test]
    fn test_block_to_scalar_keeps_key_line() {
        let output = apply("a:  # note\n  x: 1\n  y: 2\nb: 3\n", json!({"a": 5, "b": 3}));
        assert_eq!(output, "a: 5  # note\nb: 3\n");
    }

    #[test]
    fn test_item_kind_change_is_compact() {
        let output = apply("- 1\n- 2\n", json!([{"k": "v"}, 2]));
        assert_eq!(output, "- k: v\n- 2\n");
    }

    #[test]
    fn test_root_kind_change_replaces_root() {
        let output = apply("# keep me\na: 1\n", json!(["x"]));
        assert_eq!(output, "# keep me\n- x\n");
    }

    #[test]
    fn test_tags_are_forced_to_block_style() {
        let output = apply("tags: [a, b]\nother: [a, b]\n", json!({"tags": ["a", "c"], "other": ["a", "c"]}));
        assert_eq!(output, "tags:\n  - a\n  - c\nother: [a, c]\n");
    }

    #[test]
    fn test_flow_collection_patched_in_place() {
        let output = apply("point: {x: 1, y: 2}  # origin\n", json!({"point": {"x": 1, "y": 5}}));
        assert_eq!(output, "point: {x: 1, y: 5}  # origin\n");
    }

    #[test]
    fn test_flow_collection_regenerated_with_new_keys() {
        let output = apply(
            "point: {x: 1,   y: \"2\"}  # origin\n",
            json!({"point": {"x": 1, "y": "2", "z": 3}}),
        );
        assert_eq!(output, "point: {x: 1, y: \"2\", z: 3}  # origin\n");
    }

    #[test]
    fn test_empty_flow_map_becomes_block() {
        let output = apply("components: {}\n", json!({"components": {"schemas": {}}}));
        assert_eq!(output, "components:\n  schemas: {}\n");
    }

    #[test]
    fn test_block_scalar_updated_in_place() {
        let output = apply(
            "description: |\n  old text\n  here\nname: x\n",
            json!({"description": "new text\nthere\n", "name": "x"}),
        );
        assert_eq!(output, "description: |\n  new text\n  there\nname: x\n");
    }

    #[test]
    fn test_synthesized_strings_are_quoted_when_needed() {
        let output = apply(
            "a: 1\n",
            json!({"a": 1, "b": "yes: no", "c": "123", "d": "multi\nline"}),
        );
        assert_eq!(output, "a: 1\nb: 'yes: no'\nc: '123'\nd: |-\n  multi\n  line\n");
    }

    #[test]
    fn test_inline_sequence_limit() {
        let policy = PatchPolicy::default().with_inline_sequence_limit(Some(3));
        let output = apply_with(
            &policy,
            "a: 1\n",
            json!({"a": 1, "required": ["id", "name"], "tags": ["x"]}),
        );
        assert_eq!(output, "a: 1\nrequired: [id, name]\ntags:\n  - x\n");
    }

    #[test]
    fn test_tag_dropped_when_type_changes() {
        assert_eq!(apply("a: !!str 123\n", json!({"a": 456})), "a: 456\n");
        assert_eq!(apply("a: !!str 123\n", json!({"a": "456"})), "a: !!str '456'\n");
        assert_eq!(apply("a: !!int 1   # n\n", json!({"a": 2})), "a: !!int 2   # n\n");
    }

    #[test]
    fn test_alias_keeps_value_when_anchor_changes() {
        let output = apply(
            "base: &b\n  k: 1\ncopy: *b\n",
            json!({"base": {"k": 2}, "copy": {"k": 1}}),
        );
        assert_eq!(output, "base: &b\n  k: 2\ncopy:\n  k: 1\n");
    }

    #[test]
    fn test_alias_of_removed_anchor_is_written_out() {
        let output = apply("a: &x 1\nb: *x\n", json!({"b": 1}));
        assert_eq!(output, "b: 1\n");
    }

    #[test]
    fn test_alias_of_unchanged_anchor_is_kept() {
        let output = apply("a: &x 1\nb: *x\nc: 2\n", json!({"a": 1, "b": 1, "c": 3}));
        assert_eq!(output, "a: &x 1\nb: *x\nc: 3\n");
    }

    #[test]
    fn test_line_endings_follow_each_line() {
        let output = apply("a: 1\r\nb: 2\n", json!({"a": 1, "b": 3, "c": 4}));
        assert_eq!(output, "a: 1\r\nb: 3\nc: 4\n");
    }

    #[test]
    fn test_empty_document_grows() {
        let policy = PatchPolicy::default();
        let mut doc = parse("# nothing yet\n").unwrap();
        Patcher::new(&policy).patch_document(&mut doc, &json!({}), &json!({"a": 1}));
        assert_eq!(serialize(&doc), "# nothing yet\na: 1\n");
    }

    #[test]
    fn test_rendered_document_round_trips() {
        let value = json!({
            "openapi": "3.0.0",
            "paths": {"/pets": {"get": {"parameters": [{"name": "id", "in": "path"}], "tags": []}}},
            "numbers": [1, 2.5, -3],
            "flags": {"on": true, "off": false, "none": null},
            "nested": [[1, 2], [], {}]
        });
        let policy = PatchPolicy::default();
        let output = Patcher::new(&policy).render(&value);
        assert_eq!(parse(&output).unwrap().to_value(), value);
    }
}
