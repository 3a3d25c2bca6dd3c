//! Text for values the patcher writes into a document.
//!
//! Rendering always uses `\n`; the patcher converts line breaks to the ones
//! used where the text lands. Block output is a run of lines, each carrying
//! its own indentation, with no line break after the last one.

use crate::policy::PatchPolicy;
use yamlpatch_parser::scalar::{self, BlockHeader};
use yamlpatch_parser::{kind_of, ScalarStyle, Value, ValueKind};

/// Where a value goes after `key:` or `-`
pub(crate) enum Rendered {
    /// On the same line, after a space. May continue onto further lines
    /// (block scalars).
    Inline(String),
    /// On the following lines
    Block(String),
}

pub(crate) struct Renderer<'p> {
    policy: &'p PatchPolicy,
    step: usize,
}

impl<'p> Renderer<'p> {
    pub fn new(policy: &'p PatchPolicy, step: usize) -> Self {
        Self {
            policy,
            step: step.max(1),
        }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    /// A whole document, ending with a line break
    pub fn document(&self, value: &Value) -> String {
        let mut text = self.root(value, 0);
        text.push('\n');
        text
    }

    /// The root value with its first line at `indent`
    pub fn root(&self, value: &Value, indent: usize) -> String {
        match value {
            Value::Object(map) if !map.is_empty() => self.block_map(map, indent),
            Value::Array(items) if !items.is_empty() && !self.inline_sequence(items, None) => {
                self.block_seq(items, indent)
            }
            _ => match self.value_after(value, None, indent) {
                Rendered::Inline(text) | Rendered::Block(text) => format!("{}{}", pad(indent), text),
            },
        }
    }

    /// Value of an entry or item whose key or dash sits at `indent`
    pub fn value_after(&self, value: &Value, key: Option<&str>, indent: usize) -> Rendered {
        let child = indent + self.step;
        match value {
            Value::Object(map) if map.is_empty() => Rendered::Inline(String::from("{}")),
            Value::Object(map) => Rendered::Block(self.block_map(map, child)),
            Value::Array(items) if items.is_empty() => Rendered::Inline(String::from("[]")),
            Value::Array(items) if self.inline_sequence(items, key) => Rendered::Inline(self.flow(value)),
            Value::Array(items) => Rendered::Block(self.block_seq(items, child)),
            scalar => Rendered::Inline(self.scalar(scalar, ScalarStyle::Plain, child, false)),
        }
    }

    pub fn block_map(&self, map: &serde_json::Map<String, Value>, indent: usize) -> String {
        map.iter()
            .map(|(key, value)| self.entry(key, value, indent))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn block_seq(&self, items: &[Value], indent: usize) -> String {
        items
            .iter()
            .map(|item| self.item(item, indent))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// `key: value` with the key at `indent`
    pub fn entry(&self, key: &str, value: &Value, indent: usize) -> String {
        let head = format!("{}{}:", pad(indent), format_key(key, false));
        match self.value_after(value, Some(key), indent) {
            Rendered::Inline(text) => format!("{} {}", head, text),
            Rendered::Block(text) => format!("{}\n{}", head, text),
        }
    }

    /// `- value` with the dash at `indent`. Nested block collections start
    /// on the dash line.
    pub fn item(&self, value: &Value, indent: usize) -> String {
        let nested = indent + 2;
        let block = match value {
            Value::Object(map) if !map.is_empty() => Some(self.block_map(map, nested)),
            Value::Array(items) if !items.is_empty() && !self.inline_sequence(items, None) => {
                Some(self.block_seq(items, nested))
            }
            _ => None,
        };

        match block {
            Some(text) => format!("{}- {}", pad(indent), &text[nested..]),
            None => match self.value_after(value, None, indent) {
                Rendered::Inline(text) => format!("{}- {}", pad(indent), text),
                Rendered::Block(text) => format!("{}-\n{}", pad(indent), text),
            },
        }
    }

    /// Single-line flow text
    pub fn flow(&self, value: &Value) -> String {
        match value {
            Value::Object(map) if map.is_empty() => String::from("{}"),
            Value::Object(map) => {
                let entries: Vec<String> = map
                    .iter()
                    .map(|(key, value)| format!("{}: {}", format_key(key, true), self.flow(value)))
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
            Value::Array(items) => {
                let items: Vec<String> = items.iter().map(|item| self.flow(item)).collect();
                format!("[{}]", items.join(", "))
            }
            scalar => self.scalar(scalar, ScalarStyle::Plain, 0, true),
        }
    }

    /// A scalar, keeping `style` where it can hold the value. Block scalar
    /// content lines are indented to `indent`.
    pub fn scalar(&self, value: &Value, style: ScalarStyle, indent: usize, in_flow: bool) -> String {
        let text = match value {
            Value::String(text) => text,
            Value::Null => return String::from("null"),
            Value::Object(_) | Value::Array(_) => return self.flow(value),
            other => return other.to_string(),
        };

        let literal_ok = !in_flow && scalar::is_literal_safe(text);
        let single_ok = !text.contains('\n') && !text.chars().any(char::is_control);

        match style {
            ScalarStyle::DoubleQuoted => scalar::quote_double(text),
            ScalarStyle::SingleQuoted if single_ok => scalar::quote_single(text),
            ScalarStyle::Literal | ScalarStyle::Folded if literal_ok => literal(text, indent),
            _ if scalar::is_plain_safe(text, in_flow, false) => text.clone(),
            _ if literal_ok => literal(text, indent),
            _ if single_ok => scalar::quote_single(text),
            _ => scalar::quote_double(text),
        }
    }

    /// New scalar-only sequences short enough for the policy's limit are
    /// written `[a, b]`
    pub fn inline_sequence(&self, items: &[Value], key: Option<&str>) -> bool {
        let Some(limit) = self.policy.inline_sequence_limit else {
            return false;
        };
        if key.is_some_and(|key| self.policy.force_block_style(key)) {
            return false;
        }

        items.len() <= limit
            && items.iter().all(|item| match item {
                Value::String(text) => !text.contains('\n'),
                other => kind_of(other) == ValueKind::Scalar,
            })
    }
}

fn literal(text: &str, indent: usize) -> String {
    let header = BlockHeader {
        folded: false,
        chomping: scalar::chomping_for(text),
        indent: None,
    };
    let body = text.strip_suffix('\n').unwrap_or(text);

    let mut lines = vec![header.indicator()];
    lines.extend(body.split('\n').map(|line| {
        if line.is_empty() {
            String::new()
        } else {
            format!("{}{}", pad(indent), line)
        }
    }));
    lines.join("\n")
}

pub(crate) fn format_key(key: &str, in_flow: bool) -> String {
    if scalar::is_plain_safe(key, in_flow, true) {
        key.to_string()
    } else if !key.contains('\n') && !key.chars().any(char::is_control) {
        scalar::quote_single(key)
    } else {
        scalar::quote_double(key)
    }
}

pub(crate) fn pad(indent: usize) -> String {
    " ".repeat(indent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn renderer(policy: &PatchPolicy) -> Renderer<'_> {
        Renderer::new(policy, 2)
    }

    #[test]
    fn test_render_document() {
        let policy = PatchPolicy::default();
        let value = json!({
            "title": "Pet Store",
            "version": 2,
            "servers": [{"url": "http://localhost", "port": 8080}]
        });
        assert_eq!(
            renderer(&policy).document(&value),
            "title: Pet Store\nversion: 2\nservers:\n  - url: http://localhost\n    port: 8080\n"
        );
    }

    #[test]
    fn test_render_quotes_ambiguous_strings() {
        let policy = PatchPolicy::default();
        let value = json!({"a": "1.0", "b": "true", "c": "key: value", "d": "", "e": "tab\there", "f": null});
        assert_eq!(
            renderer(&policy).document(&value),
            "a: '1.0'\nb: 'true'\nc: 'key: value'\nd: ''\ne: \"tab\\there\"\nf: null\n"
        );
    }

    #[test]
    fn test_render_multiline_as_literal() {
        let policy = PatchPolicy::default();
        let output = renderer(&policy).document(&json!({"text": "line one\nline two\n"}));
        assert_eq!(output, "text: |\n  line one\n  line two\n");
    }

    #[test]
    fn test_render_keys_and_empty_collections() {
        let policy = PatchPolicy::default();
        let value = json!({"200": "ok", "/pets/{id}": "path", "a: b": 1, "items": [], "meta": {}});
        assert_eq!(
            renderer(&policy).document(&value),
            "200: ok\n/pets/{id}: path\n'a: b': 1\nitems: []\nmeta: {}\n"
        );
    }

    #[test]
    fn test_render_nested_sequences_compact() {
        let policy = PatchPolicy::default();
        let output = renderer(&policy).document(&json!([["a", "b"], {"k": "v"}]));
        assert_eq!(output, "- - a\n  - b\n- k: v\n");
    }

    #[test]
    fn test_flow_rendering() {
        let policy = PatchPolicy::default();
        let r = renderer(&policy);
        assert_eq!(r.flow(&json!({"a": [1, "b c"], "d": "x,y"})), "{a: [1, b c], d: 'x,y'}");
        assert_eq!(r.scalar(&json!("it's"), ScalarStyle::SingleQuoted, 0, false), "'it''s'");
    }
}
