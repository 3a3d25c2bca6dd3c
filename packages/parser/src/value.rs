//! # Value Model
//!
//! The plain semantic shape a document encodes, with no formatting:
//! scalars (null, bool, number, string), ordered mappings with unique
//! string keys, and ordered sequences.
//!
//! `serde_json::Value` is used as the representation. The workspace enables
//! `preserve_order`, so mappings remember insertion order, which is the order
//! new keys are appended to a document in.

use crate::schema::{classify_plain, PlainClass};
pub use serde_json::{Map, Number, Value};

/// Coarse shape of a value, used by the patcher to pick a strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Scalar,
    Mapping,
    Sequence,
}

pub fn kind_of(value: &Value) -> ValueKind {
    match value {
        Value::Object(_) => ValueKind::Mapping,
        Value::Array(_) => ValueKind::Sequence,
        _ => ValueKind::Scalar,
    }
}

/// Canonical structural equality.
///
/// Mappings compare without regard to key order, sequences compare
/// element-wise in order, and scalars are type sensitive: `1`, `1.0` and
/// `"1"` are three different values.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(left), Value::Object(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .all(|(key, value)| right.get(key).is_some_and(|other| values_equal(value, other)))
        }
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .zip(right.iter())
                    .all(|(value, other)| values_equal(value, other))
        }
        (Value::Number(left), Value::Number(right)) => numbers_equal(left, right),
        _ => a == b,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    match (a.is_f64(), b.is_f64()) {
        (true, true) => a.as_f64() == b.as_f64(),
        (false, false) => a.as_i64() == b.as_i64() && a.as_u64() == b.as_u64(),
        _ => false,
    }
}

/// Resolve a plain (unquoted) scalar using the YAML 1.2 core schema.
///
/// `.inf` and `.nan` resolve to strings because the value model has no way to
/// hold non-finite floats.
pub fn resolve_plain(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }

    match classify_plain(text) {
        Some(PlainClass::Null) => Value::Null,
        Some(PlainClass::True) => Value::Bool(true),
        Some(PlainClass::False) => Value::Bool(false),
        Some(PlainClass::Decimal) => resolve_int(text, text, 10),
        Some(PlainClass::Octal) => resolve_int(text, &text[2..], 8),
        Some(PlainClass::Hex) => resolve_int(text, &text[2..], 16),
        Some(PlainClass::Float) => resolve_float(text),
        Some(PlainClass::SpecialFloat) | None => Value::String(text.to_string()),
    }
}

fn resolve_int(text: &str, digits: &str, radix: u32) -> Value {
    if let Ok(n) = i64::from_str_radix(digits, radix) {
        return Value::Number(n.into());
    }
    if let Ok(n) = u64::from_str_radix(digits.trim_start_matches('+'), radix) {
        return Value::Number(n.into());
    }
    if radix == 10 {
        return resolve_float(text);
    }
    Value::String(text.to_string())
}

fn resolve_float(text: &str) -> Value {
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(text.to_string()))
}

/// Suffix of a tag from the YAML core schema (`!!int` gives `int`)
pub fn core_tag(tag: &str) -> Option<&str> {
    tag.strip_prefix("!!")
        .or_else(|| tag.strip_prefix("tag:yaml.org,2002:"))
        .or_else(|| {
            tag.strip_prefix("!<tag:yaml.org,2002:")
                .and_then(|rest| rest.strip_suffix('>'))
        })
}

/// Resolve a plain scalar carrying the core schema tag `suffix`. `None`
/// when the text is not a valid value of that type.
pub fn resolve_tagged(text: &str, suffix: &str) -> Option<Value> {
    match suffix {
        "null" => matches!(classify_plain(text), Some(PlainClass::Null)).then_some(Value::Null),
        "bool" => match classify_plain(text) {
            Some(PlainClass::True) => Some(Value::Bool(true)),
            Some(PlainClass::False) => Some(Value::Bool(false)),
            _ => None,
        },
        "int" => match resolve_plain(text) {
            Value::Number(n) if !n.is_f64() => Some(Value::Number(n)),
            _ => None,
        },
        "float" => match resolve_plain(text) {
            Value::Number(n) => n.as_f64().and_then(Number::from_f64).map(Value::Number),
            special if classify_plain(text) == Some(PlainClass::SpecialFloat) => Some(special),
            _ => None,
        },
        _ => Some(Value::String(text.to_string())),
    }
}

/// Whether a node tagged `tag` can hold `value` once its text is replaced
pub fn tag_admits(tag: &str, value: &Value) -> bool {
    match core_tag(tag) {
        Some("null") => value.is_null(),
        Some("bool") => value.is_boolean(),
        Some("int") => value.is_i64() || value.is_u64(),
        Some("float") => value.is_f64(),
        Some("map") => value.is_object(),
        Some("seq") => value.is_array(),
        _ => value.is_string(),
    }
}

/// True when `text` would be read back as the string `text` if written plain
pub fn resolves_to_string(text: &str) -> bool {
    !text.is_empty() && classify_plain(text).is_none()
}
