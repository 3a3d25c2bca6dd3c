//! # yamlpatch parser
//!
//! Lossless YAML reading and writing for the structural patcher.
//!
//! ```text
//! source text ──parse──▶ Document (source + span tree) ──to_value──▶ Value
//!      ▲                        │ queued edits
//!      └──────serialize─────────┘
//! ```
//!
//! `serialize(parse(text))` reproduces `text` byte for byte. The editor
//! crate queues span edits in between; bytes outside them are copied as is.

pub mod ast;
pub mod error;
pub mod loader;
pub mod parser;
pub mod scalar;
pub mod schema;
pub mod serializer;
pub mod value;

#[cfg(test)]
mod tests_roundtrip;

pub use ast::{Document, Edit, Layout, MapEntry, MapNode, Node, NodeKind, Props, ScalarStyle, SeqItem, SeqNode, Span};
pub use error::{format_error, ParseError, ParseResult, Position};
pub use parser::{parse, Parser};
pub use serializer::serialize;
pub use value::{core_tag, kind_of, tag_admits, values_equal, Value, ValueKind};
