//! Core schema resolution of plain scalars.
//!
//! A plain scalar like `42` or `~` is not a string. The same classifier
//! decodes plain scalars and decides whether a string may be written plain.

use logos::Logos;

/// Core schema classes a plain scalar can resolve to
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlainClass {
    #[token("~")]
    #[token("null")]
    #[token("Null")]
    #[token("NULL")]
    Null,

    #[token("true")]
    #[token("True")]
    #[token("TRUE")]
    True,

    #[token("false")]
    #[token("False")]
    #[token("FALSE")]
    False,

    #[regex(r"[-+]?[0-9]+")]
    Decimal,

    #[regex(r"0o[0-7]+")]
    Octal,

    #[regex(r"0x[0-9a-fA-F]+")]
    Hex,

    #[regex(r"[-+]?(\.[0-9]+|[0-9]+\.[0-9]*)([eE][-+]?[0-9]+)?")]
    #[regex(r"[-+]?[0-9]+[eE][-+]?[0-9]+")]
    Float,

    #[regex(r"[-+]?\.(inf|Inf|INF)")]
    #[regex(r"\.(nan|NaN|NAN)")]
    SpecialFloat,
}

/// Classify a complete plain scalar. Returns `None` for ordinary strings.
pub fn classify_plain(text: &str) -> Option<PlainClass> {
    let mut lexer = PlainClass::lexer(text);
    match lexer.next() {
        Some(Ok(class)) if lexer.span() == (0..text.len()) => Some(class),
        _ => None,
    }
}
