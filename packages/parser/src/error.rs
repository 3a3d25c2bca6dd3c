//! Error types for the YAML parser

use thiserror::Error;

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Location of an error in the source text.
///
/// `line` and `column` are 1-based; `offset` is the byte offset into the
/// original source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    /// Position of byte `offset` in `text`
    pub fn in_text(text: &str, offset: usize) -> Self {
        let mut offset = offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &text[..offset];
        let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
        Self {
            line: before.matches('\n').count() + 1,
            column: before[line_start..].chars().count() + 1,
            offset,
        }
    }

    /// Position of a 1-based `line` and 0-based character `column`
    pub fn at_line(text: &str, line: usize, column: usize) -> Self {
        let line_start = text
            .split_inclusive('\n')
            .take(line.saturating_sub(1))
            .map(str::len)
            .sum::<usize>();
        let offset = text[line_start..]
            .char_indices()
            .nth(column)
            .map_or(text.len(), |(idx, _)| line_start + idx);
        Self::in_text(text, offset)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Invalid syntax at {pos}: {message}")]
    InvalidSyntax { pos: Position, message: String },

    #[error("Mapping entry without a key at {pos}")]
    MissingKey { pos: Position },

    #[error("Duplicate mapping key '{key}' at {pos}")]
    DuplicateKey { pos: Position, key: String },

    #[error("Unsupported construct at {pos}: {message}")]
    Unsupported { pos: Position, message: String },

    #[error("Unknown alias '*{name}' at {pos}")]
    UnknownAlias { pos: Position, name: String },
}

impl ParseError {
    pub fn invalid_syntax(pos: Position, message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            pos,
            message: message.into(),
        }
    }

    pub fn unsupported(pos: Position, message: impl Into<String>) -> Self {
        Self::Unsupported {
            pos,
            message: message.into(),
        }
    }

    pub fn position(&self) -> Position {
        match self {
            ParseError::InvalidSyntax { pos, .. }
            | ParseError::MissingKey { pos }
            | ParseError::DuplicateKey { pos, .. }
            | ParseError::Unsupported { pos, .. }
            | ParseError::UnknownAlias { pos, .. } => *pos,
        }
    }

    /// The same error with its position moved by `f`
    pub fn map_position(mut self, f: impl FnOnce(Position) -> Position) -> Self {
        match &mut self {
            ParseError::InvalidSyntax { pos, .. }
            | ParseError::MissingKey { pos }
            | ParseError::DuplicateKey { pos, .. }
            | ParseError::Unsupported { pos, .. }
            | ParseError::UnknownAlias { pos, .. } => *pos = f(*pos),
        }
        self
    }

    fn label(&self) -> String {
        match self {
            ParseError::InvalidSyntax { message, .. } | ParseError::Unsupported { message, .. } => message.clone(),
            ParseError::MissingKey { .. } => String::from("add a key before ':'"),
            ParseError::DuplicateKey { key, .. } => format!("'{}' is already defined", key),
            ParseError::UnknownAlias { name, .. } => format!("no anchor named '{}'", name),
        }
    }
}

/// Pretty-print an error with source context using ariadne
#[cfg(feature = "pretty-errors")]
pub fn format_error(source: &str, filename: &str, error: &ParseError) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let start = error.position().offset.min(source.len());
    let end = source[start..]
        .find('\n')
        .map(|len| start + len.max(1))
        .unwrap_or(source.len())
        .max(start);

    let mut output = Vec::new();
    let report = Report::build(ReportKind::Error, filename, start)
        .with_message(error.to_string())
        .with_label(
            Label::new((filename, start..end))
                .with_color(Color::Red)
                .with_message(error.label()),
        )
        .finish();

    if report
        .write((filename, Source::from(source)), &mut output)
        .is_err()
    {
        return error.to_string();
    }

    String::from_utf8(output).unwrap_or_else(|_| error.to_string())
}

/// Plain rendering used when the `pretty-errors` feature is disabled
#[cfg(not(feature = "pretty-errors"))]
pub fn format_error(_source: &str, filename: &str, error: &ParseError) -> String {
    format!("{}: {} ({})", filename, error, error.label())
}
