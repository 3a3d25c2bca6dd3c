//! Quoting rules for scalars written into a document.

use crate::value::resolves_to_string;

/// Chomping indicator of a block scalar header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chomping {
    Clip,
    Strip,
    Keep,
}

/// Parsed `|` / `>` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub folded: bool,
    pub chomping: Chomping,
    pub indent: Option<usize>,
}

impl BlockHeader {
    /// Parse a header such as `|`, `>-`, `|2+`. Returns the header and its
    /// length in bytes.
    pub fn parse(text: &str) -> Option<(Self, usize)> {
        let mut chars = text.char_indices();
        let folded = match chars.next()? {
            (_, '|') => false,
            (_, '>') => true,
            _ => return None,
        };

        let mut header = BlockHeader {
            folded,
            chomping: Chomping::Clip,
            indent: None,
        };
        let mut len = 1;
        for (idx, ch) in chars {
            match ch {
                '-' if header.chomping == Chomping::Clip => header.chomping = Chomping::Strip,
                '+' if header.chomping == Chomping::Clip => header.chomping = Chomping::Keep,
                '1'..='9' if header.indent.is_none() => {
                    header.indent = Some(ch as usize - '0' as usize)
                }
                ' ' | '\t' => break,
                _ => return None,
            }
            len = idx + 1;
        }

        Some((header, len))
    }

    pub fn indicator(&self) -> String {
        let mut out = String::from(if self.folded { ">" } else { "|" });
        if let Some(indent) = self.indent {
            out.push_str(&indent.to_string());
        }
        match self.chomping {
            Chomping::Clip => {}
            Chomping::Strip => out.push('-'),
            Chomping::Keep => out.push('+'),
        }
        out
    }
}

pub fn quote_single(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

pub fn quote_double(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c if (c as u32) < 0x20 || c == '\x7f' => out.push_str(&format!("\\x{:02X}", c as u32)),
            '\u{85}' => out.push_str("\\N"),
            '\u{2028}' => out.push_str("\\L"),
            '\u{2029}' => out.push_str("\\P"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Whether a string may be written as a plain scalar without changing
/// meaning. Keys may keep a numeric look since mapping keys always decode
/// as strings.
pub fn is_plain_safe(text: &str, in_flow: bool, is_key: bool) -> bool {
    let Some(first) = text.chars().next() else {
        return false;
    };

    if text.trim() != text || text.chars().any(char::is_control) {
        return false;
    }
    if matches!(
        first,
        '[' | ']' | '{' | '}' | '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%' | '@' | '`' | ','
    ) {
        return false;
    }
    if matches!(first, '-' | '?' | ':') && matches!(text[1..].chars().next(), None | Some(' ')) {
        return false;
    }
    if text.contains(": ") || text.contains(" #") || text.ends_with(':') {
        return false;
    }
    if text.starts_with("---") || text.starts_with("...") {
        return false;
    }
    if in_flow && text.contains([',', '[', ']', '{', '}', ':']) {
        return false;
    }
    if resolves_to_string(text) {
        return true;
    }

    is_key && crate::value::resolve_plain(text).is_number()
}

/// Whether a string can be written as a literal block scalar that decodes
/// back to exactly the same string
pub fn is_literal_safe(text: &str) -> bool {
    text.contains('\n')
        && text.trim_end_matches('\n').chars().any(|c| c != ' ')
        && !text.starts_with(' ')
        && !text.starts_with('\n')
        && !text.chars().any(|c| c.is_control() && c != '\n' && c != '\t')
        && !text.lines().any(|line| line.ends_with(' ') || line.ends_with('\t'))
}

/// Header chomping needed to reproduce the trailing newlines of `text`
pub fn chomping_for(text: &str) -> Chomping {
    if text.ends_with("\n\n") {
        Chomping::Keep
    } else if text.ends_with('\n') {
        Chomping::Clip
    } else {
        Chomping::Strip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_header_parse() {
        let (header, len) = BlockHeader::parse("|-").unwrap();
        assert!(!header.folded);
        assert_eq!(header.chomping, Chomping::Strip);
        assert_eq!(len, 2);

        let (header, len) = BlockHeader::parse(">2+ # note").unwrap();
        assert!(header.folded);
        assert_eq!(header.indent, Some(2));
        assert_eq!(header.chomping, Chomping::Keep);
        assert_eq!(len, 3);
        assert_eq!(header.indicator(), ">2+");

        assert!(BlockHeader::parse("|x").is_none());
    }

    #[test]
    fn test_quote_double_escapes() {
        assert_eq!(quote_double("a\"b\n"), r#""a\"b\n""#);
        assert_eq!(quote_double("\x01"), r#""\x01""#);
    }

    #[test]
    fn test_plain_safety() {
        assert!(is_plain_safe("hello world", false, false));
        assert!(is_plain_safe("http://example.com", false, false));
        assert!(!is_plain_safe("http://example.com", true, false));
        assert!(!is_plain_safe("1.0", false, false));
        assert!(!is_plain_safe("true", false, false));
        assert!(!is_plain_safe("a: b", false, false));
        assert!(!is_plain_safe("- item", false, false));
        assert!(!is_plain_safe("", false, false));
        assert!(!is_plain_safe(" padded", false, false));
        assert!(!is_plain_safe(".nan", false, false));
        assert!(is_plain_safe("200", false, true));
        assert!(!is_plain_safe("null", false, true));
    }

    #[test]
    fn test_literal_safety() {
        assert!(is_literal_safe("line one\nline two\n"));
        assert!(!is_literal_safe("single line"));
        assert!(!is_literal_safe(" leading\nspace"));
        assert!(!is_literal_safe("trailing \nspace"));
    }
}
