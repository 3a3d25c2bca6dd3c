use crate::ast::{Document, Edit};

const BOM: char = '\u{feff}';

/// Write a document back to text.
///
/// The source is copied as it was read with the queued edits spliced in.
/// Edits apply in order of their start offset; an edit that starts inside
/// the span of one applied before it is dropped. Bytes no edit covers come
/// out unchanged, so an unedited document reproduces its input exactly.
pub fn serialize(doc: &Document) -> String {
    let source = doc.source();
    let mut edits: Vec<&Edit> = doc.edits().iter().collect();
    edits.sort_by_key(|edit| edit.span.start);

    let extra: usize = edits.iter().map(|edit| edit.text.len()).sum();
    let mut output = String::with_capacity(source.len() + extra + BOM.len_utf8());
    if doc.has_bom() {
        output.push(BOM);
    }

    let mut cursor = 0;
    for edit in edits {
        let span = edit.span;
        if span.start < cursor || span.end > source.len() {
            continue;
        }
        output.push_str(&source[cursor..span.start]);
        output.push_str(&edit.text);
        cursor = span.end.max(span.start);
    }
    output.push_str(&source[cursor..]);
    output
}
