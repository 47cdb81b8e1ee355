//! Textual edits against parsed source

use crate::error::SyntaxError;

/// Insertion of text at a byte offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub offset: usize,
    pub text: String,
}

impl TextEdit {
    /// Insert `text` at `offset`
    #[must_use]
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self {
            offset,
            text: text.into(),
        }
    }
}

/// Apply insertions to `source`
///
/// Offsets refer to the original text; edits are applied back to front so
/// earlier offsets stay valid. Edits at the same offset keep their order.
///
/// # Errors
/// Returns `SyntaxError::InvalidEdit` if an offset is past the end of the
/// text or splits a UTF-8 character.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> Result<String, SyntaxError> {
    for edit in edits {
        if edit.offset > source.len() || !source.is_char_boundary(edit.offset) {
            return Err(SyntaxError::InvalidEdit {
                offset: edit.offset,
                len: source.len(),
            });
        }
    }

    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by_key(|e| std::cmp::Reverse(e.offset));

    let mut out = source.to_string();
    let mut same_offset: Vec<&TextEdit> = Vec::new();
    for edit in ordered {
        if same_offset.last().is_some_and(|e| e.offset != edit.offset) {
            flush(&mut out, &mut same_offset);
        }
        same_offset.push(edit);
    }
    flush(&mut out, &mut same_offset);
    Ok(out)
}

fn flush(out: &mut String, group: &mut Vec<&TextEdit>) {
    if let Some(first) = group.first() {
        let offset = first.offset;
        let text: String = group.iter().map(|e| e.text.as_str()).collect();
        out.insert_str(offset, &text);
    }
    group.clear();
}
