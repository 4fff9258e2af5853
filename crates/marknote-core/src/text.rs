//! Text splicing for the body editor.
//!
//! Both operations take a `(text, cursor)` pair and return a new pair. Cursor
//! positions count Unicode scalar values, not bytes, and a cursor past the end
//! of the text is treated as the end.

/// Result of a splice: the new text and where the cursor lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub text: String,
    pub cursor: usize,
}

/// Closing character for an auto-closed opener.
pub fn closing_pair(opener: char) -> Option<char> {
    match opener {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        '<' => Some('>'),
        '"' => Some('"'),
        _ => None,
    }
}

/// Insert a typed character, auto-closing brackets and quotes.
///
/// For an opener the matching closer is inserted right after it and the
/// cursor sits between the two; `(` at `p` in `T` gives
/// `T[..p] + "()" + T[p..]` with the cursor at `p + 1`. Any other character
/// is inserted as-is.
pub fn auto_close(text: &str, cursor: usize, typed: char) -> Splice {
    let mut inserted = String::with_capacity(2);
    inserted.push(typed);
    if let Some(closer) = closing_pair(typed) {
        inserted.push(closer);
    }
    splice(text, cursor, &inserted, 1)
}

/// Insert `snippet` at the cursor and advance the cursor by `advance` chars,
/// defaulting to the snippet's length.
pub fn insert_snippet(text: &str, cursor: usize, snippet: &str, advance: Option<usize>) -> Splice {
    let advance = advance.unwrap_or_else(|| snippet.chars().count());
    splice(text, cursor, snippet, advance)
}

fn splice(text: &str, cursor: usize, inserted: &str, advance: usize) -> Splice {
    let char_len = text.chars().count();
    let cursor = cursor.min(char_len);
    let at = byte_offset(text, cursor);

    let mut out = String::with_capacity(text.len() + inserted.len());
    out.push_str(&text[..at]);
    out.push_str(inserted);
    out.push_str(&text[at..]);

    let max = char_len + inserted.chars().count();
    Splice {
        text: out,
        cursor: (cursor + advance).min(max),
    }
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Toolbar snippets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Snippet {
    /// Open checklist item.
    Checkbox,
    /// Checked checklist item.
    CheckboxDone,
    /// Empty fenced code block; the cursor lands on the blank line inside.
    CodeFence,
}

impl Snippet {
    pub fn text(&self) -> &'static str {
        match self {
            Snippet::Checkbox => "- [ ] ",
            Snippet::CheckboxDone => "- [x] ",
            Snippet::CodeFence => "```\n\n```",
        }
    }

    /// Cursor advance after insertion, when it differs from the text length.
    pub fn cursor_advance(&self) -> Option<usize> {
        match self {
            Snippet::CodeFence => Some(4),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Snippet::Checkbox => "T",
            Snippet::CheckboxDone => "Tx",
            Snippet::CodeFence => "```",
        }
    }

    pub fn apply(&self, text: &str, cursor: usize) -> Splice {
        insert_snippet(text, cursor, self.text(), self.cursor_advance())
    }
}
