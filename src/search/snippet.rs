use std::ops::Range;

/// Maximum characters of context taken from a message around the match.
pub const MESSAGE_SNIPPET_WIDTH: usize = 200;

/// Maximum characters taken from a conversation title.
pub const TITLE_SNIPPET_WIDTH: usize = 80;

const ELLIPSIS: char = '…';

/// Excerpt of at most `width` characters of `text`, centred on the byte range `matched`.
///
/// Whitespace runs are collapsed to single spaces and each truncated side is marked with `…`.
pub fn make_snippet(text: &str, matched: Range<usize>, width: usize) -> String {
    let total = text.chars().count();
    let (start, end) = if total <= width {
        (0, total)
    } else {
        let match_start = char_index(text, matched.start);
        let match_len = char_index(text, matched.end).saturating_sub(match_start);
        let lead = width.saturating_sub(match_len) / 2;
        let start = match_start.saturating_sub(lead).min(total - width);
        (start, start + width)
    };

    let window = slice_chars(text, start, end);
    let mut snippet = String::with_capacity(window.len() + 8);
    if start > 0 {
        snippet.push(ELLIPSIS);
    }
    snippet.push_str(&window.split_whitespace().collect::<Vec<_>>().join(" "));
    if end < total {
        snippet.push(ELLIPSIS);
    }
    snippet
}

/// Number of characters before byte offset `byte` (clamped to the text).
fn char_index(text: &str, byte: usize) -> usize {
    let byte = byte.min(text.len());
    text.char_indices().take_while(|(i, _)| *i < byte).count()
}

fn slice_chars(text: &str, start: usize, end: usize) -> &str {
    let mut offsets = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len()));
    let from = offsets.nth(start).unwrap_or(text.len());
    let to = if end > start {
        offsets.nth(end - start - 1).unwrap_or(text.len())
    } else {
        from
    };
    &text[from..to]
}
