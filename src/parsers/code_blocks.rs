use crate::models::CodeBlock;

const FENCES: [&str; 2] = ["```", "~~~"];

/// Extract fenced code blocks from message text, in order of appearance.
///
/// The text after an opening fence up to the end of that line carries the language tag
/// (its first word, possibly empty). The body runs to the next occurrence of the same fence,
/// minus one trailing newline. An unterminated fence ends extraction without producing a block.
pub fn extract_code_blocks(text: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut cursor = 0;

    while let Some((open, fence)) = next_fence(text, cursor) {
        let after_fence = open + fence.len();
        let Some(newline) = text[after_fence..].find('\n') else {
            break;
        };
        let body_start = after_fence + newline + 1;
        let Some(close) = text[body_start..].find(fence) else {
            break;
        };
        let body_end = body_start + close;

        let info = &text[after_fence..after_fence + newline];
        let body = &text[body_start..body_end];
        let body = body.strip_suffix('\n').unwrap_or(body);
        let body = body.strip_suffix('\r').unwrap_or(body);

        blocks.push(CodeBlock { language: language_tag(info, fence), code: body.to_string() });
        cursor = body_end + fence.len();
    }

    blocks
}

/// Earliest fence of either kind at or after `from`.
fn next_fence(text: &str, from: usize) -> Option<(usize, &'static str)> {
    FENCES
        .iter()
        .filter_map(|fence| text[from..].find(fence).map(|pos| (from + pos, *fence)))
        .min_by_key(|(pos, _)| *pos)
}

fn language_tag(info: &str, fence: &str) -> String {
    let fence_char = fence.chars().next().unwrap_or('`');
    info.trim_start_matches(fence_char)
        .trim()
        .split(|c: char| c.is_whitespace() || c == fence_char)
        .next()
        .unwrap_or_default()
        .to_string()
}
