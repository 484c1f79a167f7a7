use std::fmt::Write;

use crate::error::{Result, VaultError};
use crate::models::{Hit, HitRecord, format_iso};

/// JSON array of [`HitRecord`]s, pretty-printed.
pub fn render_json(hits: &[Hit<'_>]) -> Result<String> {
    let records: Vec<HitRecord<'_>> = hits.iter().map(Hit::to_record).collect();
    serde_json::to_string_pretty(&records)
        .map_err(|e| VaultError::Format(format!("failed to serialize hits: {}", e)))
}

/// Markdown report: one section per hit with metadata, quoted message text and code blocks.
pub fn render_markdown(hits: &[Hit<'_>]) -> String {
    let mut out = String::from("# Chat Vault Search Results\n\n");

    for (i, hit) in hits.iter().enumerate() {
        let conversation = hit.conversation;
        let message = hit.message;

        let _ = writeln!(out, "## {}. {} (`{}`)\n", i + 1, conversation.title, conversation.id);
        if let Some(created) = conversation.create_time {
            let _ = writeln!(out, "- **Conversation Created:** `{}`", format_iso(created));
        }
        let _ = writeln!(out, "- **Message ID:** `{}`", message.id);
        let time = message.timestamp.map(format_iso).unwrap_or_else(|| "unknown".to_string());
        let _ = writeln!(out, "- **Role:** `{}` · **Time:** `{}`\n", message.author_role, time);

        out.push_str("### Message\n\n");
        for line in message.text.lines() {
            if line.is_empty() {
                out.push_str(">\n");
            } else {
                let _ = writeln!(out, "> {}", line);
            }
        }
        out.push('\n');

        let blocks = hit.code_blocks();
        if !blocks.is_empty() {
            out.push_str("### Code Blocks\n\n");
            for (j, block) in blocks.iter().enumerate() {
                let label = if block.language.is_empty() { "text" } else { &block.language };
                let _ = writeln!(out, "**Block {}** ({})\n", j + 1, label);
                let fence = fence_for(&block.code);
                let _ = writeln!(out, "{}{}\n{}\n{}\n", fence, block.language, block.code, fence);
            }
        }
    }

    out
}

/// Backtick fence longer than any backtick run inside `code`, at least three long.
fn fence_for(code: &str) -> String {
    let longest = code
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

/// Plain-text listing: title, ids, time and snippet per hit; no code bodies.
pub fn render_text(hits: &[Hit<'_>]) -> String {
    let mut out = String::new();

    for (i, hit) in hits.iter().enumerate() {
        let time = hit.message.timestamp.map(format_iso).unwrap_or_else(|| "unknown".to_string());
        let _ = writeln!(out, "[{}] {}", i + 1, hit.conversation.title);
        let _ = writeln!(out, "  conversation: {}", hit.conversation.id);
        let _ = writeln!(out, "  message: {} ({})", hit.message.id, hit.message.author_role);
        let _ = writeln!(out, "  time: {}", time);
        let _ = writeln!(out, "  snippet: {}", hit.snippet);
        out.push('\n');
    }

    out
}
