use std::borrow::Cow;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::conversation::{CodeBlock, Conversation, Message};

/// Which part of the conversation produced a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Title,
    Message,
}

/// One matched (conversation, message) pair.
///
/// Borrows from the normalised conversations; only the snippet is owned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit<'a> {
    pub conversation: &'a Conversation,
    pub message: &'a Message,
    pub kind: HitKind,
    pub snippet: String,
}

impl<'a> Hit<'a> {
    pub fn full_text(&self) -> &'a str {
        &self.message.text
    }

    pub fn code_blocks(&self) -> &'a [CodeBlock] {
        self.message.code_blocks()
    }

    pub fn to_record(&self) -> HitRecord<'a> {
        HitRecord {
            conversation_id: Cow::Borrowed(&self.conversation.id),
            conversation_title: Cow::Borrowed(&self.conversation.title),
            conversation_create_time: self.conversation.create_time.map(format_iso),
            message_id: Cow::Borrowed(&self.message.id),
            author_role: Cow::Borrowed(self.message.author_role.as_str()),
            message_time: self.message.timestamp.map(format_iso),
            snippet: Cow::Owned(self.snippet.clone()),
            full_text: Cow::Borrowed(&self.message.text),
            code_blocks: Cow::Borrowed(self.message.code_blocks()),
        }
    }
}

/// Flat, serialisable view of a [`Hit`]; the JSON export schema.
///
/// Field order is the on-disk order and must stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitRecord<'a> {
    pub conversation_id: Cow<'a, str>,
    pub conversation_title: Cow<'a, str>,
    pub conversation_create_time: Option<String>,
    pub message_id: Cow<'a, str>,
    pub author_role: Cow<'a, str>,
    pub message_time: Option<String>,
    pub snippet: Cow<'a, str>,
    pub full_text: Cow<'a, str>,
    pub code_blocks: Cow<'a, [CodeBlock]>,
}

pub fn format_iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Counters for one pipeline run, reported alongside the hits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Raw conversation records found in the document
    pub conversations_total: usize,
    /// Conversations the match engine looked at
    pub conversations_scanned: usize,
    /// Conversations dropped during normalisation (malformed structure)
    pub conversations_skipped: usize,
    /// Conversations excluded by the title filter
    pub conversations_filtered: usize,
    pub messages_scanned: usize,
    pub hits: usize,
    pub cancelled: bool,
}

impl RunStats {
    pub fn errors(&self) -> usize {
        self.conversations_skipped
    }
}
