use std::cell::OnceCell;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::parsers::code_blocks::extract_code_blocks;

/// Placeholder used when a conversation carries no title.
pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorRole {
    User,
    Assistant,
    System,
    Tool,
    Unknown,
}

impl AuthorRole {
    pub fn from_raw(role: &str) -> Self {
        match role.trim().to_ascii_lowercase().as_str() {
            "user" => Self::User,
            "assistant" => Self::Assistant,
            "system" => Self::System,
            "tool" => Self::Tool,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
            Self::Tool => "tool",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AuthorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fenced code region inside a message's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub language: String,
    pub code: String,
}

/// One utterance within a conversation.
///
/// Text is never empty for normalised messages. Code blocks are extracted on first access and
/// cached for the lifetime of the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub author_role: AuthorRole,
    pub timestamp: Option<DateTime<Utc>>,
    pub text: String,
    code_blocks: OnceCell<Vec<CodeBlock>>,
}

impl Message {
    pub fn new(
        id: impl Into<String>,
        author_role: AuthorRole,
        timestamp: Option<DateTime<Utc>>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            author_role,
            timestamp,
            text: text.into(),
            code_blocks: OnceCell::new(),
        }
    }

    pub fn code_blocks(&self) -> &[CodeBlock] {
        self.code_blocks.get_or_init(|| extract_code_blocks(&self.text))
    }

    pub fn has_code(&self) -> bool {
        !self.code_blocks().is_empty()
    }
}

/// One chat session with its canonical, chronologically ordered thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub create_time: Option<DateTime<Utc>>,
    pub messages: Vec<Message>,
}

/// Normalised archive: the conversations that survived normalisation, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vault {
    pub conversations: Vec<Conversation>,
    /// Number of raw conversation records in the source document
    pub raw_count: usize,
    /// Raw records dropped as malformed
    pub skipped: usize,
}

impl Vault {
    pub fn message_count(&self) -> usize {
        self.conversations.iter().map(|c| c.messages.len()).sum()
    }
}
