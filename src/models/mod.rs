//! Data models for normalised chat archives and search results.
//!
//! - [`Conversation`] / [`Message`] - uniform record model produced by the normaliser
//! - [`Vault`] - all normalised conversations of one archive plus skip counts
//! - [`CodeBlock`] - fenced code region, derived lazily from message text
//! - [`Hit`] - one match produced by the search engine, borrowing from the conversations
//! - [`HitRecord`] - serialisable view of a hit, the JSON export schema
//! - [`RunStats`] - counters reported alongside the hits

pub mod conversation;
pub mod search;

pub use conversation::{AuthorRole, CodeBlock, Conversation, Message, UNTITLED, Vault};
pub use search::{Hit, HitKind, HitRecord, RunStats, format_iso};
