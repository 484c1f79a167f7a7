//! Chat Vault Search - Search and recover content from chat data exports
//!
//! This library loads a chat export (a `.zip` archive, an extracted folder, or a bare
//! `conversations.json`), normalises its conversations into linear message threads and
//! searches them. It supports:
//!
//! - Reading the data document from a ZIP archive or a nested export folder
//! - Linearising tree-shaped (`mapping`) and flat (`messages`) conversation layouts
//! - Plain-text or regex search over titles and message bodies with date/title/code filters
//! - Exporting hits as JSON, Markdown or plain text
//! - Recovering fenced code blocks into individual files
//!
//! # Example
//!
//! ```no_run
//! use chat_vault_search::{ExportOptions, Query, run_search};
//! use std::path::Path;
//!
//! let query = Query::builder("docker").only_with_code(true).build()?;
//! let outcome = run_search(Path::new("export.zip"), &query, &ExportOptions::default(), &mut ())?;
//! for hit in outcome.hits() {
//!     println!("{}: {}", hit.conversation.title, hit.snippet);
//! }
//! # Ok::<(), chat_vault_search::VaultError>(())
//! ```

pub mod cli;
pub mod error;
pub mod export;
pub mod loader;
pub mod models;
pub mod parsers;
pub mod pipeline;
pub mod search;
pub mod utils;

// Re-export commonly used types
pub use error::{Result, VaultError};
pub use export::{ExportFormat, export, export_hits, extract_code};
pub use loader::load_raw_conversations;
pub use models::{Conversation, Hit, HitKind, HitRecord, Message, RunStats, Vault};
pub use parsers::{extract_code_blocks, normalize_all, normalize_conversation};
pub use pipeline::{ExportOptions, SearchOutcome, open_vault, run_search};
pub use search::{CancelFlag, ProgressFn, Query, QueryBuilder, ScanObserver, search};
