//! Normalisation of raw export records into the uniform conversation model.
//!
//! # Error Handling Strategy
//!
//! This module follows a **graceful degradation** approach suitable for CLI tools:
//!
//! - **Individual message failures**: Messages without a role or text are dropped silently.
//!   Missing or unparsable timestamps are recorded as `None` and never drop a message.
//!
//! - **Conversation failures**: Structurally broken conversations (wrong field types, cyclic
//!   message trees, trees without a root) are logged with `tracing::warn!`, counted in
//!   [`Vault::skipped`](crate::models::Vault), and skipped. They never abort the run.
//!
//! - **Code blocks**: Fence extraction never fails; unterminated fences simply yield nothing.

pub mod code_blocks;
pub mod normalize;
pub mod timestamps;

pub use code_blocks::extract_code_blocks;
pub use normalize::{normalize_all, normalize_conversation};
pub use timestamps::{DateBound, parse_date_bound, parse_iso, parse_timestamp};
