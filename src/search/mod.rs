//! Match engine: compiled queries evaluated over normalised conversations.
//!
//! A [`Query`] is validated once by [`QueryBuilder::build`] (regex compilation, date parsing),
//! so a broken query never starts a scan. [`search`] and [`search_with_observer`] then walk the
//! conversations in document order and produce borrowed [`Hit`](crate::models::Hit)s with
//! precomputed snippets.

pub mod engine;
pub mod observer;
pub mod query;
pub mod snippet;

pub use engine::{HitPosition, SearchResults, search, search_positions, search_with_observer};
pub use observer::{CancelFlag, ProgressFn, ScanObserver};
pub use query::{Matcher, Query, QueryBuilder};
pub use snippet::{MESSAGE_SNIPPET_WIDTH, TITLE_SNIPPET_WIDTH, make_snippet};
