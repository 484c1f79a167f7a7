use tracing::{debug, info};

use super::observer::ScanObserver;
use super::query::Query;
use super::snippet::{MESSAGE_SNIPPET_WIDTH, TITLE_SNIPPET_WIDTH, make_snippet};
use crate::models::{Conversation, Hit, HitKind, RunStats};

/// Hits of one scan together with its counters.
#[derive(Debug, Clone, Default)]
pub struct SearchResults<'a> {
    pub hits: Vec<Hit<'a>>,
    pub stats: RunStats,
}

/// Index-based form of a hit, for callers that own the conversations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitPosition {
    pub conversation: usize,
    pub message: usize,
    pub kind: HitKind,
    pub snippet: String,
}

impl HitPosition {
    /// Resolve against the conversations the position was produced from.
    pub fn resolve<'a>(&self, conversations: &'a [Conversation]) -> Option<Hit<'a>> {
        let conversation = conversations.get(self.conversation)?;
        let message = conversation.messages.get(self.message)?;
        Some(Hit { conversation, message, kind: self.kind, snippet: self.snippet.clone() })
    }
}

/// Run `query` over `conversations` and return the hits in encounter order.
pub fn search<'a>(conversations: &'a [Conversation], query: &Query) -> Vec<Hit<'a>> {
    search_with_observer(conversations, query, &mut ()).hits
}

/// Run `query` over `conversations`, reporting progress and honouring cancellation.
pub fn search_with_observer<'a>(
    conversations: &'a [Conversation],
    query: &Query,
    observer: &mut dyn ScanObserver,
) -> SearchResults<'a> {
    let (positions, stats) = search_positions(conversations, query, observer);
    let hits = positions
        .into_iter()
        .map(|p| Hit {
            conversation: &conversations[p.conversation],
            message: &conversations[p.conversation].messages[p.message],
            kind: p.kind,
            snippet: p.snippet,
        })
        .collect();
    SearchResults { hits, stats }
}

/// The scan itself, yielding index-based hits.
///
/// Hits come out in conversation order, then message order. When a conversation's title
/// matches, each message passing the date and code filters yields a [`HitKind::Title`] hit,
/// placed right before that message's own [`HitKind::Message`] hit (if any). The two are not
/// deduplicated.
///
/// Cancellation is polled between conversations; the hits gathered so far are returned and
/// `stats.cancelled` is set.
pub fn search_positions(
    conversations: &[Conversation],
    query: &Query,
    observer: &mut dyn ScanObserver,
) -> (Vec<HitPosition>, RunStats) {
    let total = conversations.len();
    let matcher = query.matcher();
    let mut hits = Vec::new();
    let mut stats = RunStats { conversations_total: total, ..RunStats::default() };

    for (ci, conversation) in conversations.iter().enumerate() {
        if observer.should_cancel() {
            info!("Search cancelled after {} of {} conversations", ci, total);
            stats.cancelled = true;
            break;
        }
        stats.conversations_scanned += 1;

        if !query.accepts_title(&conversation.title) {
            stats.conversations_filtered += 1;
            observer.on_progress(ci + 1, total);
            continue;
        }

        let title_snippet = if query.search_titles() {
            matcher
                .find(&conversation.title)
                .map(|range| make_snippet(&conversation.title, range, TITLE_SNIPPET_WIDTH))
        } else {
            None
        };

        if title_snippet.is_some() || query.search_messages() {
            for (mi, message) in conversation.messages.iter().enumerate() {
                stats.messages_scanned += 1;

                if !query.in_date_range(message.timestamp) {
                    continue;
                }
                if query.only_with_code() && !message.has_code() {
                    continue;
                }

                if let Some(snippet) = &title_snippet {
                    hits.push(HitPosition {
                        conversation: ci,
                        message: mi,
                        kind: HitKind::Title,
                        snippet: snippet.clone(),
                    });
                }

                if query.search_messages()
                    && let Some(range) = matcher.find(&message.text)
                {
                    hits.push(HitPosition {
                        conversation: ci,
                        message: mi,
                        kind: HitKind::Message,
                        snippet: make_snippet(&message.text, range, MESSAGE_SNIPPET_WIDTH),
                    });
                }
            }
        }

        observer.on_progress(ci + 1, total);
    }

    stats.hits = hits.len();
    debug!(
        scanned = stats.conversations_scanned,
        messages = stats.messages_scanned,
        hits = stats.hits,
        "Search finished"
    );
    (hits, stats)
}
