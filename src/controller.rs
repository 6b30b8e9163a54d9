//! Search request lifecycle.
//!
//! [`SearchController`] owns the query being typed, the menu flag and the
//! current [`SearchState`]. A search moves `Idle -> Loading -> Success` or
//! `Loading -> Failure`; a reset returns to `Idle` from anywhere.
//!
//! Every entry into `Loading` issues a [`SearchTicket`]. Only the resolution
//! carrying the current ticket may change state, so an answer arriving after
//! a reset or a newer search is dropped.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::client::{SearchBackend, SearchError};
use crate::content::{FormattedContent, RawApiResponse};

/// A canned query offered on the home view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestedQuery {
    pub icon: &'static str,
    pub title: &'static str,
    pub query: &'static str,
}

pub const SUGGESTED_QUERIES: [SuggestedQuery; 4] = [
    SuggestedQuery {
        icon: "🔬",
        title: "Latest AI Research",
        query: "What are the latest developments in AI?",
    },
    SuggestedQuery {
        icon: "🌍",
        title: "Climate Change",
        query: "Latest solutions for climate change",
    },
    SuggestedQuery {
        icon: "🧬",
        title: "Biotechnology",
        query: "Recent breakthroughs in biotech",
    },
    SuggestedQuery {
        icon: "🚀",
        title: "Space Exploration",
        query: "Current space missions",
    },
];

/// Query behind the trending shortcut
pub const TRENDING_QUERY: &str = "What is trending?";

/// A successful answer together with the query that produced it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayResponse {
    #[serde(flatten)]
    pub raw: RawApiResponse,
    pub current_query: String,
    pub formatted_content: FormattedContent,
    #[serde(skip)]
    pub received_at: DateTime<Utc>,
}

impl DisplayResponse {
    pub fn new(raw: RawApiResponse, current_query: String) -> Self {
        let formatted_content = raw.formatted();
        Self {
            raw,
            current_query,
            formatted_content,
            received_at: Utc::now(),
        }
    }

    /// When the answer arrived, as shown under the echoed query
    pub fn answered_at(&self) -> String {
        self.received_at.format("%Y-%m-%d %H:%M UTC").to_string()
    }
}

// Arrival time is display-only; two identical answers are equal.
impl PartialEq for DisplayResponse {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
            && self.current_query == other.current_query
            && self.formatted_content == other.formatted_content
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Loading {
        query: String,
    },
    Success(DisplayResponse),
    Failure(String),
}

/// Identifies one entry into `Loading`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchTicket(u64);

/// A search that has been started and awaits its backend answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSearch {
    pub ticket: SearchTicket,
    pub query: String,
}

pub struct SearchController {
    backend: Arc<dyn SearchBackend>,
    query: String,
    state: SearchState,
    menu_open: bool,
    generation: u64,
}

impl SearchController {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            query: String::new(),
            state: SearchState::Idle,
            menu_open: false,
            generation: 0,
        }
    }

    pub fn backend(&self) -> Arc<dyn SearchBackend> {
        Arc::clone(&self.backend)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn query_mut(&mut self) -> &mut String {
        &mut self.query
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SearchState::Loading { .. })
    }

    pub fn response(&self) -> Option<&DisplayResponse> {
        match &self.state {
            SearchState::Success(response) => Some(response),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SearchState::Failure(message) => Some(message),
            _ => None,
        }
    }

    pub fn menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
    }

    /// Enter `Loading` for `explicit` if given, else for the typed query.
    ///
    /// Returns `None` without touching state when the effective query is
    /// blank. The returned query is the trimmed text sent to the backend.
    pub fn begin_search(&mut self, explicit: Option<&str>) -> Option<PendingSearch> {
        let text = explicit.unwrap_or(self.query.as_str()).trim();
        if text.is_empty() {
            return None;
        }
        let query = text.to_string();

        self.generation += 1;
        self.menu_open = false;
        self.state = SearchState::Loading {
            query: query.clone(),
        };
        tracing::info!(%query, "search started");

        Some(PendingSearch {
            ticket: SearchTicket(self.generation),
            query,
        })
    }

    /// Apply the backend outcome for `ticket`.
    ///
    /// Returns `false` if the ticket is stale and nothing changed.
    pub fn complete(&mut self, ticket: SearchTicket, outcome: Result<Value, SearchError>) -> bool {
        let query = match &self.state {
            SearchState::Loading { query } if ticket.0 == self.generation => query.clone(),
            _ => {
                tracing::debug!(ticket = ticket.0, "dropping stale search result");
                return false;
            }
        };

        match outcome.and_then(|data| RawApiResponse::parse(data).map_err(SearchError::from)) {
            Ok(raw) => {
                self.state = SearchState::Success(DisplayResponse::new(raw, query));
                self.query.clear();
            }
            Err(error) => {
                tracing::warn!(%query, error = %error, "search failed");
                self.state = SearchState::Failure(error.user_message());
            }
        }
        true
    }

    /// Run a full search against the backend and wait for it to settle
    pub async fn submit(&mut self, explicit: Option<&str>) -> Option<&SearchState> {
        let pending = self.begin_search(explicit)?;
        let outcome = self.backend.search(&pending.query).await;
        self.complete(pending.ticket, outcome);
        Some(&self.state)
    }

    /// Search for the suggested query at `index`
    pub async fn submit_suggestion(&mut self, index: usize) -> Option<&SearchState> {
        let suggestion = SUGGESTED_QUERIES.get(index)?;
        self.submit(Some(suggestion.query)).await
    }

    pub async fn submit_trending(&mut self) -> Option<&SearchState> {
        self.submit(Some(TRENDING_QUERY)).await
    }

    /// Back to the home view; any outstanding search is abandoned
    pub fn reset(&mut self) {
        self.generation += 1;
        self.query.clear();
        self.state = SearchState::Idle;
        self.menu_open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::NO_SUMMARY;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays canned outcomes and records the queries it receives
    struct MockBackend {
        replies: Mutex<Vec<Result<Value, SearchError>>>,
        seen: Mutex<Vec<String>>,
    }

    impl MockBackend {
        fn new(replies: Vec<Result<Value, SearchError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchBackend for MockBackend {
        async fn search(&self, query: &str) -> Result<Value, SearchError> {
            self.seen.lock().unwrap().push(query.to_string());
            self.replies.lock().unwrap().remove(0)
        }
    }

    fn setup(replies: Vec<Result<Value, SearchError>>) -> (SearchController, Arc<MockBackend>) {
        let backend = MockBackend::new(replies);
        (SearchController::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn blank_query_is_a_no_op() {
        let (mut controller, backend) = setup(vec![]);
        controller.set_query("   \t ");
        controller.toggle_menu();

        assert!(controller.submit(None).await.is_none());
        assert_eq!(controller.state(), &SearchState::Idle);
        assert!(controller.menu_open());
        assert_eq!(controller.query(), "   \t ");
        assert!(backend.seen().is_empty());
    }

    #[tokio::test]
    async fn success_clears_query_and_stores_response() {
        let (mut controller, backend) = setup(vec![Ok(json!({
            "content": "Hi\n**Heading**\nBody line",
            "sources": ["a"]
        }))]);
        controller.set_query("  what is rust  ");

        controller.submit(None).await;

        assert_eq!(backend.seen(), vec!["what is rust"]);
        assert!(!controller.is_loading());
        assert_eq!(controller.query(), "");
        assert!(controller.error().is_none());
        let response = controller.response().unwrap();
        assert_eq!(response.current_query, "what is rust");
        assert_eq!(response.formatted_content.summary, "Hi");
        assert_eq!(response.raw.extra.get("sources"), Some(&json!(["a"])));
    }

    #[tokio::test]
    async fn failure_keeps_query_for_retry() {
        let (mut controller, _) = setup(vec![Err(SearchError::Status(
            StatusCode::INTERNAL_SERVER_ERROR,
        ))]);
        controller.set_query("retry me");

        controller.submit(None).await;

        assert_eq!(controller.error(), Some("Failed to fetch data."));
        assert!(controller.response().is_none());
        assert!(!controller.is_loading());
        assert_eq!(controller.query(), "retry me");
    }

    #[tokio::test]
    async fn malformed_payload_is_a_failure() {
        let (mut controller, _) = setup(vec![Ok(json!({ "content": 12 })), Ok(json!({ "content": null }))]);

        controller.submit(Some("numbers")).await;
        assert_eq!(controller.error(), Some("Invalid response format"));

        controller.submit(Some("nulls")).await;
        assert_eq!(controller.error(), Some("Invalid response format"));
    }

    #[tokio::test]
    async fn explicit_query_overrides_typed_text() {
        let (mut controller, backend) = setup(vec![Ok(json!({ "content": { "points": ["x"] } }))]);
        controller.set_query("typed");

        controller.submit_suggestion(2).await;

        assert_eq!(backend.seen(), vec!["Recent breakthroughs in biotech"]);
        assert_eq!(controller.response().unwrap().formatted_content.summary, NO_SUMMARY);
        assert_eq!(controller.query(), "");
    }

    #[tokio::test]
    async fn unknown_suggestion_does_nothing() {
        let (mut controller, backend) = setup(vec![]);
        assert!(controller.submit_suggestion(SUGGESTED_QUERIES.len()).await.is_none());
        assert!(backend.seen().is_empty());
    }

    #[tokio::test]
    async fn trending_uses_fixed_query() {
        let (mut controller, backend) = setup(vec![Ok(json!({ "content": "Trending now" }))]);
        controller.submit_trending().await;
        assert_eq!(backend.seen(), vec![TRENDING_QUERY]);
    }

    #[test]
    fn loading_closes_menu_and_clears_error() {
        let (mut controller, _) = setup(vec![]);
        let first = controller.begin_search(Some("first")).unwrap();
        controller.complete(first.ticket, Err(SearchError::Decode("boom".to_string())));
        assert_eq!(controller.error(), Some("boom"));

        controller.toggle_menu();
        let pending = controller.begin_search(Some("second")).unwrap();
        assert!(controller.is_loading());
        assert!(controller.error().is_none());
        assert!(!controller.menu_open());
        assert_eq!(pending.query, "second");
    }

    #[test]
    fn reset_clears_everything() {
        let (mut controller, _) = setup(vec![]);
        let pending = controller.begin_search(Some("q")).unwrap();
        controller.complete(pending.ticket, Ok(json!({ "content": "done" })));
        controller.set_query("draft");
        controller.toggle_menu();

        controller.reset();

        assert_eq!(controller.query(), "");
        assert!(controller.response().is_none());
        assert!(controller.error().is_none());
        assert!(!controller.menu_open());
        assert_eq!(controller.state(), &SearchState::Idle);
    }

    #[test]
    fn result_after_reset_is_dropped() {
        let (mut controller, _) = setup(vec![]);
        let pending = controller.begin_search(Some("slow")).unwrap();
        controller.reset();

        assert!(!controller.complete(pending.ticket, Ok(json!({ "content": "late" }))));
        assert_eq!(controller.state(), &SearchState::Idle);
    }

    #[test]
    fn newer_search_supersedes_older() {
        let (mut controller, _) = setup(vec![]);
        let old = controller.begin_search(Some("old")).unwrap();
        let new = controller.begin_search(Some("new")).unwrap();

        assert!(!controller.complete(old.ticket, Ok(json!({ "content": "stale" }))));
        assert!(controller.is_loading());

        assert!(controller.complete(new.ticket, Ok(json!({ "content": "fresh" }))));
        let response = controller.response().unwrap();
        assert_eq!(response.current_query, "new");
        assert_eq!(response.formatted_content.summary, "fresh");
    }

    #[test]
    fn arrival_time_is_ignored_by_equality() {
        let raw = RawApiResponse::parse(json!({ "content": "same" })).unwrap();
        let first = DisplayResponse::new(raw.clone(), "q".to_string());
        let mut second = DisplayResponse::new(raw, "q".to_string());
        second.received_at = "2001-02-03T04:05:00Z".parse().unwrap();

        assert_eq!(first, second);
        assert_eq!(SearchState::Success(first), SearchState::Success(second.clone()));
        assert_eq!(second.answered_at(), "2001-02-03 04:05 UTC");
    }

    #[test]
    fn display_response_serialises_flat() {
        let raw = RawApiResponse::parse(json!({ "content": "A\nB", "id": 7 })).unwrap();
        let response = DisplayResponse::new(raw, "q".to_string());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "content": "A\nB",
                "id": 7,
                "currentQuery": "q",
                "formattedContent": { "summary": "A", "points": ["B"] }
            })
        );
    }
}
