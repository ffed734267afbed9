//! Search evaluation: one normalized query, at most one catalog read, one outcome.
//!
//! [`run_search`] is stateless and serves per-request callers such as the HTTP
//! page. [`SearchController`] wraps it for long-lived sessions where the query
//! changes over time and fetches may overlap.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, error};

use crate::client::ContentClient;
use crate::image::ImageUrlBuilder;
use crate::query::{normalize_query, CatalogQuery, NormalizedQuery};
use crate::types::*;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of evaluating one query.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Nothing to search for; no request was made.
    EmptyInput,
    /// The backend answered. `items` may be empty.
    Found { query: NormalizedQuery, items: Vec<ViewItem> },
    /// The backend could not be reached or returned an error.
    TransportError { query: NormalizedQuery },
}

impl SearchOutcome {
    /// User-facing message, if this outcome shows one instead of a grid.
    pub fn message(&self) -> Option<String> {
        match self {
            SearchOutcome::EmptyInput => Some(MSG_EMPTY_INPUT.to_string()),
            SearchOutcome::Found { query, items } if items.is_empty() => {
                Some(no_results_message(query.as_str()))
            }
            SearchOutcome::Found { .. } => None,
            SearchOutcome::TransportError { .. } => Some(MSG_FETCH_FAILED.to_string()),
        }
    }

    pub fn query(&self) -> Option<&NormalizedQuery> {
        match self {
            SearchOutcome::EmptyInput => None,
            SearchOutcome::Found { query, .. } | SearchOutcome::TransportError { query } => {
                Some(query)
            }
        }
    }

    pub fn items(&self) -> &[ViewItem] {
        match self {
            SearchOutcome::Found { items, .. } => items,
            _ => &[],
        }
    }
}

/// What a page shows at any moment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum PageState {
    Loading,
    Error(String),
    Ready(Vec<ViewItem>),
}

impl From<&SearchOutcome> for PageState {
    fn from(outcome: &SearchOutcome) -> Self {
        match outcome.message() {
            Some(message) => PageState::Error(message),
            None => PageState::Ready(outcome.items().to_vec()),
        }
    }
}

impl From<SearchOutcome> for PageState {
    fn from(outcome: SearchOutcome) -> Self {
        match outcome {
            SearchOutcome::Found { items, .. } if !items.is_empty() => PageState::Ready(items),
            other => PageState::from(&other),
        }
    }
}

// ---------------------------------------------------------------------------
// Stateless evaluation
// ---------------------------------------------------------------------------

/// Map a fetched product to its card.
pub fn to_view_item(product: Product, images: &ImageUrlBuilder) -> ViewItem {
    ViewItem {
        image_url: images.url_for(product.image.as_ref()),
        id: product.id,
        title: product.name,
        price: product.price,
    }
}

/// Run an already-normalized query against the catalog.
pub async fn search_normalized(
    client: &dyn ContentClient,
    images: &ImageUrlBuilder,
    query: Option<NormalizedQuery>,
) -> SearchOutcome {
    let Some(query) = query else {
        return SearchOutcome::EmptyInput;
    };

    match client.fetch(&CatalogQuery::search(&query)).await {
        Ok(products) => {
            debug!(query = query.as_str(), results = products.len(), "Search complete");
            let items = products.into_iter().map(|p| to_view_item(p, images)).collect();
            SearchOutcome::Found { query, items }
        }
        Err(e) => {
            error!(
                query = query.as_str(),
                backend = client.backend(),
                error = %e,
                "Error fetching search results"
            );
            SearchOutcome::TransportError { query }
        }
    }
}

/// Normalize the raw `q` parameter and evaluate it.
pub async fn run_search(
    client: &dyn ContentClient,
    images: &ImageUrlBuilder,
    raw: Option<&str>,
) -> SearchOutcome {
    search_normalized(client, images, normalize_query(raw)).await
}

// ---------------------------------------------------------------------------
// Session controller
// ---------------------------------------------------------------------------

/// A submitted query waiting for its fetch. Issued in submission order.
#[derive(Debug)]
pub struct SearchTicket {
    generation: u64,
    query: Option<NormalizedQuery>,
}

struct Session {
    /// `None` until the first query is submitted.
    query: Option<Option<NormalizedQuery>>,
    state: PageState,
}

/// Holds the page state for one interactive session.
///
/// Every effective query change starts a new generation. Fetches are never
/// cancelled; a completion whose generation is no longer the latest is dropped
/// so an old response cannot overwrite a newer one.
pub struct SearchController {
    client: Arc<dyn ContentClient>,
    images: ImageUrlBuilder,
    generation: AtomicU64,
    session: Mutex<Session>,
}

impl SearchController {
    pub fn new(client: Arc<dyn ContentClient>, images: ImageUrlBuilder) -> Self {
        Self {
            client,
            images,
            generation: AtomicU64::new(0),
            session: Mutex::new(Session { query: None, state: PageState::Loading }),
        }
    }

    /// Current page state.
    pub fn state(&self) -> PageState {
        self.lock().state.clone()
    }

    /// Current normalized query, `None` for the empty-input state.
    pub fn query(&self) -> Option<NormalizedQuery> {
        self.lock().query.clone().flatten()
    }

    /// Record a raw query and mark the page as loading. Returns the ticket to
    /// [`complete`](Self::complete), or `None` when the normalized query did not
    /// change. Never awaits, so callers can order submissions before spawning.
    pub fn begin(&self, raw: Option<&str>) -> Option<SearchTicket> {
        let query = normalize_query(raw);
        let mut session = self.lock();
        if session.query.as_ref() == Some(&query) {
            debug!(query = query.as_ref().map(|q| q.as_str()), "Query unchanged");
            return None;
        }
        session.query = Some(query.clone());
        session.state = PageState::Loading;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Some(SearchTicket { generation, query })
    }

    /// Fetch for a ticket from [`begin`](Self::begin). Returns the state this
    /// call applied, or `None` when a later ticket superseded it.
    pub async fn complete(&self, ticket: SearchTicket) -> Option<PageState> {
        let SearchTicket { generation, query } = ticket;
        let outcome = search_normalized(self.client.as_ref(), &self.images, query).await;

        let mut session = self.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "Discarding stale search response");
            return None;
        }
        session.state = PageState::from(outcome);
        Some(session.state.clone())
    }

    /// [`begin`](Self::begin) then [`complete`](Self::complete).
    pub async fn set_query(&self, raw: Option<&str>) -> Option<PageState> {
        let ticket = self.begin(raw)?;
        self.complete(ticket).await
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Session> {
        // Poisoning is ignored: the session is plain data.
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Returns one product named after the query, after a per-query delay.
    struct EchoClient {
        calls: AtomicUsize,
        slow_query: Option<&'static str>,
        fail: bool,
    }

    impl EchoClient {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0), slow_query: None, fail: false }
        }
    }

    #[async_trait::async_trait]
    impl ContentClient for EchoClient {
        async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<Product>, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.slow_query == Some(query.needle().as_str()) {
                tokio::time::sleep(Duration::from_millis(80)).await;
            }
            if self.fail {
                return Err(ClientError::Status { status: 503, message: "down".into() });
            }
            if query.needle().as_str() == "none" {
                return Ok(vec![]);
            }
            Ok(vec![Product {
                id: format!("id-{}", query.needle()),
                name: query.needle().to_string(),
                price: 1.0,
                image: None,
                category: None,
            }])
        }

        fn backend(&self) -> &'static str {
            "echo"
        }
    }

    fn images() -> ImageUrlBuilder {
        ImageUrlBuilder::new("p", "d")
    }

    #[tokio::test]
    async fn empty_input_makes_no_request() {
        let client = EchoClient::new();
        for raw in [None, Some(""), Some("   ")] {
            let outcome = run_search(&client, &images(), raw).await;
            assert_eq!(outcome, SearchOutcome::EmptyInput);
            assert_eq!(outcome.message().as_deref(), Some("Please enter a search term"));
        }
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn zero_results_derive_no_results_message() {
        let client = EchoClient::new();
        let outcome = run_search(&client, &images(), Some(" NONE ")).await;
        assert!(outcome.items().is_empty());
        assert_eq!(outcome.message().as_deref(), Some("No results found for \"none\""));
        assert_eq!(PageState::from(outcome), PageState::Error("No results found for \"none\"".into()));
    }

    #[tokio::test]
    async fn failure_maps_to_generic_message() {
        let client = EchoClient { fail: true, ..EchoClient::new() };
        let outcome = run_search(&client, &images(), Some("boots")).await;
        assert!(matches!(outcome, SearchOutcome::TransportError { .. }));
        assert_eq!(outcome.message().as_deref(), Some("An error occurred while searching"));
    }

    #[tokio::test]
    async fn results_become_view_items_with_placeholder() {
        let client = EchoClient::new();
        let outcome = run_search(&client, &images(), Some("Shoe")).await;
        assert_eq!(outcome.message(), None);
        let items = outcome.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "id-shoe");
        assert_eq!(items[0].image_url, PLACEHOLDER_IMAGE);
    }

    #[tokio::test]
    async fn controller_skips_unchanged_query() {
        let client = Arc::new(EchoClient::new());
        let ctrl = SearchController::new(client.clone(), images());
        assert!(ctrl.set_query(Some("Shoe")).await.is_some());
        assert!(ctrl.set_query(Some("  shoe ")).await.is_none());
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        assert_eq!(ctrl.query().unwrap().as_str(), "shoe");
    }

    #[tokio::test]
    async fn controller_empty_query_sets_error_state() {
        let client = Arc::new(EchoClient::new());
        let ctrl = SearchController::new(client.clone(), images());
        assert_eq!(ctrl.state(), PageState::Loading);
        let applied = ctrl.set_query(Some(" ")).await;
        assert_eq!(applied, Some(PageState::Error(MSG_EMPTY_INPUT.into())));
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn controller_discards_stale_response() {
        let client = Arc::new(EchoClient { slow_query: Some("slow"), ..EchoClient::new() });
        let ctrl = SearchController::new(client, images());

        let (first, second) = tokio::join!(ctrl.set_query(Some("slow")), ctrl.set_query(Some("fast")));

        assert_eq!(first, None, "older fetch must not apply");
        let items = match second {
            Some(PageState::Ready(items)) => items,
            other => panic!("expected ready state, got {other:?}"),
        };
        assert_eq!(items[0].title, "fast");
        assert_eq!(ctrl.state(), PageState::Ready(items));
        assert_eq!(ctrl.query().unwrap().as_str(), "fast");
    }

    #[tokio::test]
    async fn completion_order_does_not_override_submission_order() {
        let client = Arc::new(EchoClient::new());
        let ctrl = SearchController::new(client.clone(), images());

        let older = ctrl.begin(Some("boots")).unwrap();
        let newer = ctrl.begin(Some("socks")).unwrap();
        assert_eq!(ctrl.state(), PageState::Loading);
        assert_eq!(ctrl.query().unwrap().as_str(), "socks");

        let applied = ctrl.complete(newer).await;
        assert!(matches!(&applied, Some(PageState::Ready(items)) if items[0].title == "socks"));
        assert_eq!(ctrl.complete(older).await, None);

        assert_eq!(ctrl.state(), applied.unwrap());
        assert_eq!(ctrl.query().unwrap().as_str(), "socks");
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn begin_skips_unchanged_query_without_loading() {
        let ctrl = SearchController::new(Arc::new(EchoClient::new()), images());
        assert!(ctrl.begin(Some("Shoe")).is_some());
        assert!(ctrl.begin(Some(" SHOE ")).is_none());
    }
}
