//! Test harness for HTTP handler tests.
//!
//! Builds an [`AppContext`] over the fixture catalog (or a failing backend)
//! and calls the handlers directly, no socket involved.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Query, State};
use serde_json::Value;
use storefront_core::catalog::InMemoryCatalog;
use storefront_core::client::{ClientError, ContentClient};
use storefront_core::image::ImageUrlBuilder;
use storefront_core::query::CatalogQuery;
use storefront_core::types::Product;
use storefront_core::Backend;
use storefront_http::api::{api_search, search_page, SearchParams};
use storefront_http::AppContext;

/// Counts reads before delegating to the wrapped client.
pub struct CountingClient {
    inner: Box<dyn ContentClient>,
    pub calls: AtomicUsize,
}

#[async_trait::async_trait]
impl ContentClient for CountingClient {
    async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<Product>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(query).await
    }

    fn backend(&self) -> &'static str {
        self.inner.backend()
    }
}

/// Always fails like an unreachable backend.
pub struct FailingClient;

#[async_trait::async_trait]
impl ContentClient for FailingClient {
    async fn fetch(&self, _query: &CatalogQuery) -> Result<Vec<Product>, ClientError> {
        Err(ClientError::Status { status: 502, message: "bad gateway".into() })
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}

pub struct TestHarness {
    pub ctx: AppContext,
    counter: Option<Arc<CountingClient>>,
}

fn images() -> ImageUrlBuilder {
    ImageUrlBuilder::new("testproj", "production")
}

fn params(q: Option<&str>) -> Query<SearchParams> {
    let raw = match q {
        Some(q) => serde_json::json!({ "q": q }),
        None => serde_json::json!({}),
    };
    Query(serde_json::from_value(raw).expect("valid search params"))
}

impl TestHarness {
    /// Harness over `tests/fixtures/<name>.json`.
    pub fn from_fixture(name: &str) -> Self {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(format!("{name}.json"));
        let catalog = InMemoryCatalog::load(&path).expect("fixture catalog loads");
        let counter =
            Arc::new(CountingClient { inner: Box::new(catalog), calls: AtomicUsize::new(0) });
        let backend = Backend { client: counter.clone(), images: images() };
        TestHarness { ctx: AppContext::new(backend), counter: Some(counter) }
    }

    /// Harness whose backend fails every read.
    pub fn failing() -> Self {
        let backend = Backend { client: Arc::new(FailingClient), images: images() };
        TestHarness { ctx: AppContext::new(backend), counter: None }
    }

    /// Outbound reads issued so far.
    pub fn calls(&self) -> usize {
        self.counter.as_ref().map_or(0, |c| c.calls.load(Ordering::SeqCst))
    }

    /// Render `/search` for `q`.
    pub async fn page(&self, q: Option<&str>) -> String {
        search_page(State(self.ctx.clone()), params(q)).await.0
    }

    /// Call `/api/search` for `q` and return the JSON body.
    pub async fn api(&self, q: Option<&str>) -> Value {
        let body = api_search(State(self.ctx.clone()), params(q)).await.0;
        serde_json::to_value(&body).expect("response serializes")
    }
}
