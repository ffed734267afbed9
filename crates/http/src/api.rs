use axum::{
    extract::{Json, Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use storefront_core::search::{run_search, PageState, SearchOutcome};
use storefront_core::types::ViewItem;

use crate::render::render_page;
use crate::AppContext;

const PLACEHOLDER_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="400" viewBox="0 0 400 400"><rect width="400" height="400" fill="#e5e7eb"/><path d="M140 250l50-60 40 45 30-35 40 50z" fill="#9ca3af"/><circle cx="170" cy="160" r="20" fill="#9ca3af"/></svg>"##;

#[derive(Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

// ---------------------------------------------------------------------------
// Search page
// ---------------------------------------------------------------------------

/// `GET /search?q=`: server-rendered results page. Every outcome renders
/// with 200; the message replaces the grid.
pub async fn search_page(
    State(ctx): State<AppContext>,
    Query(params): Query<SearchParams>,
) -> Html<String> {
    debug!(q = params.q.as_deref(), "Rendering search page");
    let outcome =
        run_search(ctx.backend.client.as_ref(), &ctx.backend.images, params.q.as_deref()).await;
    let query = outcome.query().map(|q| q.to_string()).unwrap_or_default();
    Html(render_page(&PageState::from(outcome), &query))
}

// ---------------------------------------------------------------------------
// JSON search
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct SearchResponse {
    status: &'static str,
    query: Option<String>,
    message: Option<String>,
    items: Vec<ViewItem>,
}

impl From<SearchOutcome> for SearchResponse {
    fn from(outcome: SearchOutcome) -> Self {
        let status = match outcome {
            SearchOutcome::EmptyInput => "empty_input",
            SearchOutcome::Found { .. } => "ok",
            SearchOutcome::TransportError { .. } => "error",
        };
        let query = outcome.query().map(|q| q.to_string());
        let message = outcome.message();
        let items = match outcome {
            SearchOutcome::Found { items, .. } => items,
            _ => Vec::new(),
        };
        SearchResponse { status, query, message, items }
    }
}

/// `GET /api/search?q=`
pub async fn api_search(
    State(ctx): State<AppContext>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    debug!(q = params.q.as_deref(), "JSON search");
    let outcome =
        run_search(ctx.backend.client.as_ref(), &ctx.backend.images, params.q.as_deref()).await;
    Json(outcome.into())
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

pub async fn api_health(State(ctx): State<AppContext>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "backend": ctx.backend.client.backend(),
        "uptime_secs": ctx.start_time.elapsed().as_secs(),
    }))
}

pub async fn placeholder_svg() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/svg+xml")], PLACEHOLDER_SVG)
}

pub async fn index() -> Redirect {
    Redirect::to("/search")
}
