//! HTTP layer for Storefront Search.
//!
//! - [`api`]: axum handlers: search page, JSON search, health, placeholder image
//! - [`render`]: HTML rendering of the page chrome, status messages and card grid

pub mod api;
pub mod render;

use std::time::Instant;

use axum::{routing::get, Router};
use storefront_core::Backend;

/// Shared handler state. Cloned per request; the backend is behind `Arc`s.
#[derive(Clone)]
pub struct AppContext {
    pub backend: Backend,
    pub start_time: Instant,
}

impl AppContext {
    pub fn new(backend: Backend) -> Self {
        Self { backend, start_time: Instant::now() }
    }
}

/// All routes served by the storefront, without middleware layers.
pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(api::index))
        .route("/search", get(api::search_page))
        .route("/api/search", get(api::api_search))
        .route("/placeholder.svg", get(api::placeholder_svg))
        .route("/health", get(api::api_health))
        .with_state(ctx)
}
