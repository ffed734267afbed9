//! The content client seam: anything that can answer a [`CatalogQuery`].
//!
//! # Implementations
//!
//! - [`SanityClient`](crate::sanity::SanityClient) - content lake over HTTP
//! - [`InMemoryCatalog`](crate::catalog::InMemoryCatalog) - JSON catalog file, for local runs and tests

use thiserror::Error;

use crate::query::CatalogQuery;
use crate::types::Product;

/// Read-only access to the product catalog.
#[async_trait::async_trait]
pub trait ContentClient: Send + Sync {
    /// Run one query and return the matching products in backend order.
    async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<Product>, ClientError>;

    /// Short name for logs and health output.
    fn backend(&self) -> &'static str;
}

/// Content client error types.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("catalog unavailable: {0}")]
    Catalog(String),
}
