//! In-memory catalog backed by a JSON export of product documents.

use std::path::Path;

use tracing::info;

use crate::client::{ClientError, ContentClient};
use crate::query::CatalogQuery;
use crate::types::{CatalogDocument, Product};

/// Product documents held in memory, searched with the same predicate the
/// content lake evaluates remotely. Results keep file order.
pub struct InMemoryCatalog {
    documents: Vec<CatalogDocument>,
}

impl InMemoryCatalog {
    pub fn new(documents: Vec<CatalogDocument>) -> Self {
        Self { documents }
    }

    /// Load a JSON array of documents from `path`.
    pub fn load(path: &Path) -> Result<Self, ClientError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Catalog(format!("{}: {e}", path.display())))?;
        let documents: Vec<CatalogDocument> = serde_json::from_str(&content)?;
        info!(path = %path.display(), documents = documents.len(), "Loaded catalog");
        Ok(Self::new(documents))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait::async_trait]
impl ContentClient for InMemoryCatalog {
    async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<Product>, ClientError> {
        Ok(self.documents.iter().filter(|d| query.matches(d)).map(CatalogDocument::project).collect())
    }

    fn backend(&self) -> &'static str {
        "catalog"
    }
}
