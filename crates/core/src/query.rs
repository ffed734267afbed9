//! Query normalization and the catalog search predicate.
//!
//! The user's `q` parameter is trimmed and lower-cased into a
//! [`NormalizedQuery`]. A [`CatalogQuery`] carries the GROQ text sent to the
//! content lake together with its bound parameters, and can evaluate the same
//! predicate locally for catalogs that live in memory.

use serde_json::{Map, Value};

use crate::types::{CatalogDocument, PRODUCT_TYPE};

/// Search over name, category and description, projecting the card fields.
/// The user string is bound as `$pattern`, never spliced into the text.
pub const SEARCH_GROQ: &str = r#"*[_type == "product" && (lower(name) match $pattern || lower(category) match $pattern || lower(description) match $pattern)] { _id, name, price, image, category }"#;

// ---------------------------------------------------------------------------
// Normalized query
// ---------------------------------------------------------------------------

/// A trimmed, lower-cased, non-empty search string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedQuery(String);

impl NormalizedQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NormalizedQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trim and lower-case `raw`. Absent, empty and whitespace-only input all
/// collapse to `None`: the "no query" state, not a search for "".
pub fn normalize_query(raw: Option<&str>) -> Option<NormalizedQuery> {
    let normalized = raw?.trim().to_lowercase();
    if normalized.is_empty() {
        None
    } else {
        Some(NormalizedQuery(normalized))
    }
}

// ---------------------------------------------------------------------------
// Catalog query
// ---------------------------------------------------------------------------

/// One read against the content store.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    needle: NormalizedQuery,
    groq: &'static str,
}

impl CatalogQuery {
    /// Case-insensitive substring search across name, category and description.
    pub fn search(query: &NormalizedQuery) -> Self {
        Self { needle: query.clone(), groq: SEARCH_GROQ }
    }

    pub fn needle(&self) -> &NormalizedQuery {
        &self.needle
    }

    pub fn groq(&self) -> &str {
        self.groq
    }

    /// Wildcard-wrapped match pattern, `*<query>*`.
    pub fn pattern(&self) -> String {
        format!("*{}*", self.needle)
    }

    /// Bound parameters keyed without the leading `$`.
    pub fn params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("pattern".to_string(), Value::String(self.pattern()));
        params
    }

    /// Evaluate the predicate against a stored document.
    pub fn matches(&self, doc: &CatalogDocument) -> bool {
        if doc.doc_type != PRODUCT_TYPE {
            return false;
        }
        let needle = self.needle.as_str();
        [&doc.name, &doc.category, &doc.description]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(needle))
    }
}
