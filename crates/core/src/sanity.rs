//! HTTP client for the Sanity content lake query API.
//!
//! `GET https://<project>.api.sanity.io/v<version>/data/query/<dataset>?query=...&$pattern=...`
//! answers with `{ "ms": .., "query": .., "result": [..] }`. Parameters travel
//! JSON-encoded in the query string, prefixed with `$`.

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::client::{ClientError, ContentClient};
use crate::query::CatalogQuery;
use crate::types::Product;

/// Connection settings for one project/dataset pair.
#[derive(Debug, Clone)]
pub struct SanityConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub use_cdn: bool,
    pub token: Option<String>,
}

/// Client for the content lake. `reqwest::Client` pools connections, so one
/// instance is shared for the process lifetime.
pub struct SanityClient {
    client: Client,
    config: SanityConfig,
    /// Replaces `https://<project>.api[cdn].sanity.io` when set.
    base_url: Option<String>,
}

#[derive(Deserialize)]
struct QueryEnvelope {
    result: Option<Vec<Product>>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    description: Option<String>,
}

impl SanityClient {
    pub fn new(config: SanityConfig) -> Self {
        Self { client: Client::new(), config, base_url: None }
    }

    /// Send queries to `base_url` instead of the project's hosted endpoint,
    /// e.g. a self-hosted proxy.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    /// Query endpoint for the configured project and dataset.
    pub fn query_url(&self) -> String {
        let version = self.config.api_version.trim_start_matches('v');
        let base = match &self.base_url {
            Some(base) => base.clone(),
            None => {
                let host = if self.config.use_cdn { "apicdn.sanity.io" } else { "api.sanity.io" };
                format!("https://{}.{host}", self.config.project_id)
            }
        };
        format!("{base}/v{version}/data/query/{}", self.config.dataset)
    }

    /// Query-string pairs: the GROQ text plus each bound parameter as JSON.
    pub fn query_pairs(query: &CatalogQuery) -> Vec<(String, String)> {
        let mut pairs = vec![("query".to_string(), query.groq().to_string())];
        for (name, value) in query.params() {
            pairs.push((format!("${name}"), value.to_string()));
        }
        pairs
    }
}

#[async_trait::async_trait]
impl ContentClient for SanityClient {
    async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<Product>, ClientError> {
        let url = self.query_url();
        debug!(url = url.as_str(), pattern = %query.pattern(), "Querying content lake");

        let mut request = self.client.get(&url).query(&Self::query_pairs(query));
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|e| e.error)
                .and_then(|e| e.description)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
            return Err(ClientError::Status { status: status.as_u16(), message });
        }

        let envelope: QueryEnvelope = serde_json::from_str(&body)?;
        Ok(envelope.result.unwrap_or_default())
    }

    fn backend(&self) -> &'static str {
        "sanity"
    }
}
