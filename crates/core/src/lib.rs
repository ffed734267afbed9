//! Storefront Search: product search over a content-lake catalog.
//!
//! This crate holds everything below the presentation layer: query
//! normalization, the catalog predicate, content clients, image URL
//! resolution, and search state.
//!
//! # Modules
//!
//! - [`types`]: Products, catalog documents, view items, user-facing messages
//! - [`query`]: Query normalization and the search predicate
//! - [`client`]: The [`ContentClient`](client::ContentClient) seam and its error type
//! - [`sanity`]: Content lake HTTP client
//! - [`catalog`]: In-memory JSON catalog
//! - [`image`]: Card image URL resolution
//! - [`search`]: Search outcome, page state, and the session controller
//! - [`config`]: `storefront.toml` loading

pub mod catalog;
pub mod client;
pub mod config;
pub mod image;
pub mod query;
pub mod sanity;
pub mod search;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use catalog::InMemoryCatalog;
use client::ContentClient;
use config::{ConfigError, StorefrontConfig};
use image::ImageUrlBuilder;
use sanity::{SanityClient, SanityConfig};

// ---------------------------------------------------------------------------
// Cross-platform path helpers
// ---------------------------------------------------------------------------

/// Platform-aware home directory: `HOME` on Unix, `USERPROFILE` on Windows.
pub fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")).ok().map(PathBuf::from)
}

/// Platform-aware config directory: `~/.storefront` on Unix, `%APPDATA%/storefront` on Windows.
pub fn config_dir() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        std::env::var("APPDATA").ok().map(|a| PathBuf::from(a).join("storefront"))
    } else {
        home_dir().map(|h| h.join(".storefront"))
    }
}

// ---------------------------------------------------------------------------
// Backend wiring
// ---------------------------------------------------------------------------

/// A ready content client plus the image resolver for the same project.
#[derive(Clone)]
pub struct Backend {
    pub client: Arc<dyn ContentClient>,
    pub images: ImageUrlBuilder,
}

/// Build the backend described by `config`. A catalog file wins over the
/// content lake; with neither configured this is an error.
pub fn connect(config: &StorefrontConfig) -> Result<Backend, ConfigError> {
    let images =
        ImageUrlBuilder::new(config.project_id.clone().unwrap_or_default(), config.dataset.clone());

    if let Some(path) = &config.catalog {
        let catalog = InMemoryCatalog::load(path)?;
        return Ok(Backend { client: Arc::new(catalog), images });
    }

    let project_id = config.project_id.clone().ok_or(ConfigError::NoBackend)?;
    info!(
        project = project_id.as_str(),
        dataset = config.dataset.as_str(),
        cdn = config.use_cdn,
        "Using content lake"
    );
    let mut client = SanityClient::new(SanityConfig {
        project_id,
        dataset: config.dataset.clone(),
        api_version: config.api_version.clone(),
        use_cdn: config.use_cdn,
        token: config.token.clone(),
    });
    if let Some(api_url) = &config.api_url {
        client = client.with_base_url(api_url.as_str());
    }
    Ok(Backend { client: Arc::new(client), images })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_without_backend_fails() {
        let err = connect(&StorefrontConfig::default()).err().unwrap();
        assert!(matches!(err, ConfigError::NoBackend));
    }

    #[test]
    fn connect_prefers_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "[]").unwrap();
        let config = StorefrontConfig {
            project_id: Some("abc".into()),
            catalog: Some(path),
            ..StorefrontConfig::default()
        };
        let backend = connect(&config).unwrap();
        assert_eq!(backend.client.backend(), "catalog");
    }

    #[test]
    fn connect_uses_content_lake_with_project() {
        let config =
            StorefrontConfig { project_id: Some("abc".into()), ..StorefrontConfig::default() };
        assert_eq!(connect(&config).unwrap().client.backend(), "sanity");
    }
}
