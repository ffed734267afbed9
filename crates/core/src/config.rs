//! `storefront.toml` loading.
//!
//! Lookup order: an explicit `--config` path, `./storefront.toml`, then the
//! global file in [`config_dir`](crate::config_dir). Command-line flags are
//! layered on top by the binaries.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

pub const CONFIG_FILE_NAME: &str = "storefront.toml";

/// Known keys in `storefront.toml` for config validation.
const KNOWN_CONFIG_KEYS: &[&str] =
    &["project_id", "dataset", "api_version", "use_cdn", "token", "api_url", "catalog"];

/// Environment variable consulted when no token is configured.
pub const TOKEN_ENV: &str = "SANITY_API_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not parse {}: {source}", path.display())]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("`{key}` must be a {expected}")]
    InvalidValue { key: &'static str, expected: &'static str },
    #[error("could not load catalog: {0}")]
    Catalog(#[from] crate::client::ClientError),
    #[error("no backend configured: set `project_id` for the content lake or `catalog` for a local JSON catalog")]
    NoBackend,
}

/// Runtime configuration for the content backend.
#[derive(Debug, Clone, PartialEq)]
pub struct StorefrontConfig {
    pub project_id: Option<String>,
    pub dataset: String,
    pub api_version: String,
    pub use_cdn: bool,
    pub token: Option<String>,
    /// Query API base URL, for a proxy in front of the content lake.
    pub api_url: Option<String>,
    /// JSON catalog file. When set, it takes precedence over the content lake.
    pub catalog: Option<PathBuf>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            dataset: "production".to_string(),
            api_version: "2024-01-01".to_string(),
            use_cdn: true,
            token: None,
            api_url: None,
            catalog: None,
        }
    }
}

/// Simple Levenshtein edit distance for typo suggestions.
fn edit_distance(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn warn_unknown_keys(table: &toml::Table) {
    for key in table.keys() {
        if KNOWN_CONFIG_KEYS.contains(&key.as_str()) {
            continue;
        }
        let suggestion = KNOWN_CONFIG_KEYS.iter().min_by_key(|k| edit_distance(key, k));
        match suggestion {
            Some(s) if edit_distance(key, s) <= 3 => warn!(
                key = key.as_str(),
                suggestion = *s,
                "Unknown key in storefront.toml: did you mean '{s}'?"
            ),
            _ => warn!(
                key = key.as_str(),
                "Unknown key in storefront.toml (known keys: {})",
                KNOWN_CONFIG_KEYS.join(", ")
            ),
        }
    }
}

fn string_key(table: &toml::Table, key: &'static str) -> Result<Option<String>, ConfigError> {
    match table.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or(ConfigError::InvalidValue { key, expected: "string" }),
    }
}

impl StorefrontConfig {
    /// Parse config text. Relative `catalog` paths resolve against `base_dir`.
    pub fn from_toml(content: &str, base_dir: &Path, path: &Path) -> Result<Self, ConfigError> {
        let table: toml::Table = content
            .parse()
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        warn_unknown_keys(&table);

        let mut config = Self::default();
        config.project_id = string_key(&table, "project_id")?;
        if let Some(dataset) = string_key(&table, "dataset")? {
            config.dataset = dataset;
        }
        if let Some(version) = string_key(&table, "api_version")? {
            config.api_version = version;
        }
        if let Some(v) = table.get("use_cdn") {
            config.use_cdn =
                v.as_bool().ok_or(ConfigError::InvalidValue { key: "use_cdn", expected: "boolean" })?;
        }
        config.token = string_key(&table, "token")?;
        config.api_url = string_key(&table, "api_url")?;
        config.catalog = string_key(&table, "catalog")?.map(|c| base_dir.join(c));
        Ok(config)
    }

    /// Load `path`, falling back to defaults for absent keys.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading storefront.toml");
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml(&content, base_dir, path)
    }

    /// Locate and load the config file, or return defaults when none exists.
    /// An explicit path must exist.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidates = [
            Some(PathBuf::from(CONFIG_FILE_NAME)),
            crate::config_dir().map(|d| d.join(CONFIG_FILE_NAME)),
        ];
        match candidates.into_iter().flatten().find(|p| p.exists()) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Fill the token from the environment when the file did not set one.
    pub fn with_env_token(mut self) -> Self {
        if self.token.is_none() {
            self.token = std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty());
        }
        self
    }
}
