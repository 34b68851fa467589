//! Settings structures for Scout-RS configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main settings structure matching `scout.yml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Active search driver: `algolia`, `meilisearch` or `null`
    pub driver: String,
    /// Prefix prepended to every index name
    pub prefix: String,
    /// Number of models sent per indexing request
    pub chunk_size: usize,
    /// Batch size used by cursors
    pub cursor_chunk_size: u32,
    pub algolia: AlgoliaSettings,
    pub meilisearch: MeilisearchSettings,
    pub outgoing: OutgoingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            driver: "null".to_string(),
            prefix: String::new(),
            chunk_size: 500,
            cursor_chunk_size: 100,
            algolia: AlgoliaSettings::default(),
            meilisearch: MeilisearchSettings::default(),
            outgoing: OutgoingSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with environment variables
    pub fn merge_env(&mut self) {
        self.merge_from(|key| std::env::var(key).ok());
    }

    /// Merge overrides from an arbitrary lookup (environment by default)
    pub fn merge_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("SCOUT_DRIVER") {
            self.driver = val;
        }
        if let Some(val) = lookup("SCOUT_PREFIX") {
            self.prefix = val;
        }
        if let Some(val) = lookup("SCOUT_CHUNK_SIZE") {
            if let Ok(size) = val.parse() {
                self.chunk_size = size;
            }
        }
        if let Some(val) = lookup("ALGOLIA_APP_ID") {
            self.algolia.app_id = val;
        }
        if let Some(val) = lookup("ALGOLIA_SECRET") {
            self.algolia.secret = val;
        }
        if let Some(val) = lookup("MEILISEARCH_HOST") {
            self.meilisearch.host = val;
        }
        if let Some(val) = lookup("MEILISEARCH_KEY") {
            self.meilisearch.key = Some(val);
        }
    }
}

/// Algolia credentials and hosts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgoliaSettings {
    pub app_id: String,
    pub secret: String,
    /// Search host override (defaults to `https://{app_id}-dsn.algolia.net`)
    pub read_host: Option<String>,
    /// Indexing host override (defaults to `https://{app_id}.algolia.net`)
    pub write_host: Option<String>,
}

impl AlgoliaSettings {
    pub fn read_host(&self) -> String {
        self.read_host
            .clone()
            .unwrap_or_else(|| format!("https://{}-dsn.algolia.net", self.app_id))
    }

    pub fn write_host(&self) -> String {
        self.write_host
            .clone()
            .unwrap_or_else(|| format!("https://{}.algolia.net", self.app_id))
    }
}

/// Meilisearch host and key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeilisearchSettings {
    pub host: String,
    pub key: Option<String>,
}

impl Default for MeilisearchSettings {
    fn default() -> Self {
        Self {
            host: "http://localhost:7700".to_string(),
            key: None,
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Default request timeout in seconds
    pub request_timeout: f64,
    /// Pool max size
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 10.0,
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}
