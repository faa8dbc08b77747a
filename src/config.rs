//! Application configuration
//!
//! Loaded from `config.toml` in the user's config directory. Every field has a
//! default so a missing file or a partial file is fine.

use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

/// Remote catalog endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Page size requested from the listing endpoint
    #[serde(default = "default_limit")]
    pub limit: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first failed attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,

    #[serde(default = "default_retry_max_ms")]
    pub retry_max_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Suggestions shown while the query is empty
    #[serde(default = "default_popular_searches")]
    pub popular_searches: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// Age after which a cached result is refetched
    #[serde(default = "default_stale_secs")]
    pub stale_secs: u64,

    /// Idle time after which a cached result is dropped
    #[serde(default = "default_gc_secs")]
    pub gc_secs: u64,

    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiConfig {
    /// Lines per dropdown row
    #[serde(default = "default_item_height")]
    pub item_height: u16,

    /// Rows rendered beyond the visible window on each side
    #[serde(default = "default_overscan")]
    pub overscan: usize,

    /// Maximum dropdown height in lines
    #[serde(default = "default_max_dropdown_height")]
    pub max_dropdown_height: u16,

    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    #[serde(default = "default_true")]
    pub mouse: bool,
}

fn default_base_url() -> String {
    "https://fakestoreapi.com".to_string()
}

fn default_limit() -> usize {
    15
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_ms() -> u64 {
    1000
}

fn default_retry_max_ms() -> u64 {
    30_000
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_popular_searches() -> Vec<String> {
    ["Electronics", "Jewelry", "Men's Clothing", "Women's Clothing"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_stale_secs() -> u64 {
    60
}

fn default_gc_secs() -> u64 {
    300
}

fn default_capacity() -> usize {
    64
}

fn default_item_height() -> u16 {
    2
}

fn default_overscan() -> usize {
    5
}

fn default_max_dropdown_height() -> u16 {
    10
}

fn default_tick_ms() -> u64 {
    50
}

fn default_true() -> bool {
    true
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            limit: default_limit(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_base_ms: default_retry_base_ms(),
            retry_max_ms: default_retry_max_ms(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            popular_searches: default_popular_searches(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_secs: default_stale_secs(),
            gc_secs: default_gc_secs(),
            capacity: default_capacity(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            item_height: default_item_height(),
            overscan: default_overscan(),
            max_dropdown_height: default_max_dropdown_height(),
            tick_ms: default_tick_ms(),
            mouse: default_true(),
        }
    }
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl CacheConfig {
    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_secs)
    }

    pub fn gc_time(&self) -> Duration {
        Duration::from_secs(self.gc_secs)
    }
}

impl AppConfig {
    /// Default location: `<config dir>/prodsearch/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("prodsearch").join("config.toml"))
    }

    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: AppConfig =
            toml::from_str(&contents).map_err(|source| SearchError::ConfigParse {
                path: path.display().to_string(),
                source,
            })?;
        config.validate()?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from the default location, or defaults if there is none
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.catalog.limit == 0 {
            return Err(SearchError::InvalidConfig(
                "catalog.limit must be at least 1".to_string(),
            ));
        }
        if url::Url::parse(&self.catalog.base_url).is_err() {
            return Err(SearchError::InvalidConfig(format!(
                "catalog.base_url '{}' is not a valid URL",
                self.catalog.base_url
            )));
        }
        if self.ui.item_height == 0 {
            return Err(SearchError::InvalidConfig(
                "ui.item_height must be at least 1".to_string(),
            ));
        }
        if self.cache.capacity == 0 {
            return Err(SearchError::InvalidConfig(
                "cache.capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
