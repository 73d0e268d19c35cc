//! Configuration for routing, search behaviour, and the content store.
//!
//! Configuration is stored as TOML. [`Config::load`] reads `global.toml`
//! from the platform config directory and falls back to defaults when the
//! file does not exist; environment variables with the `DOCSITE_` prefix
//! override individual values afterwards.
//!
//! ## Example Configuration File
//!
//! ```toml
//! [routes]
//! dataset_prefix = "/datasets"
//! docs_prefix = "/docs"
//!
//! [search]
//! default_limit = 100
//! tokenize = "full"
//! context_depth = 2
//! context_boost = 2.0
//!
//! [store]
//! endpoint = "https://abc123.api.example-cms.io"
//! dataset = "production"
//! api_version = "2024-01-01"
//! timeout_secs = 30
//! ```
//!
//! ```rust
//! use docsite_core::Config;
//!
//! let config: Config = toml::from_str("[search]\ndefault_limit = 5\n")?;
//! assert_eq!(config.search.default_limit, 5);
//! assert_eq!(config.routes.docs_prefix, "/docs");
//! # Ok::<(), toml::de::Error>(())
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding [`StoreConfig::corpus`].
pub const ENV_CORPUS: &str = "DOCSITE_CORPUS";
/// Environment variable overriding [`StoreConfig::endpoint`].
pub const ENV_ENDPOINT: &str = "DOCSITE_ENDPOINT";
/// Environment variable overriding [`StoreConfig::dataset`].
pub const ENV_DATASET: &str = "DOCSITE_DATASET";
/// Environment variable overriding [`StoreConfig::token`].
pub const ENV_TOKEN: &str = "DOCSITE_TOKEN";
/// Environment variable overriding [`SearchConfig::default_limit`].
pub const ENV_SEARCH_LIMIT: &str = "DOCSITE_SEARCH_LIMIT";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where documents are routed on the site
    pub routes: RoutesConfig,
    /// Search index and query behaviour
    pub search: SearchConfig,
    /// Where the document corpus comes from
    pub store: StoreConfig,
}

/// URL prefixes per page type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Prefix for pages whose type is `dataset`.
    pub dataset_prefix: String,
    /// Prefix for every other page type.
    pub docs_prefix: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            dataset_prefix: "/datasets".to_string(),
            docs_prefix: "/docs".to_string(),
        }
    }
}

/// How each query token is matched against indexed words.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tokenize {
    /// Whole words only.
    Strict,
    /// Whole words or word prefixes (`rad` finds `radar`).
    Forward,
    /// Any part of a word (`dar` finds `radar`).
    #[default]
    Full,
}

/// Search index and query settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Result count when a query does not pass a limit.
    pub default_limit: usize,

    /// Matching mode for query tokens.
    pub tokenize: Tokenize,

    /// Maximum distance, in words, between query tokens for a result to get
    /// the proximity boost. Zero means the tokens must be adjacent.
    pub context_depth: u32,

    /// Score multiplier for the proximity clause.
    pub context_boost: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 100,
            tokenize: Tokenize::Full,
            context_depth: 2,
            context_boost: 2.0,
        }
    }
}

/// Content store settings.
///
/// `corpus` selects a JSON file on disk; otherwise `endpoint` selects a
/// remote query API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON corpus file; takes precedence over `endpoint`.
    pub corpus: Option<PathBuf>,
    /// Base URL of the CMS query API.
    pub endpoint: Option<String>,
    /// CMS dataset name.
    pub dataset: String,
    /// CMS API version, without the leading `v`.
    pub api_version: String,
    /// Bearer token for private datasets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            corpus: None,
            endpoint: None,
            dataset: "production".to_string(),
            api_version: "2024-01-01".to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from the default location or fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined, or if
    /// the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::from_path(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("Failed to parse config: {e}")))
    }

    /// Write the configuration as TOML, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;

        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;

        Ok(())
    }

    /// Apply `DOCSITE_*` environment overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup; empty values are ignored.
    ///
    /// An endpoint override clears a corpus read from the file unless a
    /// corpus override is also present.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let corpus = get(ENV_CORPUS);
        if let Some(endpoint) = get(ENV_ENDPOINT) {
            self.store.endpoint = Some(endpoint);
            // an endpoint override outranks a corpus from the config file
            if corpus.is_none() {
                self.store.corpus = None;
            }
        }
        if let Some(corpus) = corpus {
            self.store.corpus = Some(PathBuf::from(corpus));
        }
        if let Some(dataset) = get(ENV_DATASET) {
            self.store.dataset = dataset;
        }
        if let Some(token) = get(ENV_TOKEN) {
            self.store.token = Some(token);
        }
        if let Some(limit) = get(ENV_SEARCH_LIMIT) {
            self.search.default_limit = limit.trim().parse().map_err(|_| {
                Error::Config(format!("{ENV_SEARCH_LIMIT} must be a positive integer, got '{limit}'"))
            })?;
        }

        Ok(())
    }

    /// Path of the global configuration file.
    ///
    /// - Linux: `~/.config/docsite/global.toml`
    /// - macOS: `~/Library/Application Support/dev.docsite.docsite/global.toml`
    /// - Windows: `%APPDATA%\docsite\docsite\config\global.toml`
    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = directories::ProjectDirs::from("dev", "docsite", "docsite")
            .ok_or_else(|| Error::Config("Failed to determine project directories".into()))?;

        Ok(project_dirs.config_dir().join("global.toml"))
    }
}
