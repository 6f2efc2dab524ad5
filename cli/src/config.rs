//! # Configuration Management
//!
//! This module handles loading and saving CLI configuration: the embedding
//! provider, the completion provider, and the vector index endpoint.
//!
//! ## Configuration File Location
//!
//! All platforms: `$HOME/.config/firstline/config.json`
//!
//! On Windows, uses `%USERPROFILE%\.config\firstline\config.json` if `$HOME`
//! is not set.
//!
//! ## API Keys
//!
//! Keys are preferably referenced by environment variable name
//! (`api_key_env`) rather than stored in the file. A stored `api_key` is
//! only a fallback.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Environment variable for overriding the urgency threshold
const URGENCY_THRESHOLD_ENV_VAR: &str = "URGENCY_THRESHOLD";

/// Embedding provider configuration
///
/// # Supported Providers
///
/// - `openai`: OpenAI embeddings API (text-embedding-3-small and friends)
/// - `ollama`: Local Ollama instance (nomic-embed-text and friends)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider name (openai, ollama)
    pub provider: String,
    /// API endpoint URL; provider default when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Model name (e.g., text-embedding-3-small, nomic-embed-text)
    pub model: String,
    /// Embedding dimensions; provider default when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<usize>,
    /// API key (plaintext fallback)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable name for the API key (preferred over api_key)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

impl EmbeddingConfig {
    /// Create a new OpenAI embedding configuration
    pub fn openai(model: &str) -> Self {
        Self {
            provider: "openai".to_string(),
            endpoint: None,
            model: model.to_string(),
            dimensions: None,
            api_key: None,
            api_key_env: Some("OPENAI_API_KEY".to_string()),
        }
    }

    /// Create a new Ollama embedding configuration
    pub fn ollama(endpoint: &str, model: &str) -> Self {
        Self {
            provider: "ollama".to_string(),
            endpoint: Some(endpoint.to_string()),
            model: model.to_string(),
            dimensions: None,
            api_key: None,
            api_key_env: None,
        }
    }

    /// Get the API key from environment or config
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(ref env_var) = self.api_key_env {
            if let Ok(key) = std::env::var(env_var) {
                return Some(key);
            }
        }
        self.api_key.clone()
    }

    /// Check if the provider is configured and ready to use
    pub fn is_ready(&self) -> bool {
        // Ollama doesn't require an API key
        if self.provider == "ollama" {
            return true;
        }
        self.get_api_key().is_some()
    }
}

/// Completion provider configuration (OpenRouter)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Provider name (openrouter)
    pub provider: String,
    /// API endpoint URL; provider default when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Model name (e.g., openai/gpt-4o-mini)
    pub model: String,
    /// API key (plaintext fallback)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable name for the API key (preferred over api_key)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

impl CompletionConfig {
    /// Create a new OpenRouter completion configuration
    pub fn openrouter(model: &str) -> Self {
        Self {
            provider: "openrouter".to_string(),
            endpoint: None,
            model: model.to_string(),
            api_key: None,
            api_key_env: Some("OPENROUTER_API_KEY".to_string()),
        }
    }

    /// Get the API key from environment or config
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(ref env_var) = self.api_key_env {
            if let Ok(key) = std::env::var(env_var) {
                return Some(key);
            }
        }
        self.api_key.clone()
    }

    /// Check if the provider is configured and ready to use
    pub fn is_ready(&self) -> bool {
        self.get_api_key().is_some()
    }
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Index HTTP endpoint
    pub endpoint: String,
    /// Optional namespace within the index
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// API key (plaintext fallback)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable name for the API key (preferred over api_key)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

impl IndexConfig {
    /// Create a new index configuration
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            namespace: None,
            api_key: None,
            api_key_env: Some("VECTOR_INDEX_API_KEY".to_string()),
        }
    }

    /// Get the API key from environment or config
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(ref env_var) = self.api_key_env {
            if let Ok(key) = std::env::var(env_var) {
                return Some(key);
            }
        }
        self.api_key.clone()
    }
}

/// CLI configuration
///
/// Stores provider settings for the answer pipeline. All sections are
/// optional so the triage commands work before any provider is configured.
///
/// # Example
///
/// ```rust
/// use firstline::config::{Config, EmbeddingConfig};
///
/// let mut config = Config::default();
/// config.embedding = Some(EmbeddingConfig::openai("text-embedding-3-small"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Embedding provider settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<EmbeddingConfig>,
    /// Completion provider settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion: Option<CompletionConfig>,
    /// Vector index settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexConfig>,
    /// Urgency threshold for triage call suggestions (default 5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency_threshold: Option<u8>,
}

impl Config {
    /// Check if every pipeline section is present
    pub fn has_pipeline(&self) -> bool {
        self.embedding.is_some() && self.completion.is_some() && self.index.is_some()
    }

    /// The effective urgency threshold
    ///
    /// Environment variable `URGENCY_THRESHOLD` takes precedence over the
    /// config file; absent both, the triage default applies.
    pub fn effective_urgency_threshold(&self) -> u8 {
        std::env::var(URGENCY_THRESHOLD_ENV_VAR)
            .ok()
            .and_then(|raw| raw.parse().ok())
            .or(self.urgency_threshold)
            .unwrap_or(firstline_triage::DEFAULT_URGENCY_THRESHOLD)
    }

    /// Load configuration from the default config file
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded configuration
    /// * `Err(_)` - Configuration file not found or invalid
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load the configuration, or start a fresh one if no file exists yet
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Save configuration to the default config file
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let path = config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Check if a configuration file exists
    pub fn exists() -> bool {
        config_path().map(|p| p.exists()).unwrap_or(false)
    }

    /// Delete the configuration file
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Successfully deleted or file didn't exist
    /// * `Err(_)` - Failed to delete file
    pub fn delete() -> Result<()> {
        let path = config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to delete config file: {}", path.display()))?;
        }
        Ok(())
    }
}

/// Get the path to the configuration file
///
/// Uses `$XDG_CONFIG_HOME/firstline/config.json` when set, otherwise
/// `$HOME/.config/firstline/config.json`.
fn config_path() -> Result<PathBuf> {
    let config_dir = dirs_config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join("firstline").join("config.json"))
}

/// Get the config directory
///
/// Uses `$HOME/.config` on all platforms for consistency.
fn dirs_config_dir() -> Option<PathBuf> {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .or_else(|| std::env::var("USERPROFILE").ok())
                .map(|h| PathBuf::from(h).join(".config"))
        })
}

/// Mask an API key for display
///
/// Shows the first and last four characters and masks the rest.
pub fn mask_key(key: &str) -> String {
    if key.len() > 8 {
        format!("{}...{}", &key[..4], &key[key.len() - 4..])
    } else {
        "****".to_string()
    }
}
