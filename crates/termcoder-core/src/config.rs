//! Configuration management for termcoder
//!
//! Settings come from an optional TOML file in the user's config directory.
//! The file is only ever read: conversation history and the permission mode
//! live for the lifetime of the process and are never written back.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::approval::PermissionMode;
use crate::error::{Error, Result};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model used for new sessions
    pub model: String,
    /// Permission mode at session start
    pub permission_mode: PermissionMode,
    /// Maximum consecutive tool rounds per user turn
    pub max_tool_rounds: usize,
    /// Model service settings
    pub ollama: ModelConfig,
    /// Web search/fetch settings
    pub web: WebConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: defaults::MODEL.to_string(),
            permission_mode: PermissionMode::Default,
            max_tool_rounds: defaults::MAX_TOOL_ROUNDS,
            ollama: ModelConfig::default(),
            web: WebConfig::default(),
        }
    }
}

/// Built-in defaults
pub mod defaults {
    pub const MODEL: &str = "minimax-m2.1:cloud";
    pub const MAX_TOOL_ROUNDS: usize = 50;
    pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";
    pub const API_KEY_ENV: &str = "OLLAMA_API_KEY";
    pub const REQUEST_TIMEOUT_SECS: u64 = 600;
    pub const WEB_BASE_URL: &str = "https://ollama.com";
    pub const FETCH_MAX_CHARS: usize = 8000;
    pub const FETCH_MAX_LINKS: usize = 20;
    pub const SEARCH_MAX_RESULTS: u64 = 5;
}

/// Model service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Base URL of the chat API
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Request timeout for a single model call
    pub request_timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::OLLAMA_BASE_URL.to_string(),
            api_key_env: defaults::API_KEY_ENV.to_string(),
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ModelConfig {
    /// Get the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
    }
}

/// Web tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Base URL of the hosted web search/fetch API
    pub base_url: String,
    /// Fetched page content is cut to this many characters
    pub fetch_max_chars: usize,
    /// At most this many links are returned from a fetch
    pub fetch_max_links: usize,
    /// Result count used when the model does not ask for one
    pub default_max_results: u64,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::WEB_BASE_URL.to_string(),
            fetch_max_chars: defaults::FETCH_MAX_CHARS,
            fetch_max_links: defaults::FETCH_MAX_LINKS,
            default_max_results: defaults::SEARCH_MAX_RESULTS,
        }
    }
}

/// Loads configuration from disk
pub struct ConfigManager {
    config_path: PathBuf,
    config: Config,
}

impl ConfigManager {
    /// Create a config manager using the default path
    pub fn new() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::with_path(config_path)
    }

    /// Create a config manager with a specific path
    ///
    /// A missing file yields the defaults.
    pub fn with_path(config_path: PathBuf) -> Result<Self> {
        let config = if config_path.exists() {
            Self::load_from_path(&config_path)?
        } else {
            debug!(path = %config_path.display(), "No config file, using defaults");
            Config::default()
        };

        Ok(Self { config_path, config })
    }

    /// Get the default config path
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not find config directory".to_string()))?;

        Ok(config_dir.join("termcoder").join("config.toml"))
    }

    fn load_from_path(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        let config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Path the configuration was (or would be) loaded from
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Get the current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the manager, keeping the configuration
    pub fn into_config(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model, "minimax-m2.1:cloud");
        assert_eq!(config.permission_mode, PermissionMode::Default);
        assert_eq!(config.max_tool_rounds, 50);
        assert_eq!(config.ollama.base_url, "http://localhost:11434");
        assert_eq!(config.web.fetch_max_chars, 8000);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
model = "llama3:8b"
permission_mode = "accept-edits"

[web]
fetch_max_chars = 1000
"#,
        )
        .unwrap();

        assert_eq!(config.model, "llama3:8b");
        assert_eq!(config.permission_mode, PermissionMode::AcceptEdits);
        assert_eq!(config.web.fetch_max_chars, 1000);
        assert_eq!(config.web.fetch_max_links, 20);
        assert_eq!(config.max_tool_rounds, 50);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("config.toml")).unwrap();
        assert_eq!(manager.config().model, defaults::MODEL);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "model = [not toml").unwrap();

        let result = ConfigManager::with_path(path);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("permission_mode = \"default\""));
        assert!(toml_str.contains("[ollama]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model, config.model);
    }
}
