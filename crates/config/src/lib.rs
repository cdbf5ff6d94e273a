//! Configuration loading, validation, and management for ReelBot.
//!
//! Loads configuration from `~/.reelbot/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.reelbot/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Completion backend API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default completion provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per completion
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Agent loop settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Movie/TV catalog service
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Embed player link settings
    #[serde(default)]
    pub embed: EmbedConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "groq".into()
}
fn default_model() -> String {
    "openai/gpt-oss-120b".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("agent", &self.agent)
            .field("catalog", &self.catalog)
            .field("embed", &self.embed)
            .field("gateway", &self.gateway)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Completion round-trips allowed per turn before the run is aborted
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,

    /// How many prior history entries are replayed into the prompt
    #[serde(default = "default_context_turns")]
    pub context_turns: usize,

    /// Fail a run whose answer carries links no tool produced
    #[serde(default)]
    pub enforce_grounding: bool,
}

fn default_max_turns() -> u32 {
    10
}
fn default_context_turns() -> usize {
    2
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            context_turns: default_context_turns(),
            enforce_grounding: false,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_url")]
    pub base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_catalog_timeout")]
    pub timeout_secs: u64,
}

fn default_catalog_url() -> String {
    "https://api.themoviedb.org/3".into()
}
fn default_catalog_timeout() -> u64 {
    30
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_url(),
            api_key: None,
            timeout_secs: default_catalog_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedConfig {
    #[serde(default = "default_embed_url")]
    pub base_url: String,
}

fn default_embed_url() -> String {
    "https://www.vidking.net".into()
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            base_url: default_embed_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Entries each session keeps (user and assistant turns both count)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_port() -> u16 {
    3000
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_history_limit() -> usize {
    10
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            history_limit: default_history_limit(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.reelbot/config.toml).
    ///
    /// Environment variables take priority over the file; see
    /// [`AppConfig::apply_env`].
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// - `REELBOT_API_KEY`, `GROQ_API_KEY`, `OPENAI_API_KEY` (first found)
    ///   replace the completion key
    /// - `TMDB_API_KEY` replaces the catalog key
    /// - `REELBOT_PROVIDER`, `REELBOT_MODEL` replace the defaults
    /// - `PORT` replaces the gateway port when it parses
    ///
    /// Unset variables leave the file's values alone.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("REELBOT_API_KEY")
            .or_else(|| lookup("GROQ_API_KEY"))
            .or_else(|| lookup("OPENAI_API_KEY"))
        {
            self.api_key = Some(key);
        }

        if let Some(key) = lookup("TMDB_API_KEY") {
            self.catalog.api_key = Some(key);
        }

        if let Some(provider) = lookup("REELBOT_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = lookup("REELBOT_MODEL") {
            self.default_model = model;
        }

        if let Some(port) = lookup("PORT") {
            match port.parse() {
                Ok(port) => self.gateway.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring unparseable PORT"),
            }
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".reelbot")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.agent.max_turns == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_turns must be at least 1".into(),
            ));
        }

        if self.gateway.history_limit < self.agent.context_turns {
            return Err(ConfigError::ValidationError(
                "gateway.history_limit must not be smaller than agent.context_turns".into(),
            ));
        }

        for (field, url) in [
            ("catalog.base_url", &self.catalog.base_url),
            ("embed.base_url", &self.embed.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::ValidationError(format!(
                    "{field} must start with http:// or https://"
                )));
            }
        }

        Ok(())
    }

    /// Check if a completion API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Whether the default provider can authenticate: a top-level key, a key
    /// in its own `[providers.*]` table, or a local ollama backend.
    pub fn default_provider_ready(&self) -> bool {
        self.has_api_key()
            || self.default_provider == "ollama"
            || self
                .providers
                .get(&self.default_provider)
                .is_some_and(|p| p.api_key.is_some())
    }

    /// Check if a catalog API key is available.
    pub fn has_catalog_key(&self) -> bool {
        self.catalog.api_key.is_some()
    }

    /// Generate a default config TOML string (for the `config` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            agent: AgentConfig::default(),
            catalog: CatalogConfig::default(),
            embed: EmbedConfig::default(),
            gateway: GatewayConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
