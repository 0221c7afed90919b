//! Configuration loading, validation, and management for labassist.
//!
//! Loads configuration from `~/.labassist/config.toml` with environment
//! variable overrides. Every key is optional; a missing file means defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.labassist/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Provider name, used to pick a default base URL
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Model identifier passed to the provider
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Max tokens per model response (provider default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_max_tokens: Option<u32>,

    /// Override the provider's base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// API key, for endpoints that want one (local Ollama does not)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// HTTP timeout for a single model call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Print model output as it is generated
    #[serde(default = "default_true")]
    pub stream: bool,

    #[serde(default)]
    pub documents: DocumentsConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub prompt: PromptConfig,
}

fn default_provider() -> String {
    "ollama".into()
}
fn default_model() -> String {
    "llama3.1:8b".into()
}
fn default_temperature() -> f32 {
    0.2
}
fn default_request_timeout_secs() -> u64 {
    120
}
fn default_true() -> bool {
    true
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("stream", &self.stream)
            .field("documents", &self.documents)
            .field("retrieval", &self.retrieval)
            .field("tools", &self.tools)
            .field("prompt", &self.prompt)
            .finish()
    }
}

/// Where the documentation lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsConfig {
    /// Root directories, walked recursively. Relative paths resolve against
    /// the current directory. Missing roots are skipped.
    #[serde(default = "default_roots")]
    pub roots: Vec<String>,

    /// File extension (without the dot) that marks a document
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_roots() -> Vec<String> {
    vec!["infrastructure".into(), "planning".into()]
}
fn default_extension() -> String {
    "md".into()
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            roots: default_roots(),
            extension: default_extension(),
        }
    }
}

impl DocumentsConfig {
    /// Roots as paths, relative entries joined onto `base`.
    pub fn resolved_roots(&self, base: &Path) -> Vec<PathBuf> {
        self.roots
            .iter()
            .map(|r| {
                let path = PathBuf::from(r);
                if path.is_absolute() { path } else { base.join(path) }
            })
            .collect()
    }
}

/// Document selection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Max documents returned by keyword ranking (priority rules ignore it)
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Query words ignored by keyword ranking
    #[serde(default = "default_stop_words")]
    pub stop_words: Vec<String>,

    /// Keyword → document overrides, checked before ranking
    #[serde(default = "default_priority_rules")]
    pub priority_rules: Vec<PriorityRuleConfig>,
}

/// One priority override: if `keyword` appears in the query (case-insensitive),
/// every document whose path contains `target` is forced into context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityRuleConfig {
    pub keyword: String,
    pub target: String,
}

impl PriorityRuleConfig {
    pub fn new(keyword: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            target: target.into(),
        }
    }
}

fn default_top_k() -> usize {
    3
}

fn default_stop_words() -> Vec<String> {
    [
        "a", "about", "an", "and", "are", "can", "do", "does", "for", "how", "i", "in", "is",
        "it", "me", "my", "of", "on", "or", "please", "tell", "that", "the", "this", "to",
        "what", "when", "where", "which", "who", "with", "you",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_priority_rules() -> Vec<PriorityRuleConfig> {
    vec![
        PriorityRuleConfig::new("foster", "network_map.md"),
        PriorityRuleConfig::new("tailscale", "network_map.md"),
        PriorityRuleConfig::new("subnet", "network_map.md"),
        PriorityRuleConfig::new("roadmap", "roadmap.md"),
    ]
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            stop_words: default_stop_words(),
            priority_rules: default_priority_rules(),
        }
    }
}

/// Limits for the diagnostic tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Echo requests sent per ping
    #[serde(default = "default_ping_count")]
    pub ping_count: u32,

    /// Seconds ping waits for each reply
    #[serde(default = "default_ping_timeout_secs")]
    pub ping_timeout_secs: u32,

    /// Wall-clock cap for any tool process
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,

    /// Tool output is truncated to this many characters
    #[serde(default = "default_max_output_chars")]
    pub max_output_chars: usize,
}

fn default_ping_count() -> u32 {
    2
}
fn default_ping_timeout_secs() -> u32 {
    2
}
fn default_command_timeout_secs() -> u64 {
    10
}
fn default_max_output_chars() -> usize {
    1500
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ping_count: default_ping_count(),
            ping_timeout_secs: default_ping_timeout_secs(),
            command_timeout_secs: default_command_timeout_secs(),
            max_output_chars: default_max_output_chars(),
        }
    }
}

/// Prompt composition settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Replace the built-in role instructions (tool syntax is still appended)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_override: Option<String>,

    /// Only serialize the most recent N turns. Unset = the whole session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_turns: Option<usize>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.labassist/config.toml),
    /// then apply environment overrides:
    /// - `LABASSIST_PROVIDER`
    /// - `LABASSIST_MODEL`
    /// - `LABASSIST_API_URL`
    /// - `LABASSIST_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_path())
    }

    /// Load from `path`, then apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
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

    /// Apply overrides from a key lookup (the process environment in `load`).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup("LABASSIST_PROVIDER") {
            self.default_provider = provider;
        }
        if let Some(model) = lookup("LABASSIST_MODEL") {
            self.default_model = model;
        }
        if let Some(url) = lookup("LABASSIST_API_URL") {
            self.api_url = Some(url);
        }
        if let Some(key) = lookup("LABASSIST_API_KEY") {
            self.api_key = Some(key);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".labassist")
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.default_model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "default_model must not be empty".into(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.top_k must be at least 1".into(),
            ));
        }

        if self.documents.extension.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "documents.extension must not be empty".into(),
            ));
        }

        if let Some(rule) = self
            .retrieval
            .priority_rules
            .iter()
            .find(|r| r.keyword.trim().is_empty() || r.target.trim().is_empty())
        {
            return Err(ConfigError::ValidationError(format!(
                "priority rule '{}' → '{}' needs both a keyword and a target",
                rule.keyword, rule.target
            )));
        }

        if self.tools.command_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "tools.command_timeout_secs must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    /// Write the default config to `path`, refusing to overwrite.
    pub fn write_default(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::WriteError {
                path: path.to_path_buf(),
                reason: "file already exists".into(),
            });
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }
        std::fs::write(path, Self::default_toml()).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: None,
            api_url: None,
            api_key: None,
            request_timeout_secs: default_request_timeout_secs(),
            stream: true,
            documents: DocumentsConfig::default(),
            retrieval: RetrievalConfig::default(),
            tools: ToolsConfig::default(),
            prompt: PromptConfig::default(),
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

    #[error("Failed to write config file at {path}: {reason}")]
    WriteError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
