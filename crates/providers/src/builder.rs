//! Builds the configured provider.

use labassist_core::provider::Provider;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::openai_compat::OpenAiCompatProvider;

/// Build the provider named by `default_provider`.
///
/// Every backend is reached through the OpenAI-compatible API; `api_url`
/// overrides the well-known base URL for the provider name.
pub fn build_from_config(config: &labassist_config::AppConfig) -> Arc<dyn Provider> {
    let name = config.default_provider.as_str();
    let base_url = config
        .api_url
        .clone()
        .unwrap_or_else(|| default_base_url(name));
    let api_key = config.api_key.clone().unwrap_or_else(|| {
        // Local servers ignore the key but some still require the header
        if name == "ollama" { "ollama".into() } else { String::new() }
    });

    debug!(provider = name, base_url = %base_url, "Building provider");

    Arc::new(OpenAiCompatProvider::with_timeout(
        name,
        base_url,
        api_key,
        Duration::from_secs(config.request_timeout_secs),
    ))
}

/// Get the default base URL for well-known providers.
pub fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "ollama" => "http://localhost:11434/v1".into(),
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        "lmstudio" => "http://localhost:1234/v1".into(),
        "openai" => "https://api.openai.com/v1".into(),
        _ => "http://localhost:11434/v1".into(),
    }
}
