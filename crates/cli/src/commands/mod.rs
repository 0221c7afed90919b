pub mod ask;
pub mod chat;
pub mod docs;
pub mod doctor;
pub mod onboard;
pub mod render;
pub mod tools;

use labassist_agent::AssistantLoop;
use labassist_config::AppConfig;
use std::path::{Path, PathBuf};

/// The config file to use: `--config` if given, else the default location.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_path)
}

pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let path = config_path(explicit);
    AppConfig::load_with_env(&path).map_err(|e| format!("Failed to load config: {e}").into())
}

/// Build the assistant from config, with document roots relative to the
/// current directory.
pub fn build_assistant(config: &AppConfig) -> Result<AssistantLoop, Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let provider = labassist_providers::build_from_config(config);
    Ok(AssistantLoop::from_config(config, provider, &cwd))
}
