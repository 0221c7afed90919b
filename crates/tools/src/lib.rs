//! Allow-listed diagnostic tools for labassist.
//!
//! The model can ask for exactly these tools and nothing else. Each one runs
//! a fixed program through [`command::ExternalCommand`], never a shell.

pub mod check_server;
pub mod command;
pub mod ping;

pub use check_server::CheckServerTool;
pub use command::{CommandOutput, ExternalCommand};
pub use ping::PingTool;

use labassist_core::tool::ToolRegistry;

/// Create the registry of built-in tools.
pub fn default_registry(config: &labassist_config::ToolsConfig) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(PingTool::from_config(config)));
    registry.register(Box::new(CheckServerTool::from_config(config)));
    registry
}
