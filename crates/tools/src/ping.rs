//! Ping tool: is a host reachable?

use async_trait::async_trait;
use labassist_core::error::ToolError;
use labassist_core::tool::{ArgumentContract, Tool, ToolResult};
use std::time::Duration;
use tracing::debug;

use crate::command::{ExternalCommand, truncate};

/// Sends a few echo requests to a hostname or IPv4 address.
///
/// The target is validated before any process is spawned. Reachability is
/// decided by the exit status of `ping`, never by parsing its output.
pub struct PingTool {
    count: u32,
    reply_timeout_secs: u32,
    command_timeout: Duration,
    max_output_chars: usize,
}

impl PingTool {
    pub fn new(count: u32, reply_timeout_secs: u32) -> Self {
        Self {
            count: count.max(1),
            reply_timeout_secs: reply_timeout_secs.max(1),
            command_timeout: Duration::from_secs(10),
            max_output_chars: 1500,
        }
    }

    pub fn from_config(config: &labassist_config::ToolsConfig) -> Self {
        Self::new(config.ping_count, config.ping_timeout_secs)
            .with_command_timeout(Duration::from_secs(config.command_timeout_secs))
            .with_max_output_chars(config.max_output_chars)
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_max_output_chars(mut self, max: usize) -> Self {
        self.max_output_chars = max;
        self
    }

    /// Platform-appropriate invocation for `target`.
    fn command(&self, target: &str) -> ExternalCommand {
        let cmd = if cfg!(target_os = "windows") {
            ExternalCommand::new("ping").args([
                "-n".to_string(),
                self.count.to_string(),
                "-w".to_string(),
                (self.reply_timeout_secs * 1000).to_string(),
            ])
        } else {
            ExternalCommand::new("ping").args([
                "-c".to_string(),
                self.count.to_string(),
                "-W".to_string(),
                self.reply_timeout_secs.to_string(),
            ])
        };
        cmd.arg(target).with_timeout(self.command_timeout)
    }
}

impl Default for PingTool {
    fn default() -> Self {
        Self::new(2, 2)
    }
}

#[async_trait]
impl Tool for PingTool {
    fn name(&self) -> &str {
        "ping"
    }

    fn description(&self) -> &str {
        "Check whether a host on the network is reachable"
    }

    fn argument_contract(&self) -> ArgumentContract {
        ArgumentContract::Hostname
    }

    async fn execute(&self, argument: &str) -> Result<ToolResult, ToolError> {
        let target = argument.trim();
        self.argument_contract().validate(target)?;

        let output = self.command(target).run(self.name()).await?;
        let excerpt = truncate(&output.combined(), self.max_output_chars);
        debug!(target, success = output.success, "Ping finished");

        if output.success {
            Ok(ToolResult::success(format!(
                "✅ {target} is reachable.\n{excerpt}"
            )))
        } else {
            Ok(ToolResult::failure(format!(
                "❌ {target} is unreachable.\n{excerpt}"
            )))
        }
    }
}
