//! Server health tool: uptime and root filesystem usage of this machine.

use async_trait::async_trait;
use labassist_core::error::ToolError;
use labassist_core::tool::{ArgumentContract, Tool, ToolResult};
use std::time::Duration;

use crate::command::{ExternalCommand, truncate};

/// Reports `uptime` and `df -h /` for the local host.
///
/// The argument is accepted and ignored. A section whose command fails is
/// reported inline; the tool only fails if every section fails.
pub struct CheckServerTool {
    command_timeout: Duration,
    max_output_chars: usize,
}

impl CheckServerTool {
    pub fn new(command_timeout: Duration, max_output_chars: usize) -> Self {
        Self {
            command_timeout,
            max_output_chars,
        }
    }

    pub fn from_config(config: &labassist_config::ToolsConfig) -> Self {
        Self::new(
            Duration::from_secs(config.command_timeout_secs),
            config.max_output_chars,
        )
    }

    fn sections(&self) -> Vec<(&'static str, ExternalCommand)> {
        vec![
            (
                "UPTIME",
                ExternalCommand::new("uptime").with_timeout(self.command_timeout),
            ),
            (
                "DISK USAGE (/)",
                ExternalCommand::new("df")
                    .args(["-h", "/"])
                    .with_timeout(self.command_timeout),
            ),
        ]
    }
}

impl Default for CheckServerTool {
    fn default() -> Self {
        Self::new(Duration::from_secs(10), 1500)
    }
}

#[async_trait]
impl Tool for CheckServerTool {
    fn name(&self) -> &str {
        "check_server"
    }

    fn description(&self) -> &str {
        "Report uptime, load and root disk usage of the machine running the assistant"
    }

    fn argument_contract(&self) -> ArgumentContract {
        ArgumentContract::Ignored
    }

    async fn execute(&self, _argument: &str) -> Result<ToolResult, ToolError> {
        let mut report = String::new();
        let mut any_ok = false;
        let mut last_error = None;

        for (label, command) in self.sections() {
            report.push_str(&format!("=== {label} ===\n"));
            match command.run(self.name()).await {
                Ok(output) if output.success => {
                    any_ok = true;
                    report.push_str(&truncate(&output.combined(), self.max_output_chars));
                }
                Ok(output) => {
                    report.push_str(&format!(
                        "Error: {} exited with {}: {}",
                        command.program(),
                        output
                            .code
                            .map(|c| c.to_string())
                            .unwrap_or_else(|| "signal".into()),
                        truncate(&output.combined(), self.max_output_chars)
                    ));
                }
                Err(e) => {
                    report.push_str(&format!("Error: {e}"));
                    last_error = Some(e);
                }
            }
            report.push('\n');
        }

        let report = report.trim_end().to_string();
        match (any_ok, last_error) {
            (true, _) => Ok(ToolResult::success(report)),
            (false, Some(e)) => Err(e),
            (false, None) => Ok(ToolResult::failure(report)),
        }
    }
}
