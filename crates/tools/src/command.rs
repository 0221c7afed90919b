//! External command capability.
//!
//! Tools never build shell strings. A command is a program plus an argument
//! vector, run with a wall-clock timeout, with stdout and stderr captured.

use labassist_core::error::ToolError;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

/// A fixed program invocation with a bounded run time.
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit status reported success
    pub success: bool,
    /// Exit code, if the process exited normally
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Stdout followed by stderr, trimmed.
    pub fn combined(&self) -> String {
        let stdout = self.stdout.trim();
        let stderr = self.stderr.trim();
        match (stdout.is_empty(), stderr.is_empty()) {
            (_, true) => stdout.to_string(),
            (true, false) => stderr.to_string(),
            (false, false) => format!("{stdout}\n{stderr}"),
        }
    }
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn argv(&self) -> &[String] {
        &self.args
    }

    /// Run to completion. The child is killed if the timeout elapses.
    ///
    /// A non-zero exit is not an error here; callers classify it from
    /// [`CommandOutput::success`].
    pub async fn run(&self, tool_name: &str) -> Result<CommandOutput, ToolError> {
        debug!(tool = tool_name, program = %self.program, args = ?self.args, "Running command");
        let start = Instant::now();

        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!(
                    tool = tool_name,
                    program = %self.program,
                    error = %e,
                    "Failed to start command"
                );
                return Err(ToolError::ExecutionFailed {
                    tool_name: tool_name.to_string(),
                    reason: format!("could not run '{}': {e}", self.program),
                });
            }
            Err(_) => {
                warn!(tool = tool_name, program = %self.program, "Command timed out");
                return Err(ToolError::Timeout {
                    tool_name: tool_name.to_string(),
                    timeout_secs: self.timeout.as_secs().max(1),
                });
            }
        };

        let result = CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        debug!(
            tool = tool_name,
            program = %self.program,
            success = result.success,
            code = ?result.code,
            duration_ms = start.elapsed().as_millis() as u64,
            "Command finished"
        );

        Ok(result)
    }
}

/// Cut `text` to at most `max_chars` characters, marking the cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}... [truncated]", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc... [truncated]");
        assert_eq!(truncate("✅✅✅", 2), "✅✅... [truncated]");
        assert_eq!(truncate("", 0), "");
    }

    #[test]
    fn combined_output() {
        let out = CommandOutput {
            success: true,
            code: Some(0),
            stdout: "up 3 days\n".into(),
            stderr: String::new(),
        };
        assert_eq!(out.combined(), "up 3 days");

        let both = CommandOutput {
            stderr: "warning\n".into(),
            ..out.clone()
        };
        assert_eq!(both.combined(), "up 3 days\nwarning");

        let only_err = CommandOutput {
            stdout: String::new(),
            ..both
        };
        assert_eq!(only_err.combined(), "warning");
    }

    #[test]
    fn builder_collects_argv() {
        let cmd = ExternalCommand::new("ping").args(["-c", "2"]).arg("host");
        assert_eq!(cmd.program(), "ping");
        assert_eq!(cmd.argv(), ["-c", "2", "host"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_stdout_and_exit_status() {
        let out = ExternalCommand::new("echo")
            .arg("hello lab")
            .run("test")
            .await
            .unwrap();
        assert!(out.success);
        assert_eq!(out.code, Some(0));
        assert_eq!(out.stdout.trim(), "hello lab");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_not_an_error() {
        let out = ExternalCommand::new("false").run("test").await.unwrap();
        assert!(!out.success);
    }

    #[tokio::test]
    async fn missing_program_is_execution_failure() {
        let err = ExternalCommand::new("labassist-no-such-program")
            .run("test")
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timeout_kills_and_reports() {
        let err = ExternalCommand::new("sleep")
            .arg("5")
            .with_timeout(Duration::from_millis(100))
            .run("slow")
            .await
            .unwrap_err();
        match err {
            ToolError::Timeout { tool_name, .. } => assert_eq!(tool_name, "slow"),
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
