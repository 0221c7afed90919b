//! Error types for the labassist domain.
//!
//! Uses `thiserror` for ergonomic error definitions. The model service and
//! the tools each get their own enum; neither is fatal to the process.

use thiserror::Error;

/// Failures talking to the language-model service.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures at the tool boundary.
///
/// These never escape [`crate::tool::ToolRegistry::dispatch`]; they are
/// rendered into the textual tool result instead.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_secs}s")]
    Timeout { tool_name: String, timeout_secs: u64 },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = ProviderError::ApiError {
            status_code: 500,
            message: "model crashed".into(),
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("model crashed"));
    }

    #[test]
    fn tool_error_displays_correctly() {
        let err = ToolError::Timeout {
            tool_name: "ping".into(),
            timeout_secs: 10,
        };
        assert_eq!(err.to_string(), "Tool timed out: ping after 10s");
    }

    #[test]
    fn not_found_mentions_tool_name() {
        let err = ToolError::NotFound("reboot".into());
        assert_eq!(err.to_string(), "Tool not found: reboot");
    }
}
