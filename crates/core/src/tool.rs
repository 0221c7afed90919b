//! Tool trait: the abstraction over diagnostic capabilities.
//!
//! Tools let the model ask for live information the documents cannot give
//! (is a host reachable, how full is the disk). The set is allow-listed: a
//! tool exists only if it was registered, and every tool declares the shape
//! of argument it accepts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::ToolError;

/// A request to execute a tool, extracted from model output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRequest {
    /// Name of the tool to execute
    pub name: String,

    /// Raw argument text (may be empty)
    pub argument: String,
}

impl ToolRequest {
    pub fn new(name: impl Into<String>, argument: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            argument: argument.into(),
        }
    }
}

/// The result of a tool execution.
///
/// Success or failure is also spelled out in `output`, since the model only
/// ever sees the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Which tool produced this result (filled in by the registry)
    pub tool: String,

    /// The argument the tool was called with (filled in by the registry)
    pub argument: String,

    /// Whether the tool executed successfully
    pub success: bool,

    /// The output content
    pub output: String,
}

impl ToolResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            tool: String::new(),
            argument: String::new(),
            success: true,
            output: output.into(),
        }
    }

    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            tool: String::new(),
            argument: String::new(),
            success: false,
            output: output.into(),
        }
    }

    fn for_request(mut self, request: &ToolRequest) -> Self {
        self.tool = request.name.clone();
        self.argument = request.argument.clone();
        self
    }
}

/// What a tool accepts as its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentContract {
    /// Any argument is accepted and discarded.
    Ignored,
    /// A hostname or IPv4 address: ASCII alphanumerics, dots and hyphens only,
    /// not starting with a hyphen (it would be read as a command-line option).
    Hostname,
}

impl ArgumentContract {
    /// Placeholder shown to the model in the marker syntax.
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Ignored => "",
            Self::Hostname => "<host or IP>",
        }
    }

    /// Check `argument` against the contract.
    pub fn validate(&self, argument: &str) -> std::result::Result<(), ToolError> {
        match self {
            Self::Ignored => Ok(()),
            Self::Hostname => {
                let valid = !argument.is_empty()
                    && !argument.starts_with('-')
                    && argument
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
                if valid {
                    Ok(())
                } else {
                    Err(ToolError::InvalidArguments(format!(
                        "'{argument}' is not a valid host (letters, digits, dots and hyphens only, \
                         no leading hyphen)"
                    )))
                }
            }
        }
    }
}

/// The core Tool trait.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "ping").
    fn name(&self) -> &str;

    /// A description of what this tool does (shown to the model).
    fn description(&self) -> &str;

    /// The argument shape this tool accepts.
    fn argument_contract(&self) -> ArgumentContract;

    /// Execute the tool with the given raw argument.
    async fn execute(&self, argument: &str) -> std::result::Result<ToolResult, ToolError>;
}

/// A registry of available tools, keyed by name.
///
/// Parsing model output into [`ToolRequest`]s happens elsewhere; the
/// registry only decides whether a name is allowed and runs it.
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// All registered tools, sorted by name.
    pub fn tools(&self) -> impl Iterator<Item = &dyn Tool> {
        self.tools.values().map(|t| t.as_ref())
    }

    /// List all registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool request, surfacing failures as errors.
    pub async fn execute(
        &self,
        request: &ToolRequest,
    ) -> std::result::Result<ToolResult, ToolError> {
        let tool = self
            .tools
            .get(&request.name)
            .ok_or_else(|| ToolError::NotFound(request.name.clone()))?;
        let result = tool.execute(&request.argument).await?;
        Ok(result.for_request(request))
    }

    /// Execute a tool request; every failure becomes a failed result.
    pub async fn dispatch(&self, request: &ToolRequest) -> ToolResult {
        let start = Instant::now();
        let result = match self.execute(request).await {
            Ok(result) => result,
            Err(e) => {
                warn!(tool = %request.name, error = %e, "Tool execution failed");
                ToolResult::failure(format!("Error: {e}")).for_request(request)
            }
        };
        debug!(
            tool = %request.name,
            success = result.success,
            duration_ms = start.elapsed().as_millis() as u64,
            "Tool dispatched"
        );
        result
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
