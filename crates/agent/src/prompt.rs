//! Prompt composition for both model passes.
//!
//! Pass 1 gets the instructions, the tool list, the documentation picked for
//! this query, the conversation so far and the question. Pass 2 replays the
//! pass-1 prompt and plan verbatim and appends the tool results. Nothing is
//! truncated unless a history cap is configured.

use labassist_core::message::ConversationHistory;
use labassist_core::tool::{ToolRegistry, ToolResult};
use labassist_knowledge::ContextBundle;

use crate::markers::marker_syntax;

/// Default behavior instructions.
pub const DEFAULT_INSTRUCTIONS: &str = "\
You are a Lab Assistant for a home server infrastructure.

CORE RULES:
1. Answer based ONLY on the provided documentation.
2. Inference vs Clarification:
   - If the user uses a generic term (e.g. \"the server\") and the documentation strongly implies a specific device, you may INFER it and answer.
   - If it is ambiguous, ASK the user to clarify which device they mean.
3. Be concise and technical.";

const NO_DOCUMENTS: &str = "(No documentation matched this question.)";

const FOLLOWUP_INSTRUCTION: &str = "\
Using the tool results above, answer the original question. Interpret and \
summarize what the results mean for the user. Do not request any more tools.";

/// Builds the text sent to the model.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    instructions: String,
    tool_section: String,
    history_turns: Option<usize>,
}

impl PromptComposer {
    /// Composer with the default instructions and the registry's tool list.
    pub fn new(tools: &ToolRegistry) -> Self {
        Self {
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            tool_section: render_tool_section(tools),
            history_turns: None,
        }
    }

    pub fn from_config(config: &labassist_config::PromptConfig, tools: &ToolRegistry) -> Self {
        let mut composer = Self::new(tools).with_history_turns(config.history_turns);
        if let Some(instructions) = &config.system_prompt_override {
            composer = composer.with_instructions(instructions.clone());
        }
        composer
    }

    /// Replace the behavior instructions. The tool list is always appended.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Serialize at most this many recent turns (`None` = all).
    pub fn with_history_turns(mut self, limit: Option<usize>) -> Self {
        self.history_turns = limit;
        self
    }

    /// Instructions plus the tool section.
    pub fn system_block(&self) -> String {
        if self.tool_section.is_empty() {
            self.instructions.clone()
        } else {
            format!("{}\n\n{}", self.instructions, self.tool_section)
        }
    }

    /// The pass-1 prompt.
    pub fn compose(
        &self,
        context: &ContextBundle,
        history: &ConversationHistory,
        query: &str,
    ) -> String {
        let mut prompt = self.system_block();

        prompt.push_str("\n\nDOCUMENTATION:\n");
        if context.is_empty() {
            prompt.push_str(NO_DOCUMENTS);
            prompt.push('\n');
        } else {
            prompt.push_str(&context.render());
        }

        let turns = history.recent(self.history_turns);
        if !turns.is_empty() {
            prompt.push_str("\nCONVERSATION SO FAR:\n");
            for turn in turns {
                prompt.push_str(&format!("User: {}\nAssistant: {}\n", turn.query, turn.answer));
            }
        }

        prompt.push_str(&format!("\nUser: {query}\nAssistant:"));
        prompt
    }

    /// The pass-2 prompt: the pass-1 exchange verbatim, then the tool results.
    pub fn compose_followup(
        &self,
        plan_prompt: &str,
        plan_response: &str,
        results: &[ToolResult],
    ) -> String {
        let mut prompt = String::with_capacity(plan_prompt.len() + plan_response.len() + 512);
        prompt.push_str(plan_prompt);
        prompt.push(' ');
        prompt.push_str(plan_response);
        prompt.push_str("\n\nTOOL RESULTS:\n");
        prompt.push_str(&render_tool_results(results));
        prompt.push('\n');
        prompt.push_str(FOLLOWUP_INSTRUCTION);
        prompt.push_str("\nAssistant:");
        prompt
    }
}

fn render_tool_section(tools: &ToolRegistry) -> String {
    if tools.is_empty() {
        return String::new();
    }
    let mut section = String::from(
        "TOOLS:\nYou can run live diagnostics. To run one, reply with its marker exactly as shown:\n",
    );
    for tool in tools.tools() {
        let syntax = marker_syntax(tool.name(), tool.argument_contract().placeholder());
        section.push_str(&format!("{syntax}  {}\n", tool.description()));
    }
    section.push_str("Only use a tool when the documentation cannot answer the question.");
    section
}

/// Tool results in execution order, one block each.
pub fn render_tool_results(results: &[ToolResult]) -> String {
    let mut out = String::new();
    for result in results {
        let status = if result.success { "ok" } else { "failed" };
        let call = if result.argument.is_empty() {
            result.tool.clone()
        } else {
            format!("{} {}", result.tool, result.argument)
        };
        out.push_str(&format!("[{call}] ({status})\n{}\n", result.output));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{EchoTool, doc};

    fn registry() -> ToolRegistry {
        let mut tools = ToolRegistry::new();
        tools.register(Box::new(EchoTool::new("ping")));
        tools.register(Box::new(EchoTool::new("check_server")));
        tools
    }

    #[test]
    fn pass_one_has_every_section_in_order() {
        let composer = PromptComposer::new(&registry());
        let bundle = ContextBundle::new(vec![doc(
            "infrastructure",
            "network_map.md",
            "foster-server: 192.168.1.10",
        )]);
        let mut history = ConversationHistory::new();
        history.push("what is the nas?", "The NAS is nas.lan.");

        let prompt = composer.compose(&bundle, &history, "what is the IP of foster-server");

        let rules = prompt.find("CORE RULES").unwrap();
        let tools = prompt.find("TOOLS:").unwrap();
        let docs = prompt.find("--- SOURCE: infrastructure/network_map.md ---").unwrap();
        let past = prompt.find("User: what is the nas?\nAssistant: The NAS is nas.lan.").unwrap();
        let question = prompt.find("User: what is the IP of foster-server").unwrap();
        assert!(rules < tools && tools < docs && docs < past && past < question);
        assert!(prompt.ends_with("Assistant:"));
    }

    #[test]
    fn tool_section_lists_marker_syntax_sorted() {
        let composer = PromptComposer::new(&registry());
        let block = composer.system_block();
        let check = block.find("[TOOL: check_server]").unwrap();
        let ping = block.find("[TOOL: ping <host or IP>]").unwrap();
        assert!(check < ping);
    }

    #[test]
    fn empty_registry_has_no_tool_section() {
        let composer = PromptComposer::new(&ToolRegistry::new());
        assert!(!composer.system_block().contains("TOOLS:"));
    }

    #[test]
    fn empty_context_is_stated() {
        let composer = PromptComposer::new(&registry());
        let prompt =
            composer.compose(&ContextBundle::default(), &ConversationHistory::new(), "hello");
        assert!(prompt.contains(NO_DOCUMENTS));
        assert!(!prompt.contains("CONVERSATION SO FAR"));
    }

    #[test]
    fn history_cap_keeps_latest_turns() {
        let composer = PromptComposer::new(&registry()).with_history_turns(Some(1));
        let mut history = ConversationHistory::new();
        history.push("old question", "old answer");
        history.push("new question", "new answer");

        let prompt = composer.compose(&ContextBundle::default(), &history, "next");
        assert!(!prompt.contains("old question"));
        assert!(prompt.contains("new question"));
    }

    #[test]
    fn instructions_can_be_overridden() {
        let composer = PromptComposer::new(&registry()).with_instructions("You are terse.");
        let block = composer.system_block();
        assert!(block.starts_with("You are terse."));
        assert!(block.contains("TOOLS:"));
        assert!(!block.contains("CORE RULES"));
    }

    #[test]
    fn followup_replays_plan_then_results() {
        let composer = PromptComposer::new(&registry());
        let results = vec![
            ToolResult {
                tool: "ping".into(),
                argument: "192.168.1.10".into(),
                success: true,
                output: "✅ 192.168.1.10 is reachable.".into(),
            },
            ToolResult {
                tool: "reboot".into(),
                argument: String::new(),
                success: false,
                output: "Error: Tool not found: reboot".into(),
            },
        ];

        let prompt =
            composer.compose_followup("PASS ONE PROMPT", "[TOOL: ping 192.168.1.10]", &results);

        assert!(prompt.starts_with("PASS ONE PROMPT [TOOL: ping 192.168.1.10]"));
        let first = prompt.find("[ping 192.168.1.10] (ok)").unwrap();
        let second = prompt.find("[reboot] (failed)\nError: Tool not found: reboot").unwrap();
        assert!(first < second);
        assert!(prompt.contains("Do not request any more tools."));
    }
}
