//! The question-answering loop for labassist.
//!
//! Each turn goes through a fixed cycle:
//!
//! 1. **Select** documentation for the query (priority rules, else ranking)
//! 2. **Plan**: send instructions, context, history and the query to the model
//! 3. **Act**: run every `[TOOL: name arg]` marker in the plan, in order
//! 4. **Answer**: if tools ran, send the plan and their results back for a
//!    final answer; otherwise the plan is the answer
//! 5. **Record** the final answer in the session history

pub mod loop_runner;
pub mod markers;
pub mod prompt;
pub mod session;
pub mod stream_event;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use loop_runner::{AssistantLoop, TurnOutcome, TurnReport};
pub use markers::extract_tool_requests;
pub use prompt::PromptComposer;
pub use session::{EXIT_KEYWORDS, Input, Session, classify_input};
pub use stream_event::AgentStreamEvent;
