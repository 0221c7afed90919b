//! The assistant loop: one question in, one grounded answer out.
//!
//! Per turn: select documents, compose the pass-1 prompt, ask the model for
//! a plan, run any tools the plan asks for, and if it asked for any, ask the
//! model again with the results. The final answer is appended to history.

use labassist_core::error::ProviderError;
use labassist_core::provider::{Provider, ProviderRequest, Usage};
use labassist_core::tool::{ToolRegistry, ToolResult};
use labassist_knowledge::{DocumentIndex, RelevanceSelector, SelectionMode};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::markers::extract_tool_requests;
use crate::prompt::PromptComposer;
use crate::session::{Input, Session, classify_input};
use crate::stream_event::AgentStreamEvent;

/// How a turn ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Blank input; the model was not called.
    Skipped,
    /// An exit keyword.
    Exit,
    /// An answer was produced and recorded.
    Answered(TurnReport),
    /// A model call failed; history is unchanged.
    Failed { message: String },
}

/// Details of an answered turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    pub answer: String,
    /// Source labels of the documents given to the model
    pub sources: Vec<String>,
    /// Whether priority rules picked the documents
    pub priority: bool,
    /// Tool results in execution order (empty for one-pass turns)
    pub tool_results: Vec<ToolResult>,
    /// Model calls made: 1 or 2
    pub passes: usize,
}

/// The orchestration loop that ties selection, prompting, model calls and
/// tool execution together.
pub struct AssistantLoop {
    /// The model service
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Max tokens per response
    max_tokens: Option<u32>,

    /// Allow-listed tools
    tools: Arc<ToolRegistry>,

    /// Where documents come from
    index: DocumentIndex,

    /// Which documents a query gets
    selector: RelevanceSelector,

    composer: PromptComposer,

    /// Use the provider's streaming API
    stream: bool,
}

impl AssistantLoop {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        tools: Arc<ToolRegistry>,
        index: DocumentIndex,
        selector: RelevanceSelector,
    ) -> Self {
        let composer = PromptComposer::new(&tools);
        Self {
            provider,
            model: model.into(),
            temperature: 0.2,
            max_tokens: None,
            tools,
            index,
            selector,
            composer,
            stream: false,
        }
    }

    /// Wire everything from configuration. Document roots resolve against
    /// `base`.
    pub fn from_config(
        config: &labassist_config::AppConfig,
        provider: Arc<dyn Provider>,
        base: &std::path::Path,
    ) -> Self {
        let tools = Arc::new(labassist_tools::default_registry(&config.tools));
        let composer = PromptComposer::from_config(&config.prompt, &tools);
        Self::new(
            provider,
            config.default_model.clone(),
            tools,
            DocumentIndex::from_config(&config.documents, base),
            RelevanceSelector::from_config(&config.retrieval),
        )
        .with_temperature(config.default_temperature)
        .with_max_tokens(config.default_max_tokens)
        .with_composer(composer)
        .with_streaming(config.stream)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_composer(mut self, composer: PromptComposer) -> Self {
        self.composer = composer;
        self
    }

    pub fn with_streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn index(&self) -> &DocumentIndex {
        &self.index
    }

    pub fn selector(&self) -> &RelevanceSelector {
        &self.selector
    }

    /// Process one line of user input.
    pub async fn process_turn(&self, session: &mut Session, input: &str) -> TurnOutcome {
        self.process_turn_with_events(session, input, None).await
    }

    /// Process one line of user input, reporting progress on `events`.
    pub async fn process_turn_with_events(
        &self,
        session: &mut Session,
        input: &str,
        events: Option<&UnboundedSender<AgentStreamEvent>>,
    ) -> TurnOutcome {
        let query = match classify_input(input) {
            Input::Skip => return TurnOutcome::Skipped,
            Input::Exit => return TurnOutcome::Exit,
            Input::Query(q) => q,
        };

        info!(
            session_id = %session.id(),
            turn = session.history.len() + 1,
            history_tokens = session.history.estimated_tokens(),
            "Processing query"
        );

        // ── Context selection ──
        let documents = self.index.list_documents();
        let selection = self.selector.select(query, &documents);
        let priority = matches!(selection.mode, SelectionMode::Priority { .. });
        let bundle = selection.into_bundle();
        let sources: Vec<String> = bundle.sources().into_iter().map(String::from).collect();
        debug!(documents = documents.len(), selected = ?sources, priority, "Context selected");

        // ── Pass 1: plan ──
        let plan_prompt = self.composer.compose(&bundle, &session.history, query);
        let (plan, usage) = match self.call_model(1, plan_prompt.clone(), events).await {
            Ok(reply) => reply,
            Err(e) => return self.fail(1, e, events),
        };

        let requests = extract_tool_requests(&plan);
        if requests.is_empty() {
            session.history.push(query, plan.clone());
            emit(events, AgentStreamEvent::Done {
                session_id: session.id().to_string(),
                passes: 1,
                tool_calls_made: 0,
                usage,
            });
            return TurnOutcome::Answered(TurnReport {
                answer: plan,
                sources,
                priority,
                tool_results: Vec::new(),
                passes: 1,
            });
        }

        // ── Tools, strictly one after another ──
        debug!(count = requests.len(), "Plan requested tools");
        let mut results = Vec::with_capacity(requests.len());
        for request in &requests {
            emit(events, AgentStreamEvent::ToolCall {
                name: request.name.clone(),
                argument: request.argument.clone(),
            });
            let result = self.tools.dispatch(request).await;
            emit(events, AgentStreamEvent::ToolResult {
                name: result.tool.clone(),
                output: result.output.clone(),
                success: result.success,
            });
            results.push(result);
        }

        // ── Pass 2: answer ──
        let followup = self.composer.compose_followup(&plan_prompt, &plan, &results);
        let (answer, usage) = match self.call_model(2, followup, events).await {
            Ok(reply) => reply,
            Err(e) => return self.fail(2, e, events),
        };

        session.history.push(query, answer.clone());
        emit(events, AgentStreamEvent::Done {
            session_id: session.id().to_string(),
            passes: 2,
            tool_calls_made: results.len(),
            usage,
        });

        TurnOutcome::Answered(TurnReport {
            answer,
            sources,
            priority,
            tool_results: results,
            passes: 2,
        })
    }

    /// One model call. Streaming and non-streaming yield the same text.
    async fn call_model(
        &self,
        pass: usize,
        prompt: String,
        events: Option<&UnboundedSender<AgentStreamEvent>>,
    ) -> Result<(String, Option<Usage>), ProviderError> {
        let prompt_chars = prompt.len();
        let request = ProviderRequest::from_prompt(&self.model, prompt)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);
        let start = Instant::now();

        let (text, usage) = if self.stream {
            let mut rx = self.provider.stream(request).await?;
            let mut text = String::new();
            let mut usage = None;
            while let Some(chunk) = rx.recv().await {
                let chunk = chunk?;
                if let Some(content) = chunk.content.filter(|c| !c.is_empty()) {
                    emit(events, AgentStreamEvent::Chunk {
                        pass,
                        content: content.clone(),
                    });
                    text.push_str(&content);
                }
                if chunk.usage.is_some() {
                    usage = chunk.usage;
                }
                if chunk.done {
                    break;
                }
            }
            (text, usage)
        } else {
            let response = self.provider.complete(request).await?;
            emit(events, AgentStreamEvent::Chunk {
                pass,
                content: response.message.content.clone(),
            });
            (response.message.content, response.usage)
        };

        debug!(
            pass,
            model = %self.model,
            prompt_chars,
            reply_chars = text.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Model call finished"
        );
        Ok((text, usage))
    }

    fn fail(
        &self,
        pass: usize,
        error: ProviderError,
        events: Option<&UnboundedSender<AgentStreamEvent>>,
    ) -> TurnOutcome {
        warn!(pass, provider = self.provider.name(), error = %error, "Model call failed");
        let message = format!("Error communicating with {}: {error}", self.provider.name());
        emit(events, AgentStreamEvent::Error {
            message: message.clone(),
        });
        TurnOutcome::Failed { message }
    }
}

fn emit(events: Option<&UnboundedSender<AgentStreamEvent>>, event: AgentStreamEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use labassist_knowledge::PriorityRule;
    use std::fs;
    use tempfile::TempDir;

    struct Lab {
        _dir: TempDir,
        index: DocumentIndex,
    }

    fn lab() -> Lab {
        let dir = tempfile::tempdir().unwrap();
        let infra = dir.path().join("infrastructure");
        let planning = dir.path().join("planning");
        fs::create_dir_all(&infra).unwrap();
        fs::create_dir_all(&planning).unwrap();
        fs::write(
            infra.join("network_map.md"),
            "foster-server: 192.168.1.10\nnas: 192.168.1.20",
        )
        .unwrap();
        fs::write(
            infra.join("services.md"),
            "foster-server runs jellyfin. foster-server runs pihole. foster-server backups nightly.",
        )
        .unwrap();
        fs::write(planning.join("roadmap.md"), "Q3: replace the switch").unwrap();
        let index = DocumentIndex::new(vec![infra, planning], "md");
        Lab { _dir: dir, index }
    }

    fn selector() -> RelevanceSelector {
        RelevanceSelector::new(
            vec![PriorityRule::new("foster", "network_map.md")],
            ["the", "is", "what", "of"].map(String::from),
            3,
        )
    }

    fn assistant(provider: Arc<dyn Provider>, tools: ToolRegistry, lab: &Lab) -> AssistantLoop {
        AssistantLoop::new(provider, "mock-model", Arc::new(tools), lab.index.clone(), selector())
    }

    fn ping_registry() -> (ToolRegistry, Arc<std::sync::Mutex<Vec<String>>>) {
        let ping = EchoTool::new("ping");
        let calls = ping.calls();
        let mut tools = ToolRegistry::new();
        tools.register(Box::new(ping));
        (tools, calls)
    }

    fn answered(outcome: TurnOutcome) -> TurnReport {
        match outcome {
            TurnOutcome::Answered(report) => report,
            other => panic!("expected an answer, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn blank_input_never_calls_the_model() {
        let lab = lab();
        let provider = Arc::new(SequentialMockProvider::texts(&[]));
        let agent = assistant(provider.clone(), ToolRegistry::new(), &lab);
        let mut session = Session::new();

        for input in ["", "   ", "\t\n"] {
            assert_eq!(agent.process_turn(&mut session, input).await, TurnOutcome::Skipped);
        }
        assert_eq!(provider.call_count(), 0);
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn exit_keyword_ends_without_model_call() {
        let lab = lab();
        let provider = Arc::new(SequentialMockProvider::texts(&[]));
        let agent = assistant(provider.clone(), ToolRegistry::new(), &lab);
        let mut session = Session::new();

        assert_eq!(agent.process_turn(&mut session, " QUIT ").await, TurnOutcome::Exit);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn plain_answer_is_one_pass() {
        let lab = lab();
        let provider = Arc::new(SequentialMockProvider::texts(&["foster-server is 192.168.1.10."]));
        let agent = assistant(provider.clone(), ToolRegistry::new(), &lab);
        let mut session = Session::new();

        let report =
            answered(agent.process_turn(&mut session, "what is the IP of foster-server").await);

        assert_eq!(report.answer, "foster-server is 192.168.1.10.");
        assert_eq!(report.passes, 1);
        assert!(report.priority);
        assert_eq!(report.sources, vec!["infrastructure/network_map.md"]);
        assert_eq!(provider.call_count(), 1);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history().turns()[0].answer, "foster-server is 192.168.1.10.");
    }

    #[tokio::test]
    async fn sniper_mode_context_reaches_the_prompt() {
        let lab = lab();
        let provider = Arc::new(SequentialMockProvider::texts(&["ok"]));
        let agent = assistant(provider.clone(), ToolRegistry::new(), &lab);
        let mut session = Session::new();

        agent.process_turn(&mut session, "what is the IP of foster-server").await;

        let prompt = &provider.prompts()[0];
        assert!(prompt.contains("--- SOURCE: infrastructure/network_map.md ---"));
        assert!(!prompt.contains("services.md"));
        assert!(prompt.contains("what is the IP of foster-server"));
    }

    #[tokio::test]
    async fn tool_marker_triggers_second_pass_and_history_keeps_final_answer() {
        let lab = lab();
        let provider = Arc::new(SequentialMockProvider::texts(&[
            "[TOOL: ping 192.168.1.10]",
            "foster-server is up.",
        ]));
        let (tools, calls) = ping_registry();
        let agent = assistant(provider.clone(), tools, &lab);
        let mut session = Session::new();

        let report = answered(agent.process_turn(&mut session, "is foster-server up?").await);

        assert_eq!(report.passes, 2);
        assert_eq!(report.answer, "foster-server is up.");
        assert_eq!(*calls.lock().unwrap(), vec!["192.168.1.10"]);
        assert_eq!(report.tool_results.len(), 1);
        assert_eq!(report.tool_results[0].tool, "ping");
        assert!(report.tool_results[0].success);

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].starts_with(&prompts[0]));
        assert!(prompts[1].contains("[TOOL: ping 192.168.1.10]"));
        assert!(prompts[1].contains("ping says 192.168.1.10"));

        let turns = session.history().turns();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].answer, "foster-server is up.");
    }

    #[tokio::test]
    async fn every_marker_runs_in_order_and_unknown_tools_do_not_abort() {
        let lab = lab();
        let provider = Arc::new(SequentialMockProvider::texts(&[
            "[TOOL: ping a.lan] [TOOL: reboot now] [TOOL: ping b.lan] [TOOL: ping a.lan]",
            "done",
        ]));
        let (tools, calls) = ping_registry();
        let agent = assistant(provider.clone(), tools, &lab);
        let mut session = Session::new();

        let report = answered(agent.process_turn(&mut session, "check the hosts").await);

        assert_eq!(*calls.lock().unwrap(), vec!["a.lan", "b.lan", "a.lan"]);
        let names: Vec<_> = report.tool_results.iter().map(|r| r.tool.as_str()).collect();
        assert_eq!(names, vec!["ping", "reboot", "ping", "ping"]);
        assert!(!report.tool_results[1].success);
        assert!(report.tool_results[1].output.contains("Tool not found: reboot"));
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn pass_one_failure_leaves_history_untouched() {
        let lab = lab();
        let provider = Arc::new(FailingProvider::after(&[]));
        let agent = assistant(provider.clone(), ToolRegistry::new(), &lab);
        let mut session = Session::new();

        match agent.process_turn(&mut session, "what is the IP of foster-server").await {
            TurnOutcome::Failed { message } => {
                assert!(message.contains("failing_mock"));
                assert!(message.contains("connection refused"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn pass_two_failure_leaves_history_untouched() {
        let lab = lab();
        let provider = Arc::new(FailingProvider::after(&["[TOOL: ping 192.168.1.10]"]));
        let (tools, calls) = ping_registry();
        let agent = assistant(provider.clone(), tools, &lab);
        let mut session = Session::new();

        let outcome = agent.process_turn(&mut session, "is foster-server up?").await;
        assert!(matches!(outcome, TurnOutcome::Failed { .. }));
        assert_eq!(calls.lock().unwrap().len(), 1);
        assert_eq!(provider.call_count(), 1);
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn history_carries_into_next_prompt() {
        let lab = lab();
        let provider = Arc::new(SequentialMockProvider::texts(&["first", "second"]));
        let agent = assistant(provider.clone(), ToolRegistry::new(), &lab);
        let mut session = Session::new();

        agent.process_turn(&mut session, "one").await;
        agent.process_turn(&mut session, "two").await;

        let second_prompt = &provider.prompts()[1];
        assert!(second_prompt.contains("User: one\nAssistant: first"));
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test]
    async fn events_follow_the_turn() {
        let lab = lab();
        let provider = Arc::new(SequentialMockProvider::texts(&[
            "[TOOL: ping 192.168.1.10]",
            "reachable",
        ]));
        let (tools, _) = ping_registry();
        let agent = assistant(provider, tools, &lab).with_streaming(true);
        let mut session = Session::new();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        agent
            .process_turn_with_events(&mut session, "is foster-server up?", Some(&tx))
            .await;
        drop(tx);

        let mut kinds = Vec::new();
        while let Some(event) = rx.recv().await {
            kinds.push(event.event_type());
        }
        assert_eq!(kinds, vec!["chunk", "tool_call", "tool_result", "chunk", "done"]);
    }

    #[tokio::test]
    async fn failure_emits_error_event() {
        let lab = lab();
        let agent = assistant(Arc::new(FailingProvider::after(&[])), ToolRegistry::new(), &lab);
        let mut session = Session::new();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        agent.process_turn_with_events(&mut session, "hello", Some(&tx)).await;
        drop(tx);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type(), "error");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn from_config_registers_default_tools() {
        let lab = lab();
        let config = labassist_config::AppConfig::default();
        let provider = Arc::new(SequentialMockProvider::texts(&[]));
        let agent = AssistantLoop::from_config(&config, provider, lab._dir.path());
        assert_eq!(agent.tools().names(), vec!["check_server", "ping"]);
        assert_eq!(agent.model(), config.default_model);
        assert_eq!(agent.index().roots().len(), 2);
    }
}
