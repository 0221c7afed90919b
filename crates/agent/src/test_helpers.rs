//! Shared test helpers.

use async_trait::async_trait;
use labassist_core::error::{ProviderError, ToolError};
use labassist_core::message::Message;
use labassist_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use labassist_core::tool::{ArgumentContract, Tool, ToolResult};
use labassist_knowledge::Document;
use std::path::PathBuf;
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue and
/// records the prompt it was given. Panics if more calls are made than
/// responses provided.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    prompts: Mutex<Vec<String>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Scripted plain-text replies, in order.
    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| make_text_response(t)).collect())
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Every prompt received, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut prompts = self.prompts.lock().unwrap();
        let responses = self.responses.lock().unwrap();
        let call = prompts.len();

        if call >= responses.len() {
            panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                call,
                responses.len()
            );
        }

        prompts.push(request.prompt_text());
        Ok(responses[call].clone())
    }
}

/// Answers the first `ok_calls` requests from the script, then fails.
pub struct FailingProvider {
    inner: SequentialMockProvider,
    ok_calls: usize,
}

impl FailingProvider {
    pub fn after(ok_texts: &[&str]) -> Self {
        Self {
            inner: SequentialMockProvider::texts(ok_texts),
            ok_calls: ok_texts.len(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.inner.call_count()
    }
}

#[async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        if self.inner.call_count() < self.ok_calls {
            return self.inner.complete(request).await;
        }
        Err(ProviderError::Network("connection refused".into()))
    }
}

/// Create a simple text response.
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Tool that echoes its argument and records every call.
pub struct EchoTool {
    name: String,
    calls: std::sync::Arc<Mutex<Vec<String>>>,
}

impl EchoTool {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            calls: Default::default(),
        }
    }

    /// Handle to the recorded arguments, usable after the tool is registered.
    pub fn calls(&self) -> std::sync::Arc<Mutex<Vec<String>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Echo the argument back"
    }

    fn argument_contract(&self) -> ArgumentContract {
        if self.name == "ping" {
            ArgumentContract::Hostname
        } else {
            ArgumentContract::Ignored
        }
    }

    async fn execute(&self, argument: &str) -> Result<ToolResult, ToolError> {
        self.calls.lock().unwrap().push(argument.to_string());
        Ok(ToolResult::success(format!("{} says {argument}", self.name)))
    }
}

/// An in-memory document under `/lab/<category>/<name>`.
pub fn doc(category: &str, name: &str, content: &str) -> Document {
    Document {
        path: PathBuf::from(format!("/lab/{category}/{name}")),
        name: name.to_string(),
        category: category.to_string(),
        source: format!("{category}/{name}"),
        content: content.to_string(),
    }
}
