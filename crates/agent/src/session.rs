//! Interactive session state and input classification.

use labassist_core::message::{ConversationHistory, SessionId};

/// Words that end the session (compared trimmed, case-insensitive).
pub const EXIT_KEYWORDS: [&str; 3] = ["exit", "quit", "q"];

/// What a line of user input asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    /// Blank or whitespace-only; nothing to do.
    Skip,
    /// An exit keyword.
    Exit,
    /// A question, trimmed.
    Query(&'a str),
}

pub fn classify_input(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Input::Skip
    } else if EXIT_KEYWORDS
        .iter()
        .any(|k| trimmed.eq_ignore_ascii_case(k))
    {
        Input::Exit
    } else {
        Input::Query(trimmed)
    }
}

/// One run of the assistant: an id and the turns answered so far.
///
/// History lives only in memory and is mutated only by
/// [`crate::AssistantLoop`].
#[derive(Debug, Default)]
pub struct Session {
    id: SessionId,
    pub(crate) history: ConversationHistory,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }
}
