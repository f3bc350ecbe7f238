//! # Conversation History
//!
//! This module defines the transcript kept for each chat session. The
//! transcript is append-only: turns are pushed as question/answer pairs once
//! a pipeline run has fully succeeded and are never edited afterwards, so
//! the rendered conversation is always an exact record of what happened.

use serde::{Deserialize, Serialize};

/// The maximum number of turns serialized into a prompt.
///
/// The full transcript is kept in memory for display; only the context sent
/// to the model is capped, oldest turns first.
pub const PROMPT_HISTORY_WINDOW: usize = 50;

/// The speaker of a [`Turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    /// Creates a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// An ordered, append-only transcript scoped to one session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatHistory {
    turns: Vec<Turn>,
}

impl ChatHistory {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a completed question/answer exchange.
    ///
    /// This is called only after both pipeline stages have succeeded, so a
    /// failed turn never leaves an orphaned question in the transcript.
    pub fn record_exchange(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.turns.push(Turn::user(question));
        self.turns.push(Turn::assistant(answer));
    }

    /// The full transcript, oldest turn first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Serializes the most recent turns as conversational context for a
    /// prompt, one `Human:`/`Assistant:` line per turn.
    ///
    /// Only the last [`PROMPT_HISTORY_WINDOW`] turns are included so that a
    /// long-running session cannot grow the prompt without bound.
    pub fn render_for_prompt(&self) -> String {
        let start = self.turns.len().saturating_sub(PROMPT_HISTORY_WINDOW);
        self.turns[start..]
            .iter()
            .map(|turn| {
                let label = match turn.role {
                    Role::User => "Human",
                    Role::Assistant => "Assistant",
                };
                format!("{label}: {content}", content = turn.content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
