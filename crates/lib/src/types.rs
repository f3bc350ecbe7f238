use crate::agent::{SqlAgent, TabularAgent};
use crate::errors::ChatError;
use crate::providers::ai::AiProvider;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// The loosely typed result of executing a generated query: ordered rows of
/// named scalar values.
///
/// Column names come back from the driver; every cell is already converted
/// to JSON, so the set can be serialized for a prompt or a response body
/// without further inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Serializes the rows as an array of column-keyed objects, the shape
    /// handed to the synthesis prompt.
    pub fn to_json(&self) -> Value {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut object = Map::new();
                for (i, column) in self.columns.iter().enumerate() {
                    object.insert(
                        column.clone(),
                        row.get(i).cloned().unwrap_or(Value::Null),
                    );
                }
                Value::Object(object)
            })
            .collect();
        Value::Array(rows)
    }
}

/// A client that turns natural language questions into executed queries and
/// prose answers.
///
/// The client itself is stateless; conversation state lives in a
/// [`ChatSession`](crate::session::ChatSession) passed to each call, so one
/// client can serve any number of sessions.
pub struct ChatClient {
    pub(crate) ai_provider: Box<dyn AiProvider>,
    pub(crate) tabular_agent: Box<dyn TabularAgent>,
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("ai_provider", &self.ai_provider)
            .finish_non_exhaustive()
    }
}

/// A builder for creating `ChatClient` instances.
#[derive(Default)]
pub struct ChatClientBuilder {
    ai_provider: Option<Box<dyn AiProvider>>,
    tabular_agent: Option<Box<dyn TabularAgent>>,
}

impl ChatClientBuilder {
    /// Creates a new `ChatClientBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the AI provider used for both chain stages.
    pub fn ai_provider(mut self, provider: Box<dyn AiProvider>) -> Self {
        self.ai_provider = Some(provider);
        self
    }

    /// Overrides the agent used for uploaded datasets.
    ///
    /// When unset, the client uses a [`SqlAgent`] sharing the chat AI
    /// provider.
    pub fn tabular_agent(mut self, agent: Box<dyn TabularAgent>) -> Self {
        self.tabular_agent = Some(agent);
        self
    }

    /// Builds the `ChatClient`.
    ///
    /// Returns [`ChatError::MissingAiProvider`] if no provider was set.
    pub fn build(self) -> Result<ChatClient, ChatError> {
        let ai_provider = self.ai_provider.ok_or(ChatError::MissingAiProvider)?;
        let tabular_agent = self
            .tabular_agent
            .unwrap_or_else(|| Box::new(SqlAgent::new(ai_provider.clone())));

        Ok(ChatClient {
            ai_provider,
            tabular_agent,
        })
    }
}
