//! # Tabular Agent
//!
//! This module answers questions about an uploaded dataset. The dataset is
//! staged into an in-process SQLite table by [`crate::ingest`], and the
//! default agent reuses the query generation prompt to produce a statement
//! it then executes against that table.
//!
//! Unlike the database chat path there is no synthesis stage here: the
//! result rows are classified by shape and rendered locally, one formatting
//! branch per shape.

use crate::errors::ChatError;
use crate::prompts;
use crate::providers::ai::AiProvider;
use crate::providers::db::{sqlite::SqliteBackend, SqlBackend};
use crate::types::ResultSet;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;
use tracing::{debug, info};

/// An uploaded dataset staged into an in-process SQLite table.
#[derive(Debug, Clone)]
pub struct TabularSource {
    pub backend: SqliteBackend,
    pub table_name: String,
}

/// A tagged agent answer.
///
/// Producers pick the variant when the result shape is known; consumers
/// match on it instead of inspecting values at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutput {
    /// A single scalar or free-text result.
    Text(String),
    /// A single column of results.
    TextList(Vec<String>),
    /// Row-shaped results: an object for one row, an array of objects for
    /// several.
    Structured(Value),
}

/// A trait for answering questions about tabular data.
///
/// Implementations are granted the ability to run generated statements
/// against the staged dataset. That grant is the whole point of the seam:
/// the dataset is a throwaway in-memory copy, so a bad statement costs
/// nothing durable.
#[async_trait]
pub trait TabularAgent: Send + Sync + Debug {
    async fn ask(&self, source: &TabularSource, question: &str)
        -> Result<AgentOutput, ChatError>;
}

/// The default tabular agent.
///
/// Generates a query for the staged table with the same prompt template as
/// the database path and executes it verbatim. Each question stands alone;
/// the agent carries no conversation context.
#[derive(Clone, Debug)]
pub struct SqlAgent {
    ai_provider: Box<dyn AiProvider>,
}

impl SqlAgent {
    pub fn new(ai_provider: Box<dyn AiProvider>) -> Self {
        Self { ai_provider }
    }
}

#[async_trait]
impl TabularAgent for SqlAgent {
    async fn ask(
        &self,
        source: &TabularSource,
        question: &str,
    ) -> Result<AgentOutput, ChatError> {
        info!(table = %source.table_name, "[agent] Answering tabular question");

        let schema = source.backend.table_info().await?;
        let system_prompt = prompts::sql_generation_system_prompt(source.backend.dialect());
        let user_prompt =
            prompts::build_sql_generation_prompt(&schema, prompts::EMPTY_HISTORY, question);

        let raw_completion = self.ai_provider.generate(&system_prompt, &user_prompt).await?;
        let query = raw_completion.trim();
        debug!("<-- Agent query: {query}");

        let result = source.backend.run(query).await?;
        Ok(classify_result(result))
    }
}

/// Tags a result set by its shape.
///
/// One cell becomes `Text`, one column becomes `TextList`, anything wider
/// becomes `Structured`. An empty result is reported as text rather than an
/// error, since a query that matches nothing still answered the question.
pub fn classify_result(result: ResultSet) -> AgentOutput {
    if result.is_empty() {
        return AgentOutput::Text("The query returned no results.".to_string());
    }

    if result.columns.len() == 1 {
        let mut values: Vec<String> = result
            .rows
            .iter()
            .map(|row| render_scalar(row.first()))
            .collect();
        if values.len() == 1 {
            return AgentOutput::Text(values.remove(0));
        }
        return AgentOutput::TextList(values);
    }

    if result.rows.len() == 1 {
        if let Some(object) = result.to_json().as_array().and_then(|rows| rows.first()) {
            return AgentOutput::Structured(object.clone());
        }
    }

    AgentOutput::Structured(result.to_json())
}

/// Formats a tagged output as prose, one branch per variant.
pub fn render_agent_output(output: &AgentOutput) -> String {
    match output {
        AgentOutput::Text(text) => format!("Based on the data, the answer is: {text}"),
        AgentOutput::TextList(items) => {
            let mut rendered = format!("I found {count} results:\n", count = items.len());
            for item in items {
                rendered.push_str(&format!("- {item}\n"));
            }
            rendered.trim_end().to_string()
        }
        AgentOutput::Structured(Value::Object(fields)) => fields
            .iter()
            .map(|(key, value)| {
                format!("The {key} is {value}.", value = render_scalar(Some(value)))
            })
            .collect::<Vec<_>>()
            .join("\n"),
        AgentOutput::Structured(Value::Array(rows)) => {
            let mut rendered = format!("I found {count} rows:\n", count = rows.len());
            for row in rows {
                rendered.push_str(&format!("- {row}\n"));
            }
            rendered.trim_end().to_string()
        }
        AgentOutput::Structured(other) => other.to_string(),
    }
}

/// Renders a single JSON scalar without quoting strings.
fn render_scalar(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
