//! # tabletalk
//!
//! This crate lets a user chat with their data: natural language questions
//! are turned into SQL by an AI provider, executed against a connected
//! database or an uploaded dataset, and the raw results are turned back
//! into a prose answer.
//!
//! A turn against a database runs a two-stage chain: a query generation
//! prompt produces the statement, the statement runs verbatim, and a second
//! prompt synthesizes the answer from the rows that came back. Uploaded
//! datasets skip the second stage and are answered by a [`agent::TabularAgent`].

pub mod agent;
pub mod errors;
pub mod history;
pub mod ingest;
pub mod prompts;
pub mod providers;
pub mod session;
pub mod types;

pub use errors::ChatError;
pub use history::{ChatHistory, Role, Turn};
pub use session::{ChatSession, DataSource};
pub use types::{ChatClient, ChatClientBuilder, ResultSet};

use crate::providers::db::SqlBackend;
use tracing::{debug, error, info};

impl ChatClient {
    /// Answers one natural language question against the session's source.
    ///
    /// For a database source this runs the full two-stage chain; for an
    /// uploaded dataset it delegates to the tabular agent. On success the
    /// question and answer are appended to the session transcript as a
    /// pair. On failure nothing is appended, so the transcript never holds
    /// a question without its answer.
    pub async fn ask(
        &self,
        session: &mut ChatSession,
        question: &str,
    ) -> Result<String, ChatError> {
        let answer = match session.source().ok_or(ChatError::NotConnected)? {
            DataSource::Database(backend) => {
                self.answer_database_question(backend.as_ref(), session.history(), question)
                    .await?
            }
            DataSource::Tabular(source) => {
                let output = self.tabular_agent.ask(source, question).await?;
                agent::render_agent_output(&output)
            }
        };

        session.record_exchange(question, &answer);
        Ok(answer)
    }

    /// Runs the two-stage chain: question to query, query to rows, rows to
    /// prose.
    async fn answer_database_question(
        &self,
        backend: &dyn SqlBackend,
        history: &ChatHistory,
        question: &str,
    ) -> Result<String, ChatError> {
        info!(dialect = backend.dialect(), "[ask] received question: {question:?}");

        // The schema snapshot is taken fresh for every turn.
        let schema = backend.table_info().await?;
        let history_text = if history.is_empty() {
            prompts::EMPTY_HISTORY.to_string()
        } else {
            history.render_for_prompt()
        };

        let system_prompt = prompts::sql_generation_system_prompt(backend.dialect());
        let user_prompt = prompts::build_sql_generation_prompt(&schema, &history_text, question);
        debug!(system_prompt = %system_prompt, user_prompt = %user_prompt, "--> Sending generation prompts to AI provider");

        let raw_completion = self
            .ai_provider
            .generate(&system_prompt, &user_prompt)
            .await?;

        // The completion is contractually a bare statement and is passed to
        // the database as-is, minus surrounding whitespace. No fences are
        // stripped and no keywords are checked; a model that breaks the
        // contract surfaces as a query execution error.
        let query = raw_completion.trim();
        debug!("<-- Query from AI: {query}");

        let result = backend.run(query).await;
        if let Err(e) = &result {
            error!("[ask] Query execution error: {e:?}");
        }
        let result = result?;

        // Pre-serialize the rows so the model sees them the same way every
        // time.
        let response_json = serde_json::to_string_pretty(&result.to_json())?;

        let synthesis_prompt = prompts::build_synthesis_prompt(
            &schema,
            &history_text,
            question,
            query,
            &response_json,
        );
        debug!(user_prompt = %synthesis_prompt, "--> Sending synthesis prompt to AI provider");

        self.ai_provider
            .generate(prompts::SYNTHESIS_SYSTEM_PROMPT, &synthesis_prompt)
            .await
    }
}
