//! # Prompt Templates
//!
//! This module contains the prompt templates for the two-stage chain: one
//! pair for turning a question into a query, and one pair for turning the
//! raw query result back into prose. Filling a template is a pure string
//! substitution, so the same inputs always produce the same prompt.

/// The system prompt for the query generation stage.
///
/// This sets the persona and the output contract: the completion must be a
/// single bare statement, with nothing around it. The library trusts that
/// contract and passes the completion to the database untouched.
///
/// Placeholders: `{dialect}`
pub const SQL_GENERATION_SYSTEM_PROMPT: &str = "You are a {dialect} expert. Given a table schema and a conversation, write the single {dialect} query that answers the user's question. Expected output is the query text only: no explanations, no markdown fences, no trailing commentary.";

/// The user prompt for the query generation stage.
///
/// The two worked examples are fixed exemplars baked into the template, not
/// user data; they anchor the expected output shape for the model.
///
/// Placeholders: `{schema}`, `{history}`, `{question}`
pub const SQL_GENERATION_USER_PROMPT: &str = r#"Based on the table schema below, write a SQL query that would answer the user's question.

# Table Schema
{schema}

# Conversation So Far
{history}

# Examples
Question: How many employees are there?
SQL Query: SELECT COUNT(*) FROM Employee;

Question: Name 10 artists
SQL Query: SELECT Name FROM Artist LIMIT 10;

Question: {question}
SQL Query:"#;

/// The system prompt for the response synthesis stage.
pub const SYNTHESIS_SYSTEM_PROMPT: &str = "You are a helpful data assistant. Given a table schema, a conversation, a question, the SQL query that was run, and its raw response, write a natural language answer to the question. Base the answer only on the SQL response.";

/// The user prompt for the response synthesis stage.
///
/// Placeholders: `{schema}`, `{history}`, `{question}`, `{query}`, `{response}`
pub const SYNTHESIS_USER_PROMPT: &str = r#"Based on the table schema below, question, SQL query, and SQL response, write a natural language response.

# Table Schema
{schema}

# Conversation So Far
{history}

Question: {question}
SQL Query: {query}
SQL Response: {response}"#;

/// The placeholder rendered into a prompt when the transcript is empty.
pub const EMPTY_HISTORY: &str = "(no prior conversation)";

/// Fills the query generation system prompt for a given dialect.
pub fn sql_generation_system_prompt(dialect: &str) -> String {
    SQL_GENERATION_SYSTEM_PROMPT.replace("{dialect}", dialect)
}

/// Fills the query generation user prompt.
pub fn build_sql_generation_prompt(schema: &str, history: &str, question: &str) -> String {
    SQL_GENERATION_USER_PROMPT
        .replace("{schema}", schema)
        .replace("{history}", history)
        .replace("{question}", question)
}

/// Fills the response synthesis user prompt.
pub fn build_synthesis_prompt(
    schema: &str,
    history: &str,
    question: &str,
    query: &str,
    response: &str,
) -> String {
    SYNTHESIS_USER_PROMPT
        .replace("{schema}", schema)
        .replace("{history}", history)
        .replace("{question}", question)
        .replace("{query}", query)
        .replace("{response}", response)
}
