use crate::ingest::IngestError;
use thiserror::Error;

/// Custom error types for the chat pipeline.
///
/// Each variant maps to one stage of a turn, so callers can tell a dead
/// database apart from a misbehaving model or a query the model got wrong.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to the AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize the AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("Database connection failed: {0}")]
    Connection(String),
    #[error("Failed to read table definitions: {0}")]
    SchemaUnavailable(String),
    #[error("Query execution failed: {0}")]
    QueryExecution(String),
    #[error("No data source is connected")]
    NotConnected,
    #[error("AI provider is missing")]
    MissingAiProvider,
    #[error("CSV ingestion failed: {0}")]
    Ingest(#[from] IngestError),
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}
