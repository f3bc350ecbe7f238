use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tabletalk::ChatError;
use tracing::error;

/// A custom error type for the server application.
///
/// This enum encapsulates different kinds of errors that can occur within the server,
/// allowing them to be converted into appropriate HTTP responses.
pub enum AppError {
    /// Errors originating from the `tabletalk` library.
    Chat(ChatError),
    /// Requests the handler rejected before touching the chat client.
    BadRequest(String),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

/// Conversion from `ChatError` to `AppError`.
impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        AppError::Chat(err)
    }
}

/// Conversion from `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Chat(err) => {
                // Log the original error for debugging purposes
                error!("ChatError: {:?}", err);
                match err {
                    ChatError::MissingAiProvider => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Server is not configured correctly.".to_string(),
                    ),
                    ChatError::ReqwestClientBuild(e) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Failed to build HTTP client: {e}"),
                    ),
                    ChatError::AiRequest(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Request to AI provider failed: {e}"),
                    ),
                    ChatError::AiDeserialization(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Failed to deserialize AI provider response: {e}"),
                    ),
                    ChatError::AiApi(e) => {
                        (StatusCode::BAD_GATEWAY, format!("AI provider error: {e}"))
                    }
                    ChatError::Connection(e) => (
                        StatusCode::BAD_REQUEST,
                        format!("Database connection error: {e}"),
                    ),
                    ChatError::SchemaUnavailable(e) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Failed to read table definitions: {e}"),
                    ),
                    ChatError::QueryExecution(e) => (
                        StatusCode::BAD_REQUEST,
                        format!("Query execution failed: {e}"),
                    ),
                    ChatError::NotConnected => (
                        StatusCode::BAD_REQUEST,
                        "No data source is connected. Connect a database or upload a dataset first."
                            .to_string(),
                    ),
                    ChatError::Ingest(e) => {
                        (StatusCode::BAD_REQUEST, format!("Ingestion failed: {e}"))
                    }
                    ChatError::JsonSerialization(e) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Failed to serialize result: {e}"),
                    ),
                }
            }
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
