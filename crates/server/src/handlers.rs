use super::{errors::AppError, state::AppState};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabletalk::{
    providers::db::{mysql::ConnectionParams, SqlBackend},
    DataSource, Turn,
};
use tracing::info;

// --- API Payloads ---

#[derive(Serialize)]
pub struct ConnectResponse {
    pub message: String,
    pub tables: Vec<String>,
}

#[derive(Deserialize)]
pub struct IngestCsvRequest {
    pub table_name: String,
    pub csv: String,
}

#[derive(Serialize)]
pub struct IngestCsvResponse {
    pub message: String,
    pub table_name: String,
    pub ingested_rows: usize,
    pub columns: Vec<String>,
    pub preview: Value,
}

#[derive(Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

// --- Route Handlers ---

pub async fn root() -> &'static str {
    "tabletalk server is running."
}

pub async fn health_check() -> &'static str {
    "OK"
}

/// Connects the server session to a MySQL database.
///
/// On success the response lists the tables the generated queries will see,
/// so the caller can confirm it reached the right schema.
pub async fn connect_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<ConnectionParams>,
) -> Result<Json<ConnectResponse>, AppError> {
    let mut session = app_state.session.lock().await;
    session.connect_database(&payload).await?;

    let tables = match session.source() {
        Some(DataSource::Database(backend)) => backend.list_tables().await?,
        _ => Vec::new(),
    };
    info!("Connected to database with {} tables", tables.len());

    Ok(Json(ConnectResponse {
        message: "Connected successfully.".to_string(),
        tables,
    }))
}

/// Stages an uploaded CSV as the session's data source.
///
/// The response echoes the sanitized table name plus a small preview of the
/// staged rows, typed as they will be queried.
pub async fn ingest_csv_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<IngestCsvRequest>,
) -> Result<Json<IngestCsvResponse>, AppError> {
    let mut session = app_state.session.lock().await;
    let ingested_rows = session.attach_csv(&payload.table_name, &payload.csv).await?;

    let (table_name, columns, preview) = match session.source() {
        Some(DataSource::Tabular(source)) => {
            let preview = source
                .backend
                .run(&format!(
                    "SELECT * FROM \"{}\" LIMIT 5",
                    source.table_name
                ))
                .await?;
            (
                source.table_name.clone(),
                preview.columns.clone(),
                preview.to_json(),
            )
        }
        _ => (String::new(), Vec::new(), Value::Array(Vec::new())),
    };
    info!("Ingested {ingested_rows} rows into table '{table_name}'");

    Ok(Json(IngestCsvResponse {
        message: format!("Ingested {ingested_rows} rows."),
        table_name,
        ingested_rows,
        columns,
        preview,
    }))
}

/// Runs one conversational turn against the connected source.
pub async fn ask_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    if payload.question.trim().is_empty() {
        return Err(AppError::BadRequest("Please enter a question.".to_string()));
    }
    info!("Received question: '{}'", payload.question);

    let mut session = app_state.session.lock().await;
    let answer = app_state.client.ask(&mut session, &payload.question).await?;

    Ok(Json(AskResponse { answer }))
}

/// Returns the session transcript, oldest turn first.
pub async fn history_handler(State(app_state): State<AppState>) -> Json<Vec<Turn>> {
    let session = app_state.session.lock().await;
    Json(session.history().turns().to_vec())
}
