//! # End-to-End Chat Flow Tests
//!
//! This suite spawns the real server against a mock AI endpoint and walks
//! the HTTP surface: health, CSV ingestion, asking questions, the transcript
//! endpoint, and the error responses for bad requests.

mod common;

use crate::common::{mock_generation_stage, mock_synthesis_stage, TestApp};
use serde_json::{json, Value};
use tabletalk::providers::db::sqlite::SqliteBackend;

#[tokio::test]
async fn test_health_and_root() {
    let app = TestApp::spawn().await.expect("Failed to spawn app");

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to reach /health");
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");

    let response = app
        .client
        .get(format!("{}/", app.address))
        .send()
        .await
        .expect("Failed to reach /");
    assert_eq!(
        response.text().await.unwrap(),
        "tabletalk server is running."
    );
}

#[tokio::test]
async fn test_ask_without_source_is_rejected() {
    let app = TestApp::spawn().await.expect("Failed to spawn app");

    let response = app
        .client
        .post(format!("{}/ask", app.address))
        .json(&json!({"question": "How many artists are there?"}))
        .send()
        .await
        .expect("Failed to reach /ask");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Response was not JSON");
    assert_eq!(
        body["error"],
        "No data source is connected. Connect a database or upload a dataset first."
    );
}

#[tokio::test]
async fn test_blank_question_is_rejected() {
    let app = TestApp::spawn().await.expect("Failed to spawn app");

    let response = app
        .client
        .post(format!("{}/ask", app.address))
        .json(&json!({"question": "   "}))
        .send()
        .await
        .expect("Failed to reach /ask");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Response was not JSON");
    assert_eq!(body["error"], "Please enter a question.");
}

#[tokio::test]
async fn test_connect_with_incomplete_params_is_rejected() {
    let app = TestApp::spawn().await.expect("Failed to spawn app");

    // An empty host fails validation before any network I/O happens.
    let response = app
        .client
        .post(format!("{}/connect", app.address))
        .json(&json!({
            "host": "",
            "port": "3306",
            "user": "root",
            "password": "secret",
            "database": "chinook"
        }))
        .send()
        .await
        .expect("Failed to reach /connect");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Response was not JSON");
    let message = body["error"].as_str().expect("error was not a string");
    assert!(
        message.contains("host"),
        "error should name the missing field: {message}"
    );
}

#[tokio::test]
async fn test_csv_ingest_ask_and_history_flow() {
    // --- Setup ---
    let app = TestApp::spawn().await.expect("Failed to spawn app");
    // The tabular path has no synthesis stage, so only the generation
    // response is needed.
    mock_generation_stage(&app.mock_server, "SELECT SUM(units) FROM \"sales_2024\";").await;

    // --- Ingest ---
    let csv = "product,units\nWidget,12\nGadget,3\nDoohickey,7\n";
    let response = app
        .client
        .post(format!("{}/ingest/csv", app.address))
        .json(&json!({"table_name": "Sales 2024", "csv": csv}))
        .send()
        .await
        .expect("Failed to reach /ingest/csv");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Response was not JSON");
    assert_eq!(body["table_name"], "sales_2024");
    assert_eq!(body["ingested_rows"], 3);
    assert_eq!(body["columns"], json!(["product", "units"]));
    assert_eq!(body["preview"][0]["product"], "Widget");
    assert_eq!(body["preview"][0]["units"], 12);

    // --- Ask ---
    let response = app
        .client
        .post(format!("{}/ask", app.address))
        .json(&json!({"question": "How many units were sold in total?"}))
        .send()
        .await
        .expect("Failed to reach /ask");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Response was not JSON");
    assert_eq!(body["answer"], "Based on the data, the answer is: 22");

    // --- History ---
    let response = app
        .client
        .get(format!("{}/history", app.address))
        .send()
        .await
        .expect("Failed to reach /history");
    assert_eq!(response.status(), 200);

    let turns: Value = response.json().await.expect("Response was not JSON");
    let turns = turns.as_array().expect("History was not an array");
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0]["role"], "user");
    assert_eq!(turns[0]["content"], "How many units were sold in total?");
    assert_eq!(turns[1]["role"], "assistant");
    assert_eq!(turns[1]["content"], "Based on the data, the answer is: 22");
}

#[tokio::test]
async fn test_database_chain_over_http() {
    // --- Setup ---
    let app = TestApp::spawn().await.expect("Failed to spawn app");
    // Synthesis first: when several mocks match, the earliest mount wins,
    // and only synthesis prompts carry the "SQL Response:" heading.
    mock_synthesis_stage(&app.mock_server, "There are 2 artists in the database.").await;
    mock_generation_stage(&app.mock_server, "SELECT COUNT(*) FROM artists;").await;

    // The harness shares the session with the running server, so a seeded
    // SQLite backend can stand in for a MySQL connection.
    let backend = SqliteBackend::new(":memory:")
        .await
        .expect("Failed to open database");
    backend
        .execute_batch(
            "CREATE TABLE artists (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
             INSERT INTO artists (id, name) VALUES (1, 'Alice Cooper');
             INSERT INTO artists (id, name) VALUES (2, 'Bob Dylan');",
        )
        .await
        .expect("Failed to seed database");
    app.app_state
        .session
        .lock()
        .await
        .attach_backend(Box::new(backend));

    // --- Ask ---
    let response = app
        .client
        .post(format!("{}/ask", app.address))
        .json(&json!({"question": "How many artists are there?"}))
        .send()
        .await
        .expect("Failed to reach /ask");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Response was not JSON");
    assert_eq!(body["answer"], "There are 2 artists in the database.");

    // --- History ---
    let response = app
        .client
        .get(format!("{}/history", app.address))
        .send()
        .await
        .expect("Failed to reach /history");
    let turns: Value = response.json().await.expect("Response was not JSON");
    assert_eq!(turns.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_failed_query_returns_bad_request() {
    // --- Setup ---
    // The "model" answers with prose instead of SQL, which the database
    // rejects at execution time.
    let app = TestApp::spawn().await.expect("Failed to spawn app");
    mock_generation_stage(&app.mock_server, "Certainly! Here is your query.").await;

    let backend = SqliteBackend::new(":memory:")
        .await
        .expect("Failed to open database");
    app.app_state
        .session
        .lock()
        .await
        .attach_backend(Box::new(backend));

    // --- Ask ---
    let response = app
        .client
        .post(format!("{}/ask", app.address))
        .json(&json!({"question": "How many artists are there?"}))
        .send()
        .await
        .expect("Failed to reach /ask");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Response was not JSON");
    let message = body["error"].as_str().expect("error was not a string");
    assert!(
        message.starts_with("Query execution failed:"),
        "unexpected error: {message}"
    );

    // A failed turn leaves no trace in the transcript.
    let response = app
        .client
        .get(format!("{}/history", app.address))
        .send()
        .await
        .expect("Failed to reach /history");
    let turns: Value = response.json().await.expect("Response was not JSON");
    assert_eq!(turns.as_array().map(Vec::len), Some(0));
}
