//! # Common Test Utilities
//!
//! This module centralizes the test harness used across the
//! `tabletalk-server` integration tests:
//!
//! - `TestApp`: a full application harness that spawns a real server on a
//!   random port, configured with a mock AI endpoint. This is ideal for E2E
//!   tests of API endpoints.
//! - Helpers for mounting chat-completion mocks for the two chain stages.

// Allow unused code because this is a test utility module, and not all
// functions might be used by every test file that includes it.
#![allow(unused)]

use anyhow::Result;
use reqwest::Client;
use std::net::SocketAddr;
use tabletalk_server::{
    config::Config,
    router,
    state::{build_app_state, AppState},
};
use tokio::{net::TcpListener, task::JoinHandle};
use wiremock::{
    matchers::{body_string_contains, method, path},
    Mock, MockServer, ResponseTemplate,
};

// --- Full Application Test Harness ---

/// A harness for end-to-end testing of the Axum server.
///
/// This struct spawns the server on a random available port and configures
/// the `AppState` to use a local-style AI provider pointed at a
/// `wiremock::MockServer` instance.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub app_state: AppState,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the application server against a fresh mock AI endpoint.
    pub async fn spawn() -> Result<Self> {
        let mock_server = MockServer::start().await;

        let config = Config {
            port: 0,
            ai_provider: "local".to_string(),
            ai_api_url: format!("{}/v1/chat/completions", mock_server.uri()),
            ai_api_key: None,
            ai_model: Some("mock-chat-model".to_string()),
            ai_temperature: 0.0,
        };

        let app_state = build_app_state(&config)?;
        TestApp::spawn_with_state(app_state, mock_server).await
    }

    pub async fn spawn_with_state(app_state: AppState, mock_server: MockServer) -> Result<Self> {
        dotenvy::dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let app_state_for_harness = app_state.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            app_state: app_state_for_harness,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

// --- Mock Data Helpers ---

/// The OpenAI-compatible body shape returned by the mock chat endpoint.
pub fn chat_completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
}

/// Mounts a mock answering the query generation stage with `sql`.
pub async fn mock_generation_stage(mock_server: &MockServer, sql: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body(sql)))
        .mount(mock_server)
        .await;
}

/// Mounts a mock answering the synthesis stage with `answer`.
///
/// Synthesis prompts carry the executed rows under a `SQL Response:` heading
/// that the generation prompt never contains, so matching on that marker
/// separates the two stages. Mount this before the generation mock: when
/// several mocks match a request, the one mounted first wins.
pub async fn mock_synthesis_stage(mock_server: &MockServer, answer: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("SQL Response:"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body(answer)))
        .mount(mock_server)
        .await;
}
