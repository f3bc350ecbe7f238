#![allow(dead_code)]
//! # Common Test Utilities
//!
//! This module provides shared utilities for testing, such as mock AI
//! providers and a seeded in-memory database, to ensure tests are isolated
//! and repeatable.

use async_trait::async_trait;
use dotenvy::dotenv;
use std::fmt::Debug;
use std::sync::{Arc, Once, RwLock};
use tabletalk::providers::ai::AiProvider;
use tabletalk::providers::db::sqlite::SqliteBackend;
use tabletalk::{ChatClient, ChatClientBuilder, ChatError};

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        tracing_subscriber::fmt::init();
    });
}

// --- Mock AI Provider for Logic Testing ---

/// An AI provider that replays scripted responses and records every prompt
/// it was sent.
#[derive(Clone, Debug)]
pub struct MockAiProvider {
    pub call_history: Arc<RwLock<Vec<(String, String)>>>,
    pub responses: Arc<RwLock<Vec<String>>>,
}

impl MockAiProvider {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            call_history: Arc::new(RwLock::new(Vec::new())),
            responses: Arc::new(RwLock::new(
                responses.into_iter().rev().map(String::from).collect(),
            )),
        }
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ChatError> {
        self.call_history
            .write()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));

        if let Some(response) = self.responses.write().unwrap().pop() {
            Ok(response)
        } else {
            Ok("Default mock response".to_string())
        }
    }
}

/// An AI provider that always fails, for exercising error paths.
#[derive(Clone, Debug)]
pub struct FailingAiProvider;

#[async_trait]
impl AiProvider for FailingAiProvider {
    async fn generate(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> Result<String, ChatError> {
        Err(ChatError::AiApi("the model is on fire".to_string()))
    }
}

/// Builds a `ChatClient` around the given provider.
pub fn client_with_provider(provider: Box<dyn AiProvider>) -> ChatClient {
    ChatClientBuilder::new()
        .ai_provider(provider)
        .build()
        .expect("Failed to build ChatClient")
}

/// Creates an in-memory SQLite backend seeded with a tiny music catalog.
pub async fn seeded_backend() -> SqliteBackend {
    let backend = SqliteBackend::new(":memory:")
        .await
        .expect("Failed to create SqliteBackend");
    backend
        .execute_batch(
            "CREATE TABLE artists (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
             INSERT INTO artists (id, name) VALUES (1, 'Alice Cooper');
             INSERT INTO artists (id, name) VALUES (2, 'Bob Dylan');",
        )
        .await
        .expect("Failed to seed database");
    backend
}
