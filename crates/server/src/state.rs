//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The `AppState` holds the instantiated chat
//! client and the single server-wide conversation session, making them
//! accessible to all request handlers.

use crate::config::Config;
use std::sync::Arc;
use tabletalk::{
    providers::ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider},
    ChatClient, ChatClientBuilder, ChatSession,
};
use tokio::sync::Mutex;

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The chat client, holding the AI provider and the tabular agent.
    pub client: Arc<ChatClient>,
    /// The server-wide conversation session.
    ///
    /// Handlers lock it for the duration of a request, so turns are
    /// serialized and the history stays coherent.
    pub session: Arc<Mutex<ChatSession>>,
}

/// Builds the shared application state from the configuration.
///
/// This instantiates the AI provider client named by the configuration and
/// wires it into a `ChatClient`. The session starts disconnected; callers
/// attach a data source through the `/connect` or `/ingest/csv` endpoints.
pub fn build_app_state(config: &Config) -> anyhow::Result<AppState> {
    let ai_provider: Box<dyn AiProvider> = match config.ai_provider.as_str() {
        "gemini" => {
            let api_key = config
                .ai_api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("an API key is required for the gemini provider"))?;
            Box::new(
                GeminiProvider::new(config.ai_api_url.clone(), api_key)?
                    .with_temperature(config.ai_temperature),
            )
        }
        "local" => Box::new(
            LocalAiProvider::new(
                config.ai_api_url.clone(),
                config.ai_api_key.clone(),
                config.ai_model.clone(),
            )?
            .with_temperature(config.ai_temperature),
        ),
        other => {
            return Err(anyhow::anyhow!("Unsupported AI provider type '{other}'"));
        }
    };

    let client = ChatClientBuilder::new().ai_provider(ai_provider).build()?;

    Ok(AppState {
        client: Arc::new(client),
        session: Arc::new(Mutex::new(ChatSession::new())),
    })
}
