pub mod gemini;
pub mod local;

use crate::errors::ChatError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with an AI provider.
///
/// This trait defines a common interface for generating completions from
/// different Large Language Models (e.g., Gemini, local OpenAI-compatible
/// servers). The provider is a black box to the rest of the library: it
/// receives exact prompt strings and returns the completion text verbatim.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a response from a given system and user prompt.
    ///
    /// The result is the raw completion text, unmodified.
    async fn generate(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, ChatError>;
}

dyn_clone::clone_trait_object!(AiProvider);
