//! # Application Configuration
//!
//! This module loads the server configuration from environment variables
//! (optionally via a `.env` file). The model API key is the one required
//! secret: with the default Gemini provider the server refuses to start
//! without it, reporting the missing variable once and exiting.

use std::env;
use std::fmt;

/// The model used to derive the Gemini endpoint when `AI_API_URL` is unset.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";

/// The default sampling temperature for the chat model.
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// A required environment variable is absent.
    MissingVariable(String),
    /// A present variable could not be parsed.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingVariable(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::Invalid(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// The server configuration, resolved once at startup.
#[derive(Clone)]
pub struct Config {
    /// The port for the server to listen on.
    pub port: u16,
    /// The AI provider type: "gemini" or "local".
    pub ai_provider: String,
    /// The completion endpoint.
    pub ai_api_url: String,
    /// The API key, required for Gemini and optional for local providers.
    pub ai_api_key: Option<String>,
    /// The model name passed to OpenAI-compatible providers.
    pub ai_model: Option<String>,
    /// The sampling temperature for both chain stages.
    pub ai_temperature: f32,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("ai_provider", &self.ai_provider)
            .field("ai_api_url", &self.ai_api_url)
            .field("ai_api_key", &self.ai_api_key.as_ref().map(|_| "***"))
            .field("ai_model", &self.ai_model)
            .field("ai_temperature", &self.ai_temperature)
            .finish()
    }
}

/// Loads the configuration from the environment.
pub fn get_config() -> Result<Config, ConfigError> {
    let ai_provider = env::var("AI_PROVIDER").unwrap_or_else(|_| "gemini".to_string());
    let ai_model = env::var("AI_MODEL").ok().filter(|m| !m.is_empty());

    let ai_api_key = match ai_provider.as_str() {
        "gemini" => {
            let key = env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());
            if key.is_none() {
                return Err(ConfigError::MissingVariable(
                    "GEMINI_API_KEY is not set. Add it to the environment or a .env file."
                        .to_string(),
                ));
            }
            key
        }
        _ => env::var("AI_API_KEY").ok().filter(|k| !k.is_empty()),
    };

    let ai_api_url = match env::var("AI_API_URL").ok().filter(|u| !u.is_empty()) {
        Some(url) => url,
        None if ai_provider == "gemini" => {
            let model = ai_model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL);
            format!("https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent")
        }
        None => {
            return Err(ConfigError::MissingVariable(
                "AI_API_URL is required for the local provider.".to_string(),
            ));
        }
    };

    let port = match env::var("PORT") {
        Ok(value) => value
            .parse::<u16>()
            .map_err(|_| ConfigError::Invalid(format!("PORT '{value}' is not a valid port")))?,
        Err(_) => 9090,
    };

    let ai_temperature = match env::var("AI_TEMPERATURE") {
        Ok(value) => value.parse::<f32>().map_err(|_| {
            ConfigError::Invalid(format!("AI_TEMPERATURE '{value}' is not a number"))
        })?,
        Err(_) => DEFAULT_TEMPERATURE,
    };

    Ok(Config {
        port,
        ai_provider,
        ai_api_url,
        ai_api_key,
        ai_model,
        ai_temperature,
    })
}
