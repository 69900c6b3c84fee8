//! Gemini client configuration.

use crate::error::{GeminiError, GeminiResult};

/// Default Gemini API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model fallback chain, tried in order.
fn default_models() -> Vec<String> {
    vec![
        "gemini-2.5-flash".to_string(),
        "gemini-2.5-flash-lite".to_string(),
        "gemini-2.5-pro".to_string(),
    ]
}

/// Configuration for the Gemini client.
///
/// Injected at construction time so tests can point the client at a stub
/// server and fix the model list.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key
    pub api_key: String,
    /// API base URL
    pub base_url: String,
    /// Candidate model identifiers, tried in order on failure
    pub models: Vec<String>,
    /// Generation temperature (kept low to reduce response variance)
    pub temperature: f32,
    /// Language the model is instructed to reply in
    pub reply_language: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            models: default_models(),
            temperature: 0.1,
            reply_language: "Spanish".to_string(),
        }
    }
}

impl GeminiConfig {
    /// Create config from environment variables.
    ///
    /// `GEMINI_API_KEY` is required; `GEMINI_BASE_URL`, `GEMINI_MODELS`
    /// (comma-separated) and `GEMINI_REPLY_LANGUAGE` override the defaults.
    pub fn from_env() -> GeminiResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GeminiError::config_error("GEMINI_API_KEY not set"))?;

        let models = std::env::var("GEMINI_MODELS")
            .map(|s| {
                s.split(',')
                    .map(|m| m.trim().to_string())
                    .filter(|m| !m.is_empty())
                    .collect::<Vec<_>>()
            })
            .ok()
            .filter(|m: &Vec<String>| !m.is_empty())
            .unwrap_or_else(default_models);

        Ok(Self {
            api_key,
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            models,
            temperature: 0.1,
            reply_language: std::env::var("GEMINI_REPLY_LANGUAGE")
                .unwrap_or_else(|_| "Spanish".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = GeminiConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.models.len(), 3);
        assert_eq!(config.models[0], "gemini-2.5-flash");
        assert!(config.temperature <= 0.2);
    }
}
