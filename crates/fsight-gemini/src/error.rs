//! Gemini client error types.

use thiserror::Error;

pub type GeminiResult<T> = Result<T, GeminiError>;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Gemini API request failed: {0}")]
    RequestFailed(String),

    #[error("No content in Gemini response")]
    MissingContent,

    #[error("All Gemini models failed: {0}")]
    AllModelsFailed(String),
}

impl GeminiError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    /// Whether the whole model fallback chain was exhausted.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, GeminiError::AllModelsFailed(_))
    }
}
