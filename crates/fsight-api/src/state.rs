//! Application state.

use std::sync::Arc;

use fsight_gemini::GeminiClient;
use fsight_storage::R2Client;

use crate::config::ApiConfig;
use crate::store::{AnalysisStore, MemoryAnalysisStore};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub storage: Arc<R2Client>,
    pub gemini: Arc<GeminiClient>,
    pub store: Arc<dyn AnalysisStore>,
}

impl AppState {
    /// Create application state with explicit collaborators.
    pub fn new(
        config: ApiConfig,
        storage: Arc<R2Client>,
        gemini: Arc<GeminiClient>,
        store: Arc<dyn AnalysisStore>,
    ) -> Self {
        Self {
            config,
            storage,
            gemini,
            store,
        }
    }

    /// Create application state from environment variables.
    pub fn from_env(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let storage = R2Client::from_env()?;
        let gemini = GeminiClient::from_env()?;

        Ok(Self::new(
            config,
            Arc::new(storage),
            Arc::new(gemini),
            MemoryAnalysisStore::shared(),
        ))
    }
}
