//! Axum HTTP API for FormSight.
//!
//! Exposes the analysis pipeline (submit, poll, fetch, annotate, play back)
//! behind a JSON API. Authentication and durable persistence are platform
//! collaborators: identity arrives as a proxy-verified header, and analysis
//! records go through the [`store::AnalysisStore`] trait.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
pub use store::{AnalysisStore, MemoryAnalysisStore, StoreError};
