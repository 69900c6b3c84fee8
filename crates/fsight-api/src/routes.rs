//! API routes.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::analyses::{
    create_analysis, delete_analysis, get_analysis, get_analysis_status, list_analyses,
};
use crate::handlers::playback::{get_annotations, get_playback_url};
use crate::handlers::{health, ready};
use crate::middleware::{cors_layer, request_id, request_logging};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let analysis_routes = Router::new()
        // Submit a video for analysis
        .route("/analyses", post(create_analysis).get(list_analyses))
        // Single analysis operations
        .route(
            "/analyses/:analysis_id",
            get(get_analysis).delete(delete_analysis),
        )
        // Poll analysis status
        .route("/analyses/:analysis_id/status", get(get_analysis_status))
        // Derived annotations for playback overlays
        .route("/analyses/:analysis_id/annotations", get(get_annotations))
        // Playback URL (short-lived presigned URL for the video player)
        .route("/analyses/:analysis_id/play-url", post(get_playback_url));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    Router::new()
        .nest("/api", analysis_routes)
        .merge(health_routes)
        // Videos arrive base64-encoded in the request body
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
