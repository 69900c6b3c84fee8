//! Playback handlers.
//!
//! The client plays the stored video through a short-lived presigned URL and
//! overlays the derived annotations; the active-subset and timeline-marker
//! computations are also exposed here for thin clients.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use fsight_models::{
    active_annotations, annotations_from_result, timeline_marker_position, ActiveAnnotation,
    AnnotationKind, VideoAnnotation, DEFAULT_ACTIVE_TOLERANCE_SECS,
};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

use super::analyses::owned_record;

// ============================================================================
// Playback URL
// ============================================================================

/// Response for playback URL requests.
#[derive(Debug, Serialize)]
pub struct PlaybackUrlResponse {
    /// The presigned URL.
    pub url: String,
    /// When this URL expires (ISO 8601).
    pub expires_at: String,
    /// Expiry in seconds from now.
    pub expires_in_secs: u64,
    /// Content type.
    pub content_type: String,
}

/// Generate a short-lived playback URL for an analysis video.
///
/// POST /api/analyses/{analysis_id}/play-url
pub async fn get_playback_url(
    State(state): State<AppState>,
    Path(analysis_id): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<PlaybackUrlResponse>> {
    let record = owned_record(&state, &user, &analysis_id).await?;

    let playback = state
        .storage
        .playback_url(&record.video_key, state.config.playback_url_ttl)
        .await
        .map_err(|e| {
            warn!(analysis_id = %analysis_id, error = %e, "Failed to generate playback URL");
            ApiError::from(e)
        })?;

    info!(analysis_id = %analysis_id, user_id = %user.uid, "Generated playback URL");

    Ok(Json(PlaybackUrlResponse {
        url: playback.url,
        expires_at: playback.expires_at,
        expires_in_secs: playback.expires_in_secs,
        content_type: record.mime_type,
    }))
}

// ============================================================================
// Annotations
// ============================================================================

/// Query parameters for the annotations endpoint.
#[derive(Debug, Deserialize)]
pub struct AnnotationsQuery {
    /// Playback instant in seconds; when present, the active subset is
    /// included in the response
    pub at: Option<f64>,
    /// Active-window tolerance override in seconds
    pub tolerance: Option<f64>,
    /// Total video duration in seconds; when present, timeline markers are
    /// included in the response
    pub duration: Option<f64>,
}

/// Timeline marker for one annotation.
#[derive(Debug, Serialize)]
pub struct TimelineMarker {
    pub name: String,
    pub kind: AnnotationKind,
    /// Position along the timeline, 0-100
    pub position_pct: f64,
}

/// Annotations response.
#[derive(Debug, Serialize)]
pub struct AnnotationsResponse {
    /// Full annotation list, ordered by time
    pub annotations: Vec<VideoAnnotation>,

    /// Annotations active at the `at` instant (when requested)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<Vec<ActiveAnnotation>>,

    /// Timeline markers (when a duration was provided)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markers: Option<Vec<TimelineMarker>>,
}

/// Derived annotations for an analysis.
///
/// GET /api/analyses/{analysis_id}/annotations
pub async fn get_annotations(
    State(state): State<AppState>,
    Path(analysis_id): Path<String>,
    Query(query): Query<AnnotationsQuery>,
    user: AuthUser,
) -> ApiResult<Json<AnnotationsResponse>> {
    let record = owned_record(&state, &user, &analysis_id).await?;

    let result = record
        .result
        .as_ref()
        .ok_or_else(|| ApiError::conflict("Analysis has no result yet"))?;

    let annotations = annotations_from_result(result);

    let active = query.at.map(|at| {
        let tolerance = query.tolerance.unwrap_or(DEFAULT_ACTIVE_TOLERANCE_SECS);
        active_annotations(&annotations, at, tolerance)
    });

    let markers = query.duration.map(|duration| {
        annotations
            .iter()
            .map(|a| TimelineMarker {
                name: a.name.clone(),
                kind: a.kind,
                position_pct: timeline_marker_position(a, duration),
            })
            .collect()
    });

    Ok(Json(AnnotationsResponse {
        annotations,
        active,
        markers,
    }))
}
