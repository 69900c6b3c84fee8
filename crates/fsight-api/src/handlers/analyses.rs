//! Analysis workflow handlers.
//!
//! Submission runs the whole pipeline inline: upload the video, invoke
//! Gemini (with its model fallback chain), parse the response (with the
//! synthetic fallback), persist the record. The status endpoint exists for
//! clients that navigate away and poll for completion.

use axum::extract::{Path, State};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use fsight_gemini::{build_analysis_prompt, parse_or_fallback};
use fsight_models::{
    AnalysisId, AnalysisRecord, AnalysisStatus, CharacteristicSet, MovementContext,
};
use fsight_storage::video_key;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// Submit Analysis
// ============================================================================

/// Request to analyze one performance video.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAnalysisRequest {
    /// Display title for the analysis
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Movement type name
    #[validate(length(min = 1, max = 100))]
    pub movement_type: String,

    /// The five technical characteristics to evaluate
    #[validate(length(equal = 5))]
    pub characteristics: Vec<String>,

    /// Athlete name
    #[validate(length(min = 1, max = 100))]
    pub athlete_name: String,

    /// Sport name
    #[validate(length(min = 1, max = 100))]
    pub sport: String,

    /// Playing position name
    #[validate(length(min = 1, max = 100))]
    pub position: String,

    /// Base64-encoded video bytes
    #[validate(length(min = 1))]
    pub video_base64: String,

    /// Video MIME type
    #[validate(length(min = 1))]
    pub mime_type: String,
}

/// Submit a video for analysis.
///
/// The pipeline runs inline; the response carries the completed record,
/// including the parsed (or synthetic-fallback) result.
pub async fn create_analysis(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateAnalysisRequest>,
) -> ApiResult<Json<AnalysisRecord>> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let characteristics = CharacteristicSet::try_from(request.characteristics)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let video_bytes = BASE64
        .decode(&request.video_base64)
        .map_err(|_| ApiError::bad_request("video_base64 is not valid base64"))?;

    let analysis_id = AnalysisId::new();
    let key = video_key(&user.uid, &analysis_id, &request.mime_type)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let context = MovementContext::new(
        request.movement_type,
        request.athlete_name,
        request.sport,
        request.position,
    );

    let record = AnalysisRecord::new(
        analysis_id,
        &user.uid,
        request.title,
        context,
        characteristics,
        &key,
        &request.mime_type,
    );

    // Upload first: a storage failure aborts before any AI usage
    state
        .storage
        .upload_video(&key, video_bytes, &request.mime_type)
        .await?;

    let prompt = build_analysis_prompt(
        &record.context,
        &record.characteristics,
        &state.gemini.config().reply_language,
    );

    let record = match state
        .gemini
        .analyze_video(&prompt, &request.video_base64, &request.mime_type)
        .await
    {
        Ok(analysis) => {
            let result = parse_or_fallback(&analysis.raw_text, &record.characteristics);
            record.with_result(result, analysis.model)
        }
        Err(e) => {
            warn!(analysis_id = %record.id, "Gemini analysis failed: {}", e);
            let failed = record.with_failure(e.to_string());
            state.store.create(failed).await?;
            return Err(e.into());
        }
    };

    state.store.create(record.clone()).await?;

    info!(
        analysis_id = %record.id,
        user_id = %user.uid,
        model = record.model.as_deref().unwrap_or("-"),
        "Analysis completed"
    );

    Ok(Json(record))
}

// ============================================================================
// Fetch / List / Status
// ============================================================================

/// Fetch one analysis, enforcing ownership.
pub(crate) async fn owned_record(
    state: &AppState,
    user: &AuthUser,
    analysis_id: &str,
) -> ApiResult<AnalysisRecord> {
    let record = state
        .store
        .get(&AnalysisId::from_string(analysis_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Analysis not found"))?;

    if record.user_id != user.uid {
        return Err(ApiError::forbidden("You don't own this analysis"));
    }

    Ok(record)
}

/// Get a single analysis record.
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(analysis_id): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<AnalysisRecord>> {
    let record = owned_record(&state, &user, &analysis_id).await?;
    Ok(Json(record))
}

/// Summary of an analysis for listing.
#[derive(Serialize)]
pub struct AnalysisSummary {
    pub id: String,
    pub title: String,
    pub movement_type: String,
    pub athlete_name: String,
    pub status: AnalysisStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f64>,
    pub created_at: String,
}

/// Response for listing analyses.
#[derive(Serialize)]
pub struct ListAnalysesResponse {
    pub analyses: Vec<AnalysisSummary>,
}

/// List the caller's analyses, newest first.
pub async fn list_analyses(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ListAnalysesResponse>> {
    let records = state.store.list_for_user(&user.uid).await?;

    let analyses = records
        .into_iter()
        .map(|r| AnalysisSummary {
            id: r.id.to_string(),
            title: r.title,
            movement_type: r.context.movement_type,
            athlete_name: r.context.athlete_name,
            status: r.status,
            overall_score: r.result.as_ref().map(|res| res.overall_score),
            created_at: r.created_at.to_rfc3339(),
        })
        .collect();

    Ok(Json(ListAnalysesResponse { analyses }))
}

/// Status poll response.
#[derive(Serialize)]
pub struct AnalysisStatusResponse {
    pub id: String,
    pub status: AnalysisStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Poll the status of an analysis.
pub async fn get_analysis_status(
    State(state): State<AppState>,
    Path(analysis_id): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<AnalysisStatusResponse>> {
    let record = owned_record(&state, &user, &analysis_id).await?;

    Ok(Json(AnalysisStatusResponse {
        id: record.id.to_string(),
        status: record.status,
        model: record.model,
        error_message: record.error_message,
    }))
}

// ============================================================================
// Delete
// ============================================================================

/// Delete an analysis and its stored video.
pub async fn delete_analysis(
    State(state): State<AppState>,
    Path(analysis_id): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<serde_json::Value>> {
    let record = owned_record(&state, &user, &analysis_id).await?;

    state.storage.delete_video(&record.video_key).await?;
    state.store.delete(&record.id).await?;

    info!(analysis_id = %record.id, user_id = %user.uid, "Analysis deleted");

    Ok(Json(serde_json::json!({ "deleted": record.id.to_string() })))
}
