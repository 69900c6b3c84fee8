//! Analysis models.
//!
//! An analysis evaluates one recorded athletic movement against exactly five
//! named technical characteristics. The AI model scores each characteristic,
//! anchors it to a moment in the video, and writes long-form feedback plus a
//! short summary suitable for playback overlays.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Number of characteristics evaluated per analysis.
///
/// The prompt format and the response JSON schema are built around this
/// cardinality; it is enforced at the type level by [`CharacteristicSet`].
pub const CHARACTERISTIC_COUNT: usize = 5;

/// Unique identifier for an analysis record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct AnalysisId(pub String);

impl AnalysisId {
    /// Generate a new random analysis ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AnalysisId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AnalysisId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AnalysisId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Analysis processing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    /// Video uploaded, AI analysis in flight
    #[default]
    Processing,
    /// Analysis completed and results stored
    Completed,
    /// Analysis failed (all AI models exhausted)
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Processing => "processing",
            AnalysisStatus::Completed => "completed",
            AnalysisStatus::Failed => "failed",
        }
    }

    /// Whether this status is terminal (no further transitions expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, AnalysisStatus::Completed | AnalysisStatus::Failed)
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error building a [`CharacteristicSet`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CharacteristicSetError {
    #[error("expected exactly {CHARACTERISTIC_COUNT} characteristics, got {0}")]
    WrongCount(usize),

    #[error("characteristic name at position {0} is empty")]
    EmptyName(usize),
}

/// The exactly-five characteristic names evaluated by one analysis.
///
/// Constructing one is the only way to feed names into the prompt builder
/// and the response parser, so the five-element invariant holds everywhere
/// downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct CharacteristicSet([String; CHARACTERISTIC_COUNT]);

impl CharacteristicSet {
    /// Create from exactly five names.
    pub fn new(names: [String; CHARACTERISTIC_COUNT]) -> Self {
        Self(names)
    }

    /// Characteristic names in evaluation order.
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Name at a given position.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

impl TryFrom<Vec<String>> for CharacteristicSet {
    type Error = CharacteristicSetError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        if let Some(pos) = names.iter().position(|n| n.trim().is_empty()) {
            return Err(CharacteristicSetError::EmptyName(pos));
        }
        let count = names.len();
        let array: [String; CHARACTERISTIC_COUNT] = names
            .try_into()
            .map_err(|_| CharacteristicSetError::WrongCount(count))?;
        Ok(Self(array))
    }
}

/// Context describing the movement being analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MovementContext {
    /// Movement type name (e.g. "Saque", "Golpe de derecha")
    pub movement_type: String,

    /// Athlete name
    pub athlete_name: String,

    /// Sport name
    pub sport: String,

    /// Playing position name
    pub position: String,
}

impl MovementContext {
    pub fn new(
        movement_type: impl Into<String>,
        athlete_name: impl Into<String>,
        sport: impl Into<String>,
        position: impl Into<String>,
    ) -> Self {
        Self {
            movement_type: movement_type.into(),
            athlete_name: athlete_name.into(),
            sport: sport.into(),
            position: position.into(),
        }
    }
}

/// One evaluated characteristic from an AI analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CharacteristicResult {
    /// Characteristic name (one of the five requested)
    pub name: String,

    /// When the characteristic is best observed, as returned by the model.
    /// Format varies: "M:SS", plain seconds, or occasionally malformed.
    pub time: String,

    /// Score, nominally 0-10 (not clamped)
    pub score: f64,

    /// Long-form feedback text
    pub feedback: String,

    /// Short summary for playback overlays
    pub summary: String,
}

/// Aggregate result of one analysis.
///
/// `overall_score` is reported by the model (or computed by the synthetic
/// fallback) and is treated as an opaque display value; it is not verified
/// against the component scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    /// Evaluated characteristics, in request order
    pub characteristics: Vec<CharacteristicResult>,

    /// Aggregate score as reported by the model
    pub overall_score: f64,

    /// Free-text conclusion
    pub conclusion: String,
}

/// A stored video analysis.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisRecord {
    /// Unique analysis ID
    pub id: AnalysisId,

    /// User ID (owner)
    pub user_id: String,

    /// Display title
    pub title: String,

    /// Movement and athlete context
    pub context: MovementContext,

    /// The five characteristics this analysis evaluates
    pub characteristics: CharacteristicSet,

    /// Storage key of the uploaded video
    pub video_key: String,

    /// MIME type of the uploaded video
    pub mime_type: String,

    /// Analysis result (present once status is completed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResult>,

    /// AI model that produced the result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Processing status
    #[serde(default)]
    pub status: AnalysisStatus,

    /// Error message when status is failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl AnalysisRecord {
    /// Create a new record in processing state.
    ///
    /// The ID is passed in rather than generated because the video storage
    /// key is derived from it before the record exists.
    pub fn new(
        id: AnalysisId,
        user_id: impl Into<String>,
        title: impl Into<String>,
        context: MovementContext,
        characteristics: CharacteristicSet,
        video_key: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id: user_id.into(),
            title: title.into(),
            context,
            characteristics,
            video_key: video_key.into(),
            mime_type: mime_type.into(),
            result: None,
            model: None,
            status: AnalysisStatus::Processing,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach a completed result.
    pub fn with_result(mut self, result: AnalysisResult, model: impl Into<String>) -> Self {
        self.result = Some(result);
        self.model = Some(model.into());
        self.status = AnalysisStatus::Completed;
        self.error_message = None;
        self.updated_at = Utc::now();
        self
    }

    /// Mark the record as failed.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.status = AnalysisStatus::Failed;
        self.error_message = Some(message.into());
        self.updated_at = Utc::now();
        self
    }
}
