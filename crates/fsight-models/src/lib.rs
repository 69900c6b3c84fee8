//! Shared data models for FormSight backend.
//!
//! This crate provides Serde-serializable types for:
//! - Analysis requests, characteristic results, and stored analysis records
//! - Time-coded video annotations with positive/improvement classification
//! - Playback-window computation for overlay rendering
//! - Timestamp parsing for AI-provided time strings

pub mod analysis;
pub mod annotation;
pub mod timestamp;

// Re-export common types
pub use analysis::{
    AnalysisId, AnalysisRecord, AnalysisResult, AnalysisStatus, CharacteristicResult,
    CharacteristicSet, CharacteristicSetError, MovementContext, CHARACTERISTIC_COUNT,
};
pub use annotation::{
    active_annotations, annotations_from_result, timeline_marker_position, ActiveAnnotation,
    AnnotationKind, VideoAnnotation, DEFAULT_ACTIVE_TOLERANCE_SECS,
};
pub use timestamp::{format_seconds, parse_time_to_seconds};
