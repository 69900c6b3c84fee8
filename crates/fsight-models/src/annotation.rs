//! Time-coded video annotations.
//!
//! Annotations are derived from an [`AnalysisResult`] at render time and are
//! never persisted on their own. Each of the five characteristics becomes one
//! annotation, classified as positive or improvement by its score rank within
//! the group: the top three scores are positive, the bottom two improvement.
//! The classification is relative, so an athlete always sees both strengths
//! and work items regardless of the absolute score distribution.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::analysis::AnalysisResult;
use crate::timestamp::parse_time_to_seconds;

/// How long an annotation stays active after its anchor time, in seconds.
pub const DEFAULT_ACTIVE_TOLERANCE_SECS: f64 = 0.8;

/// How many of the top-ranked characteristics are classified as positive.
const POSITIVE_RANK_COUNT: usize = 3;

/// Two-valued annotation classification.
///
/// Ordering matters: positive sorts before improvement when two annotations
/// share the same anchor time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Positive,
    Improvement,
}

impl AnnotationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationKind::Positive => "positive",
            AnnotationKind::Improvement => "improvement",
        }
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A time-anchored piece of feedback overlaid during video playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoAnnotation {
    /// Anchor time in seconds from the start of the video
    pub time_secs: f64,

    /// Characteristic name
    pub name: String,

    /// Overlay text (the characteristic's summary)
    pub text: String,

    /// Positive or improvement
    pub kind: AnnotationKind,

    /// Characteristic score
    pub score: f64,
}

/// An annotation currently active at a playback instant.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ActiveAnnotation {
    #[serde(flatten)]
    pub annotation: VideoAnnotation,

    /// Zero-based position within the active subset, for vertical stacking
    pub display_index: usize,
}

/// Classify scores by rank: top three positive, the rest improvement.
///
/// The sort is stable, so characteristics tied at the rank boundary keep
/// their source order and the first-listed one wins the higher rank.
fn classify_by_rank(scores: &[f64]) -> Vec<AnnotationKind> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(Ordering::Equal)
    });

    let mut kinds = vec![AnnotationKind::Improvement; scores.len()];
    for (rank, &idx) in order.iter().enumerate() {
        if rank < POSITIVE_RANK_COUNT {
            kinds[idx] = AnnotationKind::Positive;
        }
    }
    kinds
}

/// Derive the ordered annotation list from an analysis result.
///
/// Every characteristic produces exactly one annotation; nothing is dropped.
/// The list is sorted by anchor time ascending, with positive annotations
/// sorting before improvement ones at identical times.
pub fn annotations_from_result(result: &AnalysisResult) -> Vec<VideoAnnotation> {
    let scores: Vec<f64> = result.characteristics.iter().map(|c| c.score).collect();
    let kinds = classify_by_rank(&scores);

    let mut annotations: Vec<VideoAnnotation> = result
        .characteristics
        .iter()
        .zip(kinds)
        .map(|(c, kind)| VideoAnnotation {
            time_secs: parse_time_to_seconds(&c.time),
            name: c.name.clone(),
            text: c.summary.clone(),
            kind,
            score: c.score,
        })
        .collect();

    annotations.sort_by(|a, b| {
        a.time_secs
            .partial_cmp(&b.time_secs)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.kind.cmp(&b.kind))
    });

    annotations
}

/// Compute the annotations active at a playback instant.
///
/// An annotation is active while `time_secs <= t <= time_secs + tolerance`,
/// both ends inclusive. All simultaneously active annotations are returned,
/// tagged with their position in the active subset.
pub fn active_annotations(
    annotations: &[VideoAnnotation],
    current_time_secs: f64,
    tolerance_secs: f64,
) -> Vec<ActiveAnnotation> {
    annotations
        .iter()
        .filter(|a| {
            current_time_secs >= a.time_secs && current_time_secs <= a.time_secs + tolerance_secs
        })
        .cloned()
        .enumerate()
        .map(|(display_index, annotation)| ActiveAnnotation {
            annotation,
            display_index,
        })
        .collect()
}

/// Timeline marker position as a percentage of the total duration.
///
/// Returns 0.0 while the duration is unknown (zero, negative, or NaN —
/// video metadata not yet loaded).
pub fn timeline_marker_position(annotation: &VideoAnnotation, total_duration_secs: f64) -> f64 {
    if !(total_duration_secs > 0.0) {
        return 0.0;
    }
    (annotation.time_secs / total_duration_secs) * 100.0
}
