//! Analysis prompt construction.
//!
//! The prompt mandates a dual output: five human-readable, title-delimited
//! text blocks followed by one JSON object. The parser relies on the literal
//! block markers and on the trailing JSON, so the format instructions here
//! and the extraction logic in [`crate::parser`] must stay in sync.

use std::fmt::Write;

use fsight_models::{CharacteristicSet, MovementContext};

/// Build the analysis prompt for one video.
///
/// Deterministic: identical inputs produce the identical string. The five
/// characteristic names are embedded both in the numbered list and in the
/// trailing JSON example, in request order.
pub fn build_analysis_prompt(
    context: &MovementContext,
    characteristics: &CharacteristicSet,
    reply_language: &str,
) -> String {
    let mut numbered = String::new();
    for (i, name) in characteristics.iter().enumerate() {
        let _ = writeln!(numbered, "{}. {}", i + 1, name);
    }

    format!(
        r#"You are an expert {sport} coach with years of experience training {position} players. You are reviewing a video of {athlete} performing the following movement: {movement}.

Watch the video carefully and evaluate exactly these five technical characteristics:
{numbered}
For EACH of the five characteristics, write one block in exactly this format:

### <characteristic name>
**Tiempo:** <moment in the video where the characteristic is best observed, as M:SS>
**Análisis:** <detailed technical analysis of what the athlete does well and what needs work>
**Puntuación:** <score from 0 to 10>/10
**Resumen:** <summary of at most 50 words, suitable as an on-screen caption>

---

After the five blocks, end your response with a single JSON object matching exactly this schema (same characteristic names, same order):

{json_example}

Additional instructions:
- Use the exact characteristic names given above.
- The "time" fields must reference real moments in the video.
- "overall_score" is the mean of the five scores.
- Answer entirely in {language}.
"#,
        sport = context.sport,
        position = context.position,
        athlete = context.athlete_name,
        movement = context.movement_type,
        numbered = numbered,
        json_example = json_example(characteristics),
        language = reply_language,
    )
}

/// Literal JSON example with the five characteristic slots pre-filled.
fn json_example(characteristics: &CharacteristicSet) -> String {
    let entries: Vec<String> = characteristics
        .iter()
        .map(|name| {
            format!(
                r#"    {{ "name": "{}", "time": "M:SS", "score": 0, "feedback": "...", "summary": "..." }}"#,
                name
            )
        })
        .collect();

    format!(
        "{{\n  \"characteristics\": [\n{}\n  ],\n  \"overall_score\": 0,\n  \"conclusion\": \"...\"\n}}",
        entries.join(",\n")
    )
}
