use crate::models::{MatchReport, ProjectRef};
use serde_json::Value;
use tracing::warn;

const FALLBACK_QUICK_TAKE: &str = "Here's an honest read on the match.";

const FALLBACK_SUMMARY: &str = "The profile shows relevant, evidence-backed experience that \
overlaps with several of the posting's requirements. A conversation would be the quickest \
way to map the specifics.";

const FALLBACK_STRENGTHS: &[&str] = &[
    "Hands-on research and design work on complex products",
    "A track record of shipping improvements backed by evidence",
    "Comfortable working with stakeholders across functions",
];

const FALLBACK_PROJECT_TITLE: &str = "Selected client work";
const FALLBACK_PROJECT_LINE: &str =
    "Case studies covering comparable work are available on request.";

/// Complete fixed report used when the model output is unusable, and by the
/// pipeline's outermost failure boundary
pub fn fallback_report() -> MatchReport {
    MatchReport {
        quick_take: FALLBACK_QUICK_TAKE.to_string(),
        summary: FALLBACK_SUMMARY.to_string(),
        strengths: FALLBACK_STRENGTHS.iter().map(|s| s.to_string()).collect(),
        project: ProjectRef {
            title: FALLBACK_PROJECT_TITLE.to_string(),
            line: FALLBACK_PROJECT_LINE.to_string(),
        },
        gaps: None,
        closing: None,
    }
}

/// Decode the model's raw response into a complete report
///
/// Never fails: any decode problem yields the fixed fallback report, and
/// individually missing or malformed fields are backfilled with defaults so
/// the shape contract always holds.
pub fn parse(raw: &Value) -> MatchReport {
    let text = raw
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str);

    let decoded: Option<Value> = match text {
        Some(t) => match serde_json::from_str(strip_code_fence(t)) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Model returned malformed JSON, using fallback: {}", e);
                None
            }
        },
        None => {
            warn!("Model response missing text payload, using fallback");
            None
        }
    };

    let Some(value) = decoded else {
        return fallback_report();
    };

    // Backfill field by field; a partially valid response keeps what it has
    let summary = value
        .get("summary")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_SUMMARY.to_string());

    let strengths: Vec<String> = value
        .get("strengths")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .filter(|v: &Vec<String>| !v.is_empty())
        .unwrap_or_else(|| FALLBACK_STRENGTHS.iter().map(|s| s.to_string()).collect());

    let project = value
        .get("project")
        .and_then(parse_project)
        .unwrap_or_else(|| ProjectRef {
            title: FALLBACK_PROJECT_TITLE.to_string(),
            line: FALLBACK_PROJECT_LINE.to_string(),
        });

    let gaps: Option<Vec<String>> = value
        .get("gaps")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect::<Vec<String>>()
        })
        .filter(|v| !v.is_empty());

    let closing = value
        .get("closing")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string);

    let quick_take = value
        .get("quick_take")
        .and_then(Value::as_str)
        .unwrap_or(FALLBACK_QUICK_TAKE)
        .to_string();

    MatchReport {
        quick_take,
        summary,
        strengths,
        project,
        gaps,
        closing,
    }
}

fn parse_project(value: &Value) -> Option<ProjectRef> {
    let title = value.get("title").and_then(Value::as_str)?;
    let line = value.get("line").and_then(Value::as_str)?;
    if title.trim().is_empty() {
        return None;
    }
    Some(ProjectRef {
        title: title.to_string(),
        line: line.to_string(),
    })
}

/// Models sometimes wrap JSON in a markdown code fence despite instructions
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}
