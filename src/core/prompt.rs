use crate::models::{AiClaimNotice, FitBucket, LocationNotice, Selection, ToneConfig};
use serde_json::{json, Value};
use std::fmt::Write;

/// Quoting contract bounds, resolved from the tone config or defaults
#[derive(Debug, Clone, Copy)]
pub struct QuotingPolicy {
    pub min: usize,
    pub max: usize,
    pub max_words: usize,
}

impl Default for QuotingPolicy {
    fn default() -> Self {
        Self {
            min: 1,
            max: 2,
            max_words: 8,
        }
    }
}

impl QuotingPolicy {
    pub fn from_tone(tone: Option<&ToneConfig>) -> Self {
        let defaults = Self::default();
        match tone {
            Some(t) => Self {
                min: t.quote_min.unwrap_or(defaults.min),
                max: t.quote_max.unwrap_or(defaults.max),
                max_words: t.quote_max_words.unwrap_or(defaults.max_words),
            },
            None => defaults,
        }
    }
}

/// Connector phrases a quote must flow into surrounding prose through
pub const QUOTE_CONNECTORS: &[&str] = &[
    "the posting asks for",
    "they describe it as",
    "in their words",
    "the ad calls this",
    "which maps directly to",
];

const DEFAULT_FORBIDDEN_PHRASES: &[&str] = &[
    "perfect fit",
    "dream candidate",
    "passionate",
    "rockstar",
    "ninja",
    "synergy",
    "world-class",
];

const DEFAULT_SOFTENERS: &[&str] = &[
    "adjacent experience suggests",
    "comparable work indicates",
    "related projects point to",
];

/// The JSON schema the model output must satisfy
///
/// `quick_take` is declared for shape completeness but is always overwritten
/// locally after generation.
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "quick_take": { "type": "string" },
            "summary": { "type": "string" },
            "strengths": {
                "type": "array",
                "items": { "type": "string" },
                "maxItems": 3
            },
            "project": {
                "type": "object",
                "properties": {
                    "title": { "type": "string" },
                    "line": { "type": "string" }
                },
                "required": ["title", "line"]
            },
            "gaps": {
                "type": "array",
                "items": { "type": "string" },
                "maxItems": 2
            },
            "closing": { "type": "string" }
        },
        "required": ["summary", "strengths", "project"]
    })
}

/// Assemble the full prompt from fixed template sections
///
/// Pure function of its inputs: no network, no randomness.
#[allow(clippy::too_many_arguments)]
pub fn build(
    job_summary: &str,
    selection: &Selection,
    bucket: FitBucket,
    tone: Option<&ToneConfig>,
    location: &LocationNotice,
    ai: &AiClaimNotice,
    policy: &QuotingPolicy,
) -> String {
    let mut prompt = String::with_capacity(4096);

    prompt.push_str(
        "You are writing a short, honest assessment of how well a specific candidate \
matches a job posting. Ground every claim in the evidence given below. Do not invent \
experience.\n\n",
    );

    let _ = writeln!(prompt, "JOB SUMMARY:\n{}\n", job_summary);
    let _ = writeln!(prompt, "CANDIDATE FACTS:\n{}\n", selection.fact_block);

    if let Some(rules) = tone.and_then(|t| t.citation_rules.as_deref()) {
        let _ = writeln!(prompt, "CITATION RULES:\n{}\n", rules);
    }

    prompt.push_str("PROVENANCE RULES:\n");
    prompt.push_str(
        "Any claim that references a term from the job posting must be backed by a \
matching candidate fact above. When no fact backs it, soften the claim using one of \
these phrasings instead of asserting it:\n",
    );
    let softeners: Vec<&str> = match tone {
        Some(t) if !t.provenance_softeners.is_empty() => {
            t.provenance_softeners.iter().map(String::as_str).collect()
        }
        _ => DEFAULT_SOFTENERS.to_vec(),
    };
    for s in &softeners {
        let _ = writeln!(prompt, "- {}", s);
    }
    prompt.push('\n');

    if location.is_restricted() {
        prompt.push_str("LOCATION (mandatory, not optional):\n");
        let _ = writeln!(prompt, "- {}", location.qualifier);
        let _ = writeln!(prompt, "- Work this into the gaps: {}", location.gap_note);
        let _ = writeln!(
            prompt,
            "- The summary must end with this exact sentence: {}",
            location.summary_note
        );
        prompt.push('\n');
    }

    if ai.detected {
        prompt.push_str("AI CLAIMS:\n");
        prompt.push_str(
            "The posting makes AI-related claims. Never assert direct experience with a \
named AI platform or product unless it appears in the candidate facts.\n",
        );
        if !ai.matched.is_empty() {
            let _ = writeln!(prompt, "Claim surfaces found: {}.", ai.matched.join(", "));
        }
        prompt.push('\n');
    }

    let _ = writeln!(
        prompt,
        "FIT CALIBRATION:\nThe computed fit level is \"{}\". Match your tone to that \
level. Never describe the candidate as an exploratory or speculative match when the \
fit level is above exploratory_fit.\n",
        bucket
    );

    prompt.push_str("TONE:\nPlain, specific, confident but never salesy. Avoid these phrases entirely:\n");
    let forbidden: Vec<&str> = match tone {
        Some(t) if !t.forbidden_phrases.is_empty() => {
            t.forbidden_phrases.iter().map(String::as_str).collect()
        }
        _ => DEFAULT_FORBIDDEN_PHRASES.to_vec(),
    };
    for f in &forbidden {
        let _ = writeln!(prompt, "- {}", f);
    }
    prompt.push('\n');

    let _ = writeln!(
        prompt,
        "QUOTING CONTRACT:\nQuote {} to {} short verbatim phrases from the job summary. \
Each quote must be at most {} words, wrapped in double quotes and bolded with ** \
markers, and must flow into the surrounding prose via one of these connectors:",
        policy.min, policy.max, policy.max_words
    );
    for c in QUOTE_CONNECTORS {
        let _ = writeln!(prompt, "- {}", c);
    }
    prompt.push_str("Never quote a generic single word out of context.\n\n");

    prompt.push_str("OUTPUT:\nReturn only a JSON object matching this schema, nothing else:\n");
    let _ = writeln!(
        prompt,
        "{}",
        serde_json::to_string_pretty(&response_schema()).unwrap_or_default()
    );

    prompt
}
