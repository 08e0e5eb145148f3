use crate::models::{AiClaimNotice, FitBucket, LocationNotice, LocationRestriction, ToneConfig};
use rand::Rng;
use regex::Regex;
use std::sync::OnceLock;

const STRONG_QUICK_TAKES: &[&str] = &[
    "This looks like a genuinely strong match.",
    "On paper this is close to a textbook fit.",
    "The overlap here is hard to miss.",
];

const GOOD_QUICK_TAKES: &[&str] = &[
    "This looks like a solid match with real overlap.",
    "There's a credible case for this role.",
];

const STRETCH_QUICK_TAKES: &[&str] = &[
    "This would be a stretch, but not an unreasonable one.",
    "Parts of this role line up well; others would be new ground.",
];

const EXPLORATORY_QUICK_TAKES: &[&str] = &[
    "This sits outside the usual territory, worth a conversation at most.",
    "The honest read: this is exploratory.",
];

const STRONG_CLOSINGS: &[&str] = &[
    "Worth reaching out - this one checks the boxes that matter.",
    "If the team is hiring for impact, this profile delivers it.",
];

const GOOD_CLOSINGS: &[&str] = &[
    "A conversation would likely confirm the fit.",
    "Solid foundation here; the gaps are learnable.",
];

const STRETCH_CLOSINGS: &[&str] = &[
    "With some ramp-up time, this could work well.",
    "The transferable skills make this worth considering.",
];

const EXPLORATORY_CLOSINGS: &[&str] = &[
    "Probably better matches out there, but unusual angles sometimes win.",
    "An open-minded hiring manager might still see the upside.",
];

/// Closing used when the posting reads as consulting or contract work
pub const CONSULTING_CLOSING: &str =
    "For consulting or contract work like this, a scoped pilot engagement is usually the fastest way to find out.";

fn default_quick_takes(bucket: FitBucket) -> &'static [&'static str] {
    match bucket {
        FitBucket::StrongFit => STRONG_QUICK_TAKES,
        FitBucket::GoodFit => GOOD_QUICK_TAKES,
        FitBucket::StretchFit => STRETCH_QUICK_TAKES,
        FitBucket::ExploratoryFit => EXPLORATORY_QUICK_TAKES,
    }
}

fn default_closings(bucket: FitBucket) -> &'static [&'static str] {
    match bucket {
        FitBucket::StrongFit => STRONG_CLOSINGS,
        FitBucket::GoodFit => GOOD_CLOSINGS,
        FitBucket::StretchFit => STRETCH_CLOSINGS,
        FitBucket::ExploratoryFit => EXPLORATORY_CLOSINGS,
    }
}

/// Pick a one-line quick take for the bucket
///
/// A profile-supplied bank takes precedence over the built-in one. This is
/// the only non-deterministic step in the pipeline; the caller controls the
/// RNG so tests can seed it.
pub fn pick_quick_take(bucket: FitBucket, tone: Option<&ToneConfig>, rng: &mut impl Rng) -> String {
    if let Some(bank) = tone.and_then(|t| t.quick_takes.as_ref()) {
        let phrases = bank.for_bucket(bucket);
        if !phrases.is_empty() {
            return phrases[rng.gen_range(0..phrases.len())].clone();
        }
    }

    let defaults = default_quick_takes(bucket);
    defaults[rng.gen_range(0..defaults.len())].to_string()
}

/// Pick a closing line for the bucket, same precedence as quick takes
pub fn pick_closing(bucket: FitBucket, tone: Option<&ToneConfig>, rng: &mut impl Rng) -> String {
    if let Some(bank) = tone.and_then(|t| t.closings.as_ref()) {
        let phrases = bank.for_bucket(bucket);
        if !phrases.is_empty() {
            return phrases[rng.gen_range(0..phrases.len())].clone();
        }
    }

    let defaults = default_closings(bucket);
    defaults[rng.gen_range(0..defaults.len())].to_string()
}

struct LocationRule {
    pattern: &'static str,
    restriction: LocationRestriction,
    qualifier: &'static str,
    gap_note: &'static str,
    summary_note: &'static str,
}

/// Ordered most specific first; the first matching rule wins
const LOCATION_RULES: &[LocationRule] = &[
    LocationRule {
        pattern: r"europe[\s-]only|only\s+(?:candidates\s+)?(?:based\s+)?in\s+europe",
        restriction: LocationRestriction::EuropeOnly,
        qualifier: "The posting limits candidates to Europe.",
        gap_note: "Eligibility to work in Europe would need to be confirmed early.",
        summary_note: "Note that this role is restricted to candidates based in Europe.",
    },
    LocationRule {
        pattern: r"stockholm[\s-]only|only\s+(?:candidates\s+)?(?:based\s+)?in\s+stockholm",
        restriction: LocationRestriction::StockholmOnly,
        qualifier: "The posting limits candidates to Stockholm.",
        gap_note: "Being outside Stockholm would be a blocker unless the employer flexes.",
        summary_note: "Note that this role is restricted to candidates in Stockholm.",
    },
    LocationRule {
        pattern: r"(?:based|located)\s+in\s+(?:stockholm|sweden)|stockholm[\s-]based|sweden[\s-]based",
        restriction: LocationRestriction::StockholmBased,
        qualifier: "The posting expects the candidate to be based in Stockholm or Sweden.",
        gap_note: "Relocation or an existing base in Sweden would need to be sorted out.",
        summary_note: "Note that this role expects Stockholm-based work, which would need to be part of the conversation.",
    },
    LocationRule {
        pattern: r"on[\s-]?site|in[\s-]office|days?\s+(?:a|per)\s+week\s+in\s+(?:the\s+)?office|hybrid",
        restriction: LocationRestriction::OnSiteExpected,
        qualifier: "The posting expects regular on-site presence.",
        gap_note: "The on-site expectation may not suit a remote-first setup.",
        summary_note: "Note that this role expects on-site presence, which would need to be agreed upfront.",
    },
    LocationRule {
        pattern: r"travel\s+(?:is\s+)?required|willing(?:ness)?\s+to\s+travel|relocat(?:e|ion)",
        restriction: LocationRestriction::TravelExpected,
        qualifier: "The posting mentions travel or relocation expectations.",
        gap_note: "Travel or relocation expectations would need to be clarified.",
        summary_note: "Note that this role carries travel or relocation expectations worth clarifying early.",
    },
];

fn location_regexes() -> &'static Vec<Regex> {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        LOCATION_RULES
            .iter()
            .map(|r| Regex::new(r.pattern).expect("location pattern is valid"))
            .collect()
    })
}

/// Evaluate the ordered location rule table against the raw job text
pub fn detect_location(job_text: &str) -> LocationNotice {
    let text = job_text.to_lowercase();

    for (rule, re) in LOCATION_RULES.iter().zip(location_regexes().iter()) {
        if re.is_match(&text) {
            tracing::debug!(restriction = ?rule.restriction, "location rule matched");
            return LocationNotice {
                restriction: Some(rule.restriction),
                qualifier: rule.qualifier,
                gap_note: rule.gap_note,
                summary_note: rule.summary_note,
            };
        }
    }

    LocationNotice::unrestricted()
}

const AI_KEYWORDS: &[&str] = &[
    "ai-first",
    "ai-driven",
    "ai-powered",
    "ai-native",
    "machine learning",
    "generative ai",
    "artificial intelligence",
    "llm",
    "copilot",
];

fn ai_claim_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\bai[\s-](?:tool|platform|product|feature|workflow|agent)s?\b")
            .expect("ai claim pattern is valid")
    })
}

/// Scan the job text for AI/tech claim surfaces that the narrative must not
/// overclaim direct experience with
pub fn detect_ai_claims(job_text: &str) -> AiClaimNotice {
    let text = job_text.to_lowercase();

    let matched: Vec<String> = AI_KEYWORDS
        .iter()
        .filter(|k| text.contains(*k))
        .map(|k| k.to_string())
        .collect();

    let detected = !matched.is_empty() || ai_claim_pattern().is_match(&text);

    AiClaimNotice { detected, matched }
}
