use crate::core::prompt::QuotingPolicy;
use crate::core::seeds;
use crate::models::{FitBucket, LocationNotice, MatchReport, ToneConfig};
use rand::Rng;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Maximum strengths surfaced to the caller
const MAX_STRENGTHS: usize = 3;

/// Maximum gaps surfaced to the caller
const MAX_GAPS: usize = 2;

fn quote_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Matches a quoted phrase with or without existing bold markers, so a
    // second enforcement pass normalizes instead of nesting markup
    RE.get_or_init(|| Regex::new(r#"(\*\*)?"([^"\n]+)"(\*\*)?"#).expect("quote pattern is valid"))
}

fn consulting_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Strict word boundaries; "contracted deliverables" must not trigger
        Regex::new(r"\b(?:consulting|consultant|contractor|contract|freelancer|freelance)\b")
            .expect("consulting pattern is valid")
    })
}

/// Everything `finalize` needs besides the parsed report itself
pub struct FinalizeInputs<'a> {
    /// Locally chosen quick take; the model never controls this field
    pub quick_take: &'a str,
    pub bucket: FitBucket,
    pub location: &'a LocationNotice,
    pub local_gaps: &'a [String],
    pub tone: Option<&'a ToneConfig>,
    /// Raw job text, for the consulting closing special case
    pub job_text: &'a str,
    pub policy: QuotingPolicy,
}

/// Refine the parsed report in place: inject local seeds, enforce the
/// quoting contract, append disclaimers and clamp list lengths
pub fn finalize(report: &mut MatchReport, inputs: &FinalizeInputs<'_>, rng: &mut impl Rng) {
    report.quick_take = inputs.quick_take.to_string();

    // Idempotent: skipped when the disclaimer is already present
    if inputs.location.is_restricted() && !report.summary.contains(inputs.location.summary_note) {
        if !report.summary.ends_with(' ') && !report.summary.is_empty() {
            report.summary.push(' ');
        }
        report.summary.push_str(inputs.location.summary_note);
    }

    report.closing = Some(select_closing(inputs, rng));

    let has_model_gaps = report.gaps.as_ref().map_or(false, |g| !g.is_empty());
    if has_model_gaps {
        if let Some(gaps) = report.gaps.as_mut() {
            gaps.truncate(MAX_GAPS);
        }
    } else if !inputs.local_gaps.is_empty() {
        let capped: Vec<String> = inputs.local_gaps.iter().take(MAX_GAPS).cloned().collect();
        report.gaps = Some(capped);
    }

    report.strengths.truncate(MAX_STRENGTHS);

    enforce_quotes(report, &inputs.policy);
}

/// Bucket bank closing, with profile overrides and a consulting special case
fn select_closing(inputs: &FinalizeInputs<'_>, rng: &mut impl Rng) -> String {
    if consulting_pattern().is_match(&inputs.job_text.to_lowercase()) {
        return inputs
            .tone
            .and_then(|t| t.consulting_closing.clone())
            .unwrap_or_else(|| seeds::CONSULTING_CLOSING.to_string());
    }

    seeds::pick_closing(inputs.bucket, inputs.tone, rng)
}

/// Enforce the quoting contract post hoc
///
/// Bolds and clamps quotes found in the summary up to the configured
/// maximum; excess quotes keep their quote marks but lose bold markup. When
/// the summary alone does not reach the minimum, strengths entries are
/// processed in order until it does or they run out.
fn enforce_quotes(report: &mut MatchReport, policy: &QuotingPolicy) {
    let mut bolded = 0usize;

    report.summary = process_quotes(&report.summary, policy, &mut bolded);

    if bolded < policy.min {
        for entry in report.strengths.iter_mut() {
            if bolded >= policy.min {
                break;
            }
            *entry = process_quotes(entry, policy, &mut bolded);
        }
    }
}

fn process_quotes(text: &str, policy: &QuotingPolicy, bolded: &mut usize) -> String {
    quote_pattern()
        .replace_all(text, |caps: &Captures| {
            let quote = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            if *bolded < policy.max {
                *bolded += 1;
                format!("**\"{}\"**", clamp_quote(quote, policy.max_words))
            } else {
                format!("\"{}\"", quote)
            }
        })
        .into_owned()
}

/// Truncate a quote to the word limit, marking the cut with an ellipsis
fn clamp_quote(quote: &str, max_words: usize) -> String {
    let words: Vec<&str> = quote.split_whitespace().collect();
    if words.len() <= max_words {
        quote.trim().to_string()
    } else {
        format!("{}…", words[..max_words].join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProjectRef;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn base_report(summary: &str) -> MatchReport {
        MatchReport {
            quick_take: "model take".to_string(),
            summary: summary.to_string(),
            strengths: vec![
                "Strength one".to_string(),
                "Strength two".to_string(),
                "Strength three".to_string(),
                "Strength four".to_string(),
            ],
            project: ProjectRef {
                title: "T".to_string(),
                line: "L".to_string(),
            },
            gaps: None,
            closing: None,
        }
    }

    fn inputs<'a>(location: &'a LocationNotice, gaps: &'a [String]) -> FinalizeInputs<'a> {
        FinalizeInputs {
            quick_take: "local take",
            bucket: FitBucket::GoodFit,
            location,
            local_gaps: gaps,
            tone: None,
            job_text: "a normal permanent role",
            policy: QuotingPolicy::default(),
        }
    }

    #[test]
    fn test_quick_take_always_overwritten() {
        let location = LocationNotice::unrestricted();
        let mut report = base_report("Fine summary.");
        let mut rng = StdRng::seed_from_u64(3);

        finalize(&mut report, &inputs(&location, &[]), &mut rng);
        assert_eq!(report.quick_take, "local take");
    }

    #[test]
    fn test_strengths_clamped_to_three() {
        let location = LocationNotice::unrestricted();
        let mut report = base_report("Summary.");
        let mut rng = StdRng::seed_from_u64(3);

        finalize(&mut report, &inputs(&location, &[]), &mut rng);
        assert_eq!(report.strengths.len(), 3);
    }

    #[test]
    fn test_location_note_appended_once() {
        let location = seeds::detect_location("Stockholm based, 4 days a week in office");
        let gaps: Vec<String> = vec![];
        let mut report = base_report("Decent overlap.");
        let mut rng = StdRng::seed_from_u64(3);

        finalize(&mut report, &inputs(&location, &gaps), &mut rng);
        finalize(&mut report, &inputs(&location, &gaps), &mut rng);

        assert_eq!(report.summary.matches(location.summary_note).count(), 1);
        assert!(report.summary.ends_with(location.summary_note));
    }

    #[test]
    fn test_local_gaps_only_when_model_gave_none() {
        let location = LocationNotice::unrestricted();
        let local = vec!["gap a".to_string(), "gap b".to_string(), "gap c".to_string()];
        let mut rng = StdRng::seed_from_u64(3);

        let mut report = base_report("Summary.");
        finalize(&mut report, &inputs(&location, &local), &mut rng);
        assert_eq!(report.gaps.as_ref().unwrap().len(), 2);

        let mut report = base_report("Summary.");
        report.gaps = Some(vec!["model gap".to_string()]);
        finalize(&mut report, &inputs(&location, &local), &mut rng);
        assert_eq!(report.gaps.as_ref().unwrap(), &vec!["model gap".to_string()]);
    }

    #[test]
    fn test_quotes_bolded_and_clamped() {
        let location = LocationNotice::unrestricted();
        let long_quote = "one two three four five six seven eight nine ten";
        let mut report = base_report(&format!("They want \"{}\" here.", long_quote));
        let mut rng = StdRng::seed_from_u64(3);

        finalize(&mut report, &inputs(&location, &[]), &mut rng);

        assert!(report.summary.contains("**\"one two three four five six seven eight…\"**"));
        assert!(!report.summary.contains("nine"));
    }

    #[test]
    fn test_excess_quotes_lose_bold_keep_marks() {
        let location = LocationNotice::unrestricted();
        let mut report =
            base_report("Wants \"first quote\" and \"second quote\" and \"third quote\".");
        let mut rng = StdRng::seed_from_u64(3);

        finalize(&mut report, &inputs(&location, &[]), &mut rng);

        assert!(report.summary.contains("**\"first quote\"**"));
        assert!(report.summary.contains("**\"second quote\"**"));
        assert!(report.summary.contains("\"third quote\""));
        assert!(!report.summary.contains("**\"third quote\"**"));
    }

    #[test]
    fn test_minimum_topped_up_from_strengths() {
        let location = LocationNotice::unrestricted();
        let mut report = base_report("No quotes in the summary at all.");
        report.strengths = vec!["Deep \"user research\" background".to_string()];
        let mut rng = StdRng::seed_from_u64(3);

        finalize(&mut report, &inputs(&location, &[]), &mut rng);

        assert!(report.strengths[0].contains("**\"user research\"**"));
    }

    #[test]
    fn test_quote_enforcement_idempotent() {
        let location = LocationNotice::unrestricted();
        let mut report = base_report("They ask for \"usability testing\" experience.");
        let mut rng = StdRng::seed_from_u64(3);

        finalize(&mut report, &inputs(&location, &[]), &mut rng);
        let once = report.summary.clone();
        finalize(&mut report, &inputs(&location, &[]), &mut rng);

        assert_eq!(report.summary, once);
    }

    #[test]
    fn test_consulting_closing_word_boundary() {
        let location = LocationNotice::unrestricted();
        let mut rng = StdRng::seed_from_u64(3);

        let mut report = base_report("Summary.");
        let mut consulting = inputs(&location, &[]);
        consulting.job_text = "6 month contract role in Oslo";
        finalize(&mut report, &consulting, &mut rng);
        assert_eq!(report.closing.as_deref(), Some(seeds::CONSULTING_CLOSING));

        // "contracted" must not trigger the special case
        let mut report = base_report("Summary.");
        let mut contracted = inputs(&location, &[]);
        contracted.job_text = "we have contracted deliverables with clients";
        finalize(&mut report, &contracted, &mut rng);
        assert_ne!(report.closing.as_deref(), Some(seeds::CONSULTING_CLOSING));
    }
}
