use crate::models::ValidationMessage;
use regex::Regex;
use std::sync::OnceLock;

/// Minimum length for the length signal
const MIN_LENGTH: usize = 200;

/// Minimum line-break count for the structure signal
const MIN_LINE_BREAKS: usize = 2;

/// Fixed rejection message returned when the gate fails
pub const REJECTION_MESSAGE: &str = "That doesn't look like a complete job description. \
Paste the full posting, including the role, responsibilities and requirements, \
and I'll take a proper look.";

fn header_keywords() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(requirements|responsibilities|qualifications|about the role|about you|who you are|what you.ll do)",
        )
        .expect("header keyword pattern is valid")
    })
}

/// Check job text quality before any expensive work
///
/// Three independent signals: length, line breaks, and a section-header
/// keyword. Passing any two of the three is enough; this tolerates oddly
/// formatted but substantive postings while rejecting single-keyword noise.
///
/// Returns `None` when the text passes.
pub fn validate(job_text: &str) -> Option<ValidationMessage> {
    let long_enough = job_text.chars().count() >= MIN_LENGTH;
    let has_structure = job_text.matches('\n').count() >= MIN_LINE_BREAKS;
    let has_header = header_keywords().is_match(job_text);

    let signals = [long_enough, has_structure, has_header]
        .iter()
        .filter(|s| **s)
        .count();

    if signals >= 2 {
        None
    } else {
        Some(ValidationMessage::new(REJECTION_MESSAGE))
    }
}
