/// Calculate a relevance score for one profile record against a condensed job summary
///
/// Scoring table (points accumulate for terms present in BOTH texts):
///     core research/process terms        +3 each
///     healthcare domain terms            +3 each
///     B2B / enterprise / SaaS terms      +2 each
///     complex-systems terms              +2 each
///     UX terms (UX-flavored roles only)  +3 each, +4 for strong UX signals
///     generic complexity/remote markers  +1 each
///
/// A pure data/analytics record applying to a UX-flavored role takes a -2
/// penalty when it carries no user/design/web vocabulary at all.
pub fn score_record(record_text: &str, job_summary: &str) -> i32 {
    let record = record_text.to_lowercase();
    let summary = job_summary.to_lowercase();

    let mut score = 0;

    score += count_shared(&record, &summary, CORE_TERMS) * 3;
    score += count_shared(&record, &summary, HEALTHCARE_TERMS) * 3;
    score += count_shared(&record, &summary, ENTERPRISE_TERMS) * 2;
    score += count_shared(&record, &summary, COMPLEX_TERMS) * 2;

    if is_ux_flavored(&summary) {
        score += count_shared(&record, &summary, UX_TERMS) * 3;
        score += count_shared(&record, &summary, UX_STRONG_TERMS) * 4;

        if is_pure_data_record(&record) {
            score -= 2;
        }
    }

    score += count_shared(&record, &summary, GENERIC_TERMS);

    score
}

/// Whether the job summary reads as a UX/design role
#[inline]
pub fn is_ux_flavored(summary: &str) -> bool {
    contains_any(summary, UX_ROLE_MARKERS)
}

/// Terms counted when they appear in both the record and the summary
#[inline]
fn count_shared(record: &str, summary: &str, terms: &[&str]) -> i32 {
    terms
        .iter()
        .filter(|t| record.contains(*t) && summary.contains(*t))
        .count() as i32
}

#[inline]
fn contains_any(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| text.contains(t))
}

/// Data/analytics record with no user-facing vocabulary
#[inline]
fn is_pure_data_record(record: &str) -> bool {
    contains_any(record, DATA_TERMS) && !contains_any(record, USER_FACING_TERMS)
}

const CORE_TERMS: &[&str] = &[
    "user research",
    "usability",
    "interview",
    "prototype",
    "discovery",
    "stakeholder",
    "workshop",
    "design process",
    "field study",
    "survey",
];

const HEALTHCARE_TERMS: &[&str] = &[
    "healthcare",
    "health care",
    "medical",
    "clinical",
    "patient",
    "medtech",
];

const ENTERPRISE_TERMS: &[&str] = &["b2b", "enterprise", "saas", "internal tools"];

const COMPLEX_TERMS: &[&str] = &["complex systems", "regulated", "compliance", "data-heavy"];

const UX_ROLE_MARKERS: &[&str] = &[
    "ux",
    "user experience",
    "product design",
    "designer",
    "usability",
];

const UX_TERMS: &[&str] = &[
    "ux",
    "user experience",
    "design system",
    "accessibility",
    "wireframe",
    "figma",
    "information architecture",
];

const UX_STRONG_TERMS: &[&str] = &["user research", "usability testing", "end-to-end design"];

const DATA_TERMS: &[&str] = &["analytics", "data pipeline", "sql", "dashboard", "reporting"];

const USER_FACING_TERMS: &[&str] = &["user", "design", "web", "interface"];

const GENERIC_TERMS: &[&str] = &["complex", "remote", "cross-functional", "agile"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_terms_score_three_each() {
        let record = "led user research and usability sessions";
        let summary = "we expect user research and usability skills";

        // "user research" and "usability" co-occur; summary is UX-flavored so
        // the UX strong bonus also applies for "user research"
        let score = score_record(record, summary);
        assert!(score >= 6);
    }

    #[test]
    fn test_no_co_occurrence_scores_zero() {
        let record = "backend engineer working on payment rails";
        let summary = "we need a gardener for our rooftop terrace";

        assert_eq!(score_record(record, summary), 0);
    }

    #[test]
    fn test_term_in_only_one_text_does_not_count() {
        let record = "deep healthcare expertise with clinical staff";
        let summary = "selling shoes online";

        assert_eq!(score_record(record, summary), 0);
    }

    #[test]
    fn test_data_record_penalized_for_ux_role() {
        let data_record = "built analytics dashboard and sql reporting";
        let ux_summary = "senior ux designer for our product";

        assert_eq!(score_record(data_record, ux_summary), -2);
    }

    #[test]
    fn test_data_record_with_user_terms_not_penalized() {
        let record = "built analytics dashboard with user-centered design";
        let ux_summary = "senior ux designer for our product";

        assert!(score_record(record, ux_summary) >= 0);
    }

    #[test]
    fn test_healthcare_overlap_scores_high() {
        let record = "clinical workflows for patient safety in healthcare";
        let summary = "healthcare startup improving patient outcomes with clinical teams";

        // Three healthcare terms co-occur at +3 each
        assert!(score_record(record, summary) >= 9);
    }

    #[test]
    fn test_generic_terms_score_one_each() {
        let record = "remote work on complex problems";
        let summary = "remote role tackling complex challenges";

        assert_eq!(score_record(record, summary), 2);
    }
}
