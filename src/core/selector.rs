use crate::core::condense::truncate_at_word_boundary;
use crate::core::scoring::score_record;
use crate::models::{CandidateProfile, FitBucket, ProjectRef, Selection};

/// Ceiling for the condensed fact block
pub const FACTS_LIMIT: usize = 1200;

/// Fallback reference line when the profile carries no projects
const GENERIC_PROJECT_LINE: &str =
    "Selected case studies are available on request and cover comparable work.";

/// Score thresholds mapping an adjusted total to a fit bucket
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct FitThresholds {
    #[serde(default = "default_strong")]
    pub strong: i32,
    #[serde(default = "default_good")]
    pub good: i32,
    #[serde(default = "default_stretch")]
    pub stretch: i32,
}

fn default_strong() -> i32 {
    12
}
fn default_good() -> i32 {
    8
}
fn default_stretch() -> i32 {
    4
}

impl Default for FitThresholds {
    fn default() -> Self {
        Self {
            strong: default_strong(),
            good: default_good(),
            stretch: default_stretch(),
        }
    }
}

impl FitThresholds {
    fn bucket_for(&self, score: i32) -> FitBucket {
        if score >= self.strong {
            FitBucket::StrongFit
        } else if score >= self.good {
            FitBucket::GoodFit
        } else if score >= self.stretch {
            FitBucket::StretchFit
        } else {
            FitBucket::ExploratoryFit
        }
    }
}

/// One-directional bucket upgrade rule
///
/// Fires when any job term appears in the summary and any fact term appears
/// in the retained facts. The resulting bucket is the supremum of the base
/// classification and every triggered floor, so rule order never matters and
/// no rule can weaken a classification.
struct UpgradeRule {
    name: &'static str,
    job_terms: &'static [&'static str],
    fact_terms: &'static [&'static str],
    floor: FitBucket,
}

/// Every floor sits at stretch or above, so adjacent-domain evidence never
/// leaves the classification at exploratory.
const UPGRADE_RULES: &[UpgradeRule] = &[
    UpgradeRule {
        name: "healthcare overlap",
        job_terms: &["healthcare", "medical", "clinical", "patient", "medtech"],
        fact_terms: &["healthcare", "medical", "clinical", "patient"],
        floor: FitBucket::GoodFit,
    },
    UpgradeRule {
        name: "b2b/enterprise overlap",
        job_terms: &["b2b", "enterprise", "saas"],
        fact_terms: &["b2b", "enterprise", "saas"],
        floor: FitBucket::GoodFit,
    },
    UpgradeRule {
        name: "ux research overlap",
        job_terms: &["user research", "usability", "research"],
        fact_terms: &["user research", "usability", "interview"],
        floor: FitBucket::GoodFit,
    },
    UpgradeRule {
        name: "product design overlap",
        job_terms: &["product design", "product designer", "ui design"],
        fact_terms: &["product design", "design system", "prototype"],
        floor: FitBucket::GoodFit,
    },
    UpgradeRule {
        name: "nordic/regional overlap",
        job_terms: &["stockholm", "sweden", "nordic", "scandinavia"],
        fact_terms: &["stockholm", "sweden", "nordic"],
        floor: FitBucket::StretchFit,
    },
    UpgradeRule {
        name: "sustainability overlap",
        job_terms: &["sustainability", "climate", "green energy"],
        fact_terms: &["sustainability", "climate"],
        floor: FitBucket::StretchFit,
    },
    UpgradeRule {
        name: "web/lead-generation overlap",
        job_terms: &["lead generation", "landing page", "conversion", "web design"],
        fact_terms: &["lead generation", "landing page", "web"],
        floor: FitBucket::StretchFit,
    },
];

/// Capability-gap rule: a domain the posting asks for that the retained
/// facts never mention
struct GapRule {
    job_terms: &'static [&'static str],
    fact_terms: &'static [&'static str],
    sentence: &'static str,
}

const GAP_RULES: &[GapRule] = &[
    GapRule {
        job_terms: &["fintech", "banking", "payments"],
        fact_terms: &["fintech", "banking", "payments"],
        sentence: "Fintech is an adjacent domain rather than a proven one, so expect a short ramp-up on financial workflows.",
    },
    GapRule {
        job_terms: &["security", "devsecops", "threat"],
        fact_terms: &["security", "devsecops"],
        sentence: "Hands-on security tooling has not been a focus area; domain depth there would need to be built up.",
    },
    GapRule {
        job_terms: &["marketing saas", "martech", "marketing automation"],
        fact_terms: &["marketing saas", "martech", "marketing automation"],
        sentence: "Marketing SaaS products are new territory, though the underlying B2B patterns carry over.",
    },
];

/// Score every experience and project against the job summary, keep the top
/// facts, classify the fit and derive capability gaps
pub fn select(
    profile: &CandidateProfile,
    job_summary: &str,
    thresholds: &FitThresholds,
) -> Selection {
    let mut scored_experiences: Vec<(i32, &crate::models::Experience)> = profile
        .experiences
        .iter()
        .map(|e| (score_record(&e.searchable_text(), job_summary), e))
        .collect();
    scored_experiences.sort_by(|a, b| b.0.cmp(&a.0));

    let mut scored_projects: Vec<(i32, &crate::models::Project)> = profile
        .projects
        .iter()
        .map(|p| (score_record(&p.searchable_text(), job_summary), p))
        .collect();
    scored_projects.sort_by(|a, b| b.0.cmp(&a.0));

    let retained_experiences = &scored_experiences[..scored_experiences.len().min(2)];
    let retained_project = scored_projects.first();

    // Full retained text, used for gap and upgrade matching before truncation
    let mut fact_lines: Vec<String> = retained_experiences
        .iter()
        .map(|(_, e)| e.fact_line())
        .collect();
    if let Some((_, p)) = retained_project {
        fact_lines.push(p.fact_line());
    }
    let retained_text = fact_lines.join("\n").to_lowercase();

    let gaps = detect_gaps(job_summary, &retained_text);

    let mut combined_score: i32 = retained_experiences.iter().map(|(s, _)| s).sum();
    if let Some((s, _)) = retained_project {
        combined_score += s;
    }
    if !gaps.is_empty() {
        combined_score -= 1;
    }

    let base = thresholds.bucket_for(combined_score);
    let bucket = apply_upgrades(base, job_summary, &retained_text);

    let reference_project = match retained_project {
        Some((_, p)) => ProjectRef {
            title: p.title.clone(),
            line: p
                .evidence
                .first()
                .cloned()
                .unwrap_or_else(|| GENERIC_PROJECT_LINE.to_string()),
        },
        None => ProjectRef {
            title: "Selected client work".to_string(),
            line: GENERIC_PROJECT_LINE.to_string(),
        },
    };

    let fact_block = truncate_at_word_boundary(&fact_lines.join("\n"), FACTS_LIMIT);

    tracing::debug!(
        score = combined_score,
        bucket = %bucket,
        gaps = gaps.len(),
        "fact selection complete"
    );

    Selection {
        fact_block,
        reference_project,
        bucket,
        gaps,
        combined_score,
    }
}

/// Supremum of the base bucket and every triggered rule floor
fn apply_upgrades(base: FitBucket, job_summary: &str, retained_text: &str) -> FitBucket {
    let summary = job_summary.to_lowercase();
    let mut bucket = base;

    for rule in UPGRADE_RULES {
        let job_hit = rule.job_terms.iter().any(|t| summary.contains(t));
        let fact_hit = rule.fact_terms.iter().any(|t| retained_text.contains(t));
        if job_hit && fact_hit {
            tracing::debug!(rule = rule.name, floor = %rule.floor, "upgrade rule triggered");
            bucket = bucket.max(rule.floor);
        }
    }

    bucket
}

/// One fixed sentence per domain the posting asks for but the facts lack
fn detect_gaps(job_summary: &str, retained_text: &str) -> Vec<String> {
    let summary = job_summary.to_lowercase();

    GAP_RULES
        .iter()
        .filter(|rule| {
            rule.job_terms.iter().any(|t| summary.contains(t))
                && !rule.fact_terms.iter().any(|t| retained_text.contains(t))
        })
        .map(|rule| rule.sentence.to_string())
        .collect()
}
