use serde::{Deserialize, Serialize};

/// Four-level fit classification, ordered by confidence
///
/// Derives `Ord` so override rules can take a supremum: upgrades pick the
/// highest bucket, never a lower one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitBucket {
    ExploratoryFit,
    StretchFit,
    GoodFit,
    StrongFit,
}

impl std::fmt::Display for FitBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExploratoryFit => write!(f, "exploratory_fit"),
            Self::StretchFit => write!(f, "stretch_fit"),
            Self::GoodFit => write!(f, "good_fit"),
            Self::StrongFit => write!(f, "strong_fit"),
        }
    }
}

/// The single reference project surfaced in the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub title: String,
    pub line: String,
}

/// Final match report returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub quick_take: String,
    pub summary: String,
    pub strengths: Vec<String>,
    pub project: ProjectRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gaps: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing: Option<String>,
}

/// Terminal artifact when the input gate rejects the job text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationMessage {
    pub validation_message: String,
}

impl ValidationMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            validation_message: message.into(),
        }
    }
}

/// Exactly one of the two caller-visible shapes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Report(MatchReport),
    Invalid(ValidationMessage),
}

impl AnalysisOutcome {
    pub fn as_report(&self) -> Option<&MatchReport> {
        match self {
            Self::Report(r) => Some(r),
            Self::Invalid(_) => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }
}

/// Location restriction type detected from the raw job text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationRestriction {
    EuropeOnly,
    StockholmOnly,
    StockholmBased,
    OnSiteExpected,
    TravelExpected,
}

/// Result of evaluating the location rule table against the job text
#[derive(Debug, Clone)]
pub struct LocationNotice {
    pub restriction: Option<LocationRestriction>,
    /// Qualifying sentence for the prompt
    pub qualifier: &'static str,
    /// Gap-note sentence for the prompt
    pub gap_note: &'static str,
    /// Sentence appended to the final summary
    pub summary_note: &'static str,
}

impl LocationNotice {
    pub fn unrestricted() -> Self {
        Self {
            restriction: None,
            qualifier: "",
            gap_note: "",
            summary_note: "",
        }
    }

    pub fn is_restricted(&self) -> bool {
        self.restriction.is_some()
    }
}

/// Result of scanning the job text for AI/tech claim surfaces
#[derive(Debug, Clone, Default)]
pub struct AiClaimNotice {
    pub detected: bool,
    pub matched: Vec<String>,
}

/// Output of fact selection and fit classification
#[derive(Debug, Clone)]
pub struct Selection {
    /// Top facts condensed into one bounded block
    pub fact_block: String,
    pub reference_project: ProjectRef,
    pub bucket: FitBucket,
    pub gaps: Vec<String>,
    /// Adjusted sum of retained record scores
    pub combined_score: i32,
}
