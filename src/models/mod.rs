// Model exports
pub mod profile;
pub mod report;

pub use profile::{BucketPhrases, CandidateProfile, Experience, Project, ToneConfig};
pub use report::{
    AiClaimNotice, AnalysisOutcome, FitBucket, LocationNotice, LocationRestriction, MatchReport,
    ProjectRef, Selection, ValidationMessage,
};
