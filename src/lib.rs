//! Jobfit Algo - candidate-job fit analysis pipeline
//!
//! Given free-text job requirements and a structured professional profile,
//! this library produces a short, constrained, evidence-grounded narrative
//! describing how well the candidate matches the role. Deterministic local
//! heuristics handle gating, condensation, scoring and classification; a
//! single constrained call to a hosted generative model writes the prose,
//! and post-generation enforcement keeps it inside the content rules.

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::Settings;
pub use core::{Analyzer, FitThresholds, QuotingPolicy};
pub use models::{
    AnalysisOutcome, CandidateProfile, Experience, FitBucket, MatchReport, Project, ProjectRef,
    ToneConfig, ValidationMessage,
};
pub use services::{GeminiClient, GenerateBackend, ModelError};

/// Initialize the tracing subscriber from logging settings
///
/// `RUST_LOG` takes precedence over the configured level. Safe to call more
/// than once; later calls are no-ops.
pub fn init_tracing(logging: &config::LoggingSettings) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        let _ = subscriber.pretty().try_init();
    } else {
        let _ = subscriber.try_init();
    }
}
