use crate::config::Settings;
use crate::core::postprocess::{self, FinalizeInputs};
use crate::core::prompt::{self, QuotingPolicy};
use crate::core::{condense, gate, seeds, selector};
use crate::models::{AnalysisOutcome, CandidateProfile, MatchReport};
use crate::services::model_api::{GenerateBackend, ModelError, ModelInvoker};
use crate::services::parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Candidate-job fit analyzer
///
/// An explicit service object: the caller constructs it once with a model
/// backend and settings and passes it around by reference. Two concurrent
/// `analyze` calls share no mutable state.
pub struct Analyzer {
    invoker: ModelInvoker,
    settings: Settings,
    /// Fixed RNG seed for reproducible phrase selection in tests
    seed: Option<u64>,
}

impl Analyzer {
    pub fn new(backend: Arc<dyn GenerateBackend>, settings: Settings) -> Self {
        let invoker = ModelInvoker::new(
            backend,
            settings.model.primary_model.clone(),
            settings.model.fallback_model.clone(),
            settings.model.retry,
        );

        Self {
            invoker,
            settings,
            seed: None,
        }
    }

    /// Seed phrase selection so tests can assert exact picks
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Analyze one job posting against the candidate profile
    ///
    /// Always returns exactly one of the two caller-visible shapes: a
    /// validation message when the input gate rejects the text, otherwise a
    /// complete match report. Internal failures of any stage are converted
    /// into the fixed fallback report, never surfaced as errors.
    pub async fn analyze(&self, job_text: &str, profile: &CandidateProfile) -> AnalysisOutcome {
        if let Some(rejection) = gate::validate(job_text) {
            info!("Job text rejected by input gate");
            return AnalysisOutcome::Invalid(rejection);
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let summary = condense::condense(job_text);
        let selection = selector::select(profile, &summary, &self.settings.analysis.thresholds);
        let location = seeds::detect_location(job_text);
        let ai = seeds::detect_ai_claims(job_text);
        let quick_take = seeds::pick_quick_take(selection.bucket, profile.tone.as_ref(), &mut rng);
        let policy = QuotingPolicy::from_tone(profile.tone.as_ref());

        debug!(
            bucket = %selection.bucket,
            restricted = location.is_restricted(),
            ai_claims = ai.detected,
            "pipeline inputs prepared"
        );

        let mut report = match self.run_model(&summary, &selection, profile, &location, &ai, &policy).await
        {
            Ok(raw) => parser::parse(&raw),
            Err(err) => {
                error!("Model invocation failed, using fallback report: {}", err);
                parser::fallback_report()
            }
        };

        let inputs = FinalizeInputs {
            quick_take: &quick_take,
            bucket: selection.bucket,
            location: &location,
            local_gaps: &selection.gaps,
            tone: profile.tone.as_ref(),
            job_text,
            policy,
        };
        postprocess::finalize(&mut report, &inputs, &mut rng);

        AnalysisOutcome::Report(report)
    }

    async fn run_model(
        &self,
        summary: &str,
        selection: &crate::models::Selection,
        profile: &CandidateProfile,
        location: &crate::models::LocationNotice,
        ai: &crate::models::AiClaimNotice,
        policy: &QuotingPolicy,
    ) -> Result<serde_json::Value, ModelError> {
        let schema = prompt::response_schema();
        let text = prompt::build(
            summary,
            selection,
            selection.bucket,
            profile.tone.as_ref(),
            location,
            ai,
            policy,
        );

        self.invoker.invoke(&text, &schema).await
    }
}
