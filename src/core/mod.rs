// Core pipeline exports
pub mod analyzer;
pub mod condense;
pub mod gate;
pub mod postprocess;
pub mod prompt;
pub mod scoring;
pub mod seeds;
pub mod selector;

pub use analyzer::Analyzer;
pub use condense::{condense, truncate_at_word_boundary};
pub use gate::validate;
pub use prompt::QuotingPolicy;
pub use scoring::score_record;
pub use selector::{select, FitThresholds};
