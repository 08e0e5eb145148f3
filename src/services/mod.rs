// Service exports
pub mod model_api;
pub mod parser;

pub use model_api::{
    GeminiClient, GenerateBackend, ModelError, ModelInvoker, RetrySettings, SamplingSettings,
};
pub use parser::{fallback_report, parse};
