use crate::core::selector::FitThresholds;
use crate::services::model_api::{RetrySettings, SamplingSettings};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub model: ModelSettings,
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_primary_model")]
    pub primary_model: String,
    #[serde(default = "default_fallback_model")]
    pub fallback_model: String,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub sampling: SamplingSettings,
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_primary_model() -> String {
    "gemini-2.0-flash-lite".to_string()
}

fn default_fallback_model() -> String {
    "gemini-2.0-flash".to_string()
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: String::new(),
            primary_model: default_primary_model(),
            fallback_model: default_fallback_model(),
            retry: RetrySettings::default(),
            sampling: SamplingSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisSettings {
    #[serde(default)]
    pub thresholds: FitThresholds,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with JOBFIT_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with JOBFIT_)
            // e.g., JOBFIT_MODEL__PRIMARY_MODEL -> model.primary_model
            .add_source(
                Environment::with_prefix("JOBFIT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("JOBFIT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Pick up the provider API key from the conventional environment variable
/// when the prefixed form is not set
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let api_key = env::var("GEMINI_API_KEY")
        .or_else(|_| env::var("JOBFIT_MODEL__API_KEY"))
        .ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(key) = api_key {
        builder = builder.set_override("model.api_key", key)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_settings() {
        let model = ModelSettings::default();
        assert_eq!(model.primary_model, "gemini-2.0-flash-lite");
        assert_eq!(model.fallback_model, "gemini-2.0-flash");
        assert!(model.endpoint.starts_with("https://"));
        assert_eq!(model.retry.max_attempts, 3);
    }

    #[test]
    fn test_default_thresholds() {
        let analysis = AnalysisSettings::default();
        assert_eq!(analysis.thresholds.strong, 12);
        assert_eq!(analysis.thresholds.good, 8);
        assert_eq!(analysis.thresholds.stretch, 4);
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
    }

    #[test]
    fn test_default_sampling_is_low_temperature() {
        let model = ModelSettings::default();
        assert!(model.sampling.temperature < 0.5);
        assert!(model.sampling.max_output_tokens >= 512);
    }
}
