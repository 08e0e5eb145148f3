use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Errors that can occur when calling the generative model API
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("rate limited by provider")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API returned error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unauthorized: invalid API key")]
    Unauthorized,

    #[error("invalid response format: {0}")]
    InvalidResponse(String),
}

impl ModelError {
    /// Only rate limiting is retried and eligible for model fallback
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Attach the failing model's name to errors surfaced to the caller
    fn with_model(self, model: &str) -> Self {
        match self {
            Self::Api { status, message } => Self::Api {
                status,
                message: format!("model {}: {}", model, message),
            },
            Self::InvalidResponse(message) => {
                Self::InvalidResponse(format!("model {}: {}", model, message))
            }
            other => other,
        }
    }
}

/// Sampling parameters sent with every generation request
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct SamplingSettings {
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_temperature() -> f64 {
    0.35
}
fn default_top_p() -> f64 {
    0.9
}
fn default_top_k() -> u32 {
    40
}
fn default_max_output_tokens() -> u32 {
    1024
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

/// Retry policy for a single model
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_base_delay_ms() -> u64 {
    800
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

/// A backend able to run one constrained generation request
///
/// The analysis pipeline only ever talks to this trait; production code
/// plugs in [`GeminiClient`], tests plug in a scripted fake.
#[async_trait]
pub trait GenerateBackend: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str, schema: &Value)
        -> Result<Value, ModelError>;
}

/// HTTP client for a Gemini-style generateContent API
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    client: Client,
    sampling: SamplingSettings,
}

impl GeminiClient {
    pub fn new(base_url: String, api_key: String, sampling: SamplingSettings) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
            sampling,
        }
    }
}

#[async_trait]
impl GenerateBackend for GeminiClient {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        schema: &Value,
    ) -> Result<Value, ModelError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": self.sampling.temperature,
                "topP": self.sampling.top_p,
                "topK": self.sampling.top_k,
                "maxOutputTokens": self.sampling.max_output_tokens,
                "responseMimeType": "application/json",
                "responseSchema": schema,
            }
        });

        debug!("Calling model {} ({} prompt chars)", model, prompt.len());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        match status.as_u16() {
            401 | 403 => Err(ModelError::Unauthorized),
            429 => {
                let retry_after = parse_retry_hint(&response.text().await.unwrap_or_default());
                Err(ModelError::RateLimited { retry_after })
            }
            s if !status.is_success() => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unable to read body".to_string());
                Err(ModelError::Api { status: s, message })
            }
            _ => {
                let value: Value = response
                    .json()
                    .await
                    .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;
                Ok(value)
            }
        }
    }
}

/// Provider-suggested retry delay, e.g. `"retryDelay": "17s"` in the 429 body
fn parse_retry_hint(body: &str) -> Option<Duration> {
    let value: Value = serde_json::from_str(body).ok()?;
    let delay = find_retry_delay(&value)?;
    let seconds: u64 = delay.trim_end_matches('s').parse().ok()?;
    Some(Duration::from_secs(seconds))
}

fn find_retry_delay(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(s)) = map.get("retryDelay") {
                return Some(s);
            }
            map.values().find_map(find_retry_delay)
        }
        Value::Array(items) => items.iter().find_map(find_retry_delay),
        _ => None,
    }
}

/// Resilient wrapper around a backend: per-model exponential backoff and a
/// one-shot fallback to a higher-capacity model on rate limiting
pub struct ModelInvoker {
    backend: Arc<dyn GenerateBackend>,
    primary_model: String,
    fallback_model: String,
    retry: RetrySettings,
}

impl ModelInvoker {
    pub fn new(
        backend: Arc<dyn GenerateBackend>,
        primary_model: String,
        fallback_model: String,
        retry: RetrySettings,
    ) -> Self {
        Self {
            backend,
            primary_model,
            fallback_model,
            retry,
        }
    }

    /// Run one generation request against the primary model, falling back to
    /// the secondary model when the primary stays rate limited
    ///
    /// Any error other than rate limiting is returned immediately without
    /// touching the fallback model.
    pub async fn invoke(&self, prompt: &str, schema: &Value) -> Result<Value, ModelError> {
        match self.call_with_backoff(&self.primary_model, prompt, schema).await {
            Ok(value) => Ok(value),
            Err(err) if err.is_rate_limit() => {
                warn!(
                    "Primary model {} rate limited, falling back to {}",
                    self.primary_model, self.fallback_model
                );
                self.call_with_backoff(&self.fallback_model, prompt, schema)
                    .await
            }
            Err(err) => {
                error!("Model {} failed without retry: {}", self.primary_model, err);
                Err(err.with_model(&self.primary_model))
            }
        }
    }

    /// Exponential backoff loop for a single model: base delay doubling per
    /// attempt with random jitter; a provider retry hint takes precedence
    async fn call_with_backoff(
        &self,
        model: &str,
        prompt: &str,
        schema: &Value,
    ) -> Result<Value, ModelError> {
        let mut attempt = 0u32;

        loop {
            match self.backend.generate(model, prompt, schema).await {
                Ok(value) => return Ok(value),
                Err(ModelError::RateLimited { retry_after }) => {
                    attempt += 1;
                    if attempt >= self.retry.max_attempts {
                        return Err(ModelError::RateLimited { retry_after });
                    }

                    let backoff = Duration::from_millis(
                        self.retry.base_delay_ms * 2u64.pow(attempt - 1),
                    );
                    let jitter =
                        Duration::from_millis(rand::thread_rng().gen_range(0..=250));
                    let delay = retry_after.unwrap_or(backoff) + jitter;

                    warn!(
                        "Model {} rate limited (attempt {}/{}), retrying in {:?}",
                        model, attempt, self.retry.max_attempts, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Scripted backend returning queued results in order
    struct ScriptedBackend {
        script: Mutex<Vec<Result<Value, ModelError>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Result<Value, ModelError>>) -> Self {
            Self {
                script: Mutex::new(script),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerateBackend for ScriptedBackend {
        async fn generate(
            &self,
            model: &str,
            _prompt: &str,
            _schema: &Value,
        ) -> Result<Value, ModelError> {
            self.calls.lock().unwrap().push(model.to_string());
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                return Ok(json!({"ok": true}));
            }
            script.remove(0)
        }
    }

    fn fast_retry() -> RetrySettings {
        RetrySettings {
            max_attempts: 2,
            base_delay_ms: 1,
        }
    }

    fn invoker(backend: Arc<ScriptedBackend>) -> ModelInvoker {
        ModelInvoker::new(
            backend,
            "primary".to_string(),
            "fallback".to_string(),
            fast_retry(),
        )
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(json!({"ok": 1}))]));
        let result = invoker(backend.clone())
            .invoke("prompt", &json!({}))
            .await
            .unwrap();

        assert_eq!(result["ok"], 1);
        assert_eq!(backend.calls(), vec!["primary"]);
    }

    #[tokio::test]
    async fn test_rate_limit_falls_back_to_secondary() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(ModelError::RateLimited { retry_after: None }),
            Err(ModelError::RateLimited { retry_after: None }),
            Ok(json!({"from": "fallback"})),
        ]));

        let result = invoker(backend.clone())
            .invoke("prompt", &json!({}))
            .await
            .unwrap();

        assert_eq!(result["from"], "fallback");
        assert_eq!(backend.calls(), vec!["primary", "primary", "fallback"]);
    }

    #[tokio::test]
    async fn test_non_retryable_error_not_retried() {
        let backend = Arc::new(ScriptedBackend::new(vec![Err(ModelError::Unauthorized)]));

        let err = invoker(backend.clone())
            .invoke("prompt", &json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, ModelError::Unauthorized));
        assert_eq!(backend.calls(), vec!["primary"]);
    }

    #[tokio::test]
    async fn test_api_error_names_failing_model() {
        let backend = Arc::new(ScriptedBackend::new(vec![Err(ModelError::Api {
            status: 500,
            message: "internal failure".to_string(),
        })]));

        let err = invoker(backend.clone())
            .invoke("prompt", &json!({}))
            .await
            .unwrap_err();

        match err {
            ModelError::Api { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("primary"));
                assert!(message.contains("internal failure"));
            }
            other => panic!("expected api error, got {other:?}"),
        }
        assert_eq!(backend.calls(), vec!["primary"]);
    }

    #[tokio::test]
    async fn test_both_models_exhausted() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(ModelError::RateLimited { retry_after: None }),
            Err(ModelError::RateLimited { retry_after: None }),
            Err(ModelError::RateLimited { retry_after: None }),
            Err(ModelError::RateLimited { retry_after: None }),
        ]));

        let err = invoker(backend.clone())
            .invoke("prompt", &json!({}))
            .await
            .unwrap_err();

        assert!(err.is_rate_limit());
        assert_eq!(
            backend.calls(),
            vec!["primary", "primary", "fallback", "fallback"]
        );
    }

    #[test]
    fn test_parse_retry_hint() {
        let body = r#"{"error":{"details":[{"retryDelay":"17s"}]}}"#;
        assert_eq!(parse_retry_hint(body), Some(Duration::from_secs(17)));

        assert_eq!(parse_retry_hint("not json"), None);
        assert_eq!(parse_retry_hint(r#"{"error":"plain"}"#), None);
    }

    #[tokio::test]
    async fn test_gemini_client_surfaces_rate_limit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/test-model:generateContent")
            .with_status(429)
            .with_body(r#"{"error":{"details":[{"retryDelay":"2s"}]}}"#)
            .create_async()
            .await;

        let client = GeminiClient::new(
            server.url(),
            "test-key".to_string(),
            SamplingSettings::default(),
        );

        let err = client
            .generate("test-model", "prompt", &json!({}))
            .await
            .unwrap_err();

        mock.assert_async().await;
        match err {
            ModelError::RateLimited { retry_after } => {
                assert_eq!(retry_after, Some(Duration::from_secs(2)));
            }
            other => panic!("expected rate limit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_gemini_client_success() {
        let mut server = mockito::Server::new_async().await;
        let payload = r#"{"candidates":[{"content":{"parts":[{"text":"{}"}]}}]}"#;
        let mock = server
            .mock("POST", "/models/test-model:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(payload)
            .create_async()
            .await;

        let client = GeminiClient::new(
            server.url(),
            "test-key".to_string(),
            SamplingSettings::default(),
        );

        let value = client
            .generate("test-model", "prompt", &json!({}))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(value["candidates"].is_array());
    }

    #[tokio::test]
    async fn test_gemini_client_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/test-model:generateContent")
            .with_status(401)
            .create_async()
            .await;

        let client = GeminiClient::new(
            server.url(),
            "bad-key".to_string(),
            SamplingSettings::default(),
        );

        let err = client
            .generate("test-model", "prompt", &json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, ModelError::Unauthorized));
    }
}
