//! OpenAI-compatible chat-completions client

use crate::types::{ApiError, CompletionRequest, CompletionResponse, Message};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scaffold_core::{ModelClient, ModelError, ModelRequest};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Public OpenAI endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Model used when neither the request nor the config names one
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Connection settings for a chat-completions service
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL up to and including the version segment
    pub base_url: String,
    /// Bearer token; local servers often need none
    pub api_key: Option<String>,
    pub model: String,
    /// Per-request timeout; unbounded when absent
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Completions URL, tolerant of a trailing slash on the base
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Failure building the HTTP client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),

    #[error("base URL must start with http:// or https://, got `{0}`")]
    BaseUrl(String),
}

/// [`ModelClient`] over `POST {base_url}/chat/completions`
///
/// Sends the stage's instruction text as the system message and its context
/// as the user message. One HTTP request per call, no retries.
pub struct ChatClient {
    http: Client,
    config: ClientConfig,
}

impl ChatClient {
    /// Build a client for the given service
    ///
    /// # Errors
    /// Returns an error if the base URL has no HTTP scheme or the TLS
    /// backend cannot be initialized.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
            return Err(ClientError::BaseUrl(config.base_url));
        }
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs.max(1)));
        }
        let http = builder.build()?;
        Ok(Self { http, config })
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn model_for<'a>(&'a self, request: &'a ModelRequest) -> &'a str {
        request
            .params
            .model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(&self.config.model)
    }
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ModelClient for ChatClient {
    async fn complete(&self, request: &ModelRequest) -> Result<String, ModelError> {
        let model = self.model_for(request);
        let body = CompletionRequest {
            model,
            messages: [Message::system(&request.system), Message::user(&request.prompt)],
            temperature: request.params.temperature,
            top_p: request.params.top_p,
            max_tokens: request.params.max_tokens,
        };

        tracing::debug!(
            stage = %request.stage,
            model,
            prompt_bytes = request.prompt.len(),
            "sending chat completion"
        );

        let mut builder = self.http.post(self.config.endpoint()).json(&body);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status, &text));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Provider(format!("unreadable completion: {e}")))?;
        let text = parsed.into_text().ok_or(ModelError::EmptyResponse)?;

        tracing::debug!(stage = %request.stage, reply_bytes = text.len(), "completion received");
        Ok(text)
    }
}

/// Prefer the service's own error message over the raw body
fn status_error(status: StatusCode, body: &str) -> ModelError {
    let body = serde_json::from_str::<ApiError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    ModelError::Status {
        status: status.as_u16(),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scaffold_core::{GenerationParams, StageId};

    fn request(model: Option<&str>) -> ModelRequest {
        ModelRequest {
            stage: StageId::Planner,
            system: "sys".to_string(),
            prompt: "ctx".to_string(),
            params: GenerationParams {
                model: model.map(str::to_string),
                temperature: 0.2,
                top_p: 0.9,
                max_tokens: 100,
            },
        }
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = ClientConfig::new().with_base_url("http://localhost:11434/v1/");
        assert_eq!(config.endpoint(), "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn debug_hides_the_key() {
        let config = ClientConfig::new().with_api_key("sk-secret");
        let shown = format!("{config:?}");
        assert!(shown.contains("[REDACTED]"));
        assert!(!shown.contains("sk-secret"));
    }

    #[test]
    fn request_model_overrides_default() {
        let client = ChatClient::new(ClientConfig::new().with_model("fallback")).unwrap();
        assert_eq!(client.model_for(&request(Some("gpt-4o"))), "gpt-4o");
        assert_eq!(client.model_for(&request(None)), "fallback");
        assert_eq!(client.model_for(&request(Some(" "))), "fallback");
    }

    #[test]
    fn base_url_needs_a_scheme() {
        let err = ChatClient::new(ClientConfig::new().with_base_url("localhost:8080")).unwrap_err();
        assert!(matches!(err, ClientError::BaseUrl(_)));
    }

    #[test]
    fn status_error_unwraps_api_message() {
        let err = status_error(
            StatusCode::UNAUTHORIZED,
            r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#,
        );
        assert!(matches!(
            err,
            ModelError::Status { status: 401, ref body } if body == "Incorrect API key provided"
        ));

        let err = status_error(StatusCode::BAD_GATEWAY, "upstream down\n");
        assert!(matches!(
            err,
            ModelError::Status { status: 502, ref body } if body == "upstream down"
        ));
    }

    #[test]
    fn config_reads_partial_toml_shape() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url": "http://127.0.0.1:8000/v1"}"#).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout_secs, None);
        assert!(config.api_key.is_none());
    }
}
