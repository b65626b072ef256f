//! Analysis gateway: the language-model service that turns an assembled
//! context into commentary.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::data_fetcher::api::create_http_client_with_timeout;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A completion service. Output is returned as-is; callers parse it.
pub trait AnalysisGateway: Send + Sync {
    fn complete(
        &self,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<String, AppError>> + Send;
}

#[derive(Debug, Clone, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct CompletionChoice {
    message: ChatMessage,
}

/// Client for OpenAI-compatible `/chat/completions` endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiGateway {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl OpenAiGateway {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        if api_key.trim().is_empty() {
            return Err(AppError::config_error("Analysis gateway API key is empty"));
        }
        Ok(Self {
            http: create_http_client_with_timeout(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Builds the client from config; the key must come from the environment.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let api_key = config.llm_api_key.as_deref().ok_or_else(|| {
            AppError::config_error(format!(
                "{} is not set; it is required for analysis",
                crate::constants::env_vars::LLM_API_KEY
            ))
        })?;
        Self::new(
            &config.llm_base_url,
            &config.llm_model,
            api_key,
            Duration::from_secs(config.http_timeout_seconds),
        )
    }
}

impl AnalysisGateway for OpenAiGateway {
    #[instrument(skip(self, messages), fields(model = %self.model, messages = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AppError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = CompletionRequest {
            model: &self.model,
            messages,
            temperature: 0.7,
        };

        debug!("Sending completion request");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::network_timeout(&url)
                } else {
                    AppError::ApiFetch(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Analysis gateway error: {} - {}", status, body);
            return Err(AppError::analysis_error(format!(
                "completion request failed with {status}: {body}"
            )));
        }

        let completion: CompletionResponse = response.json().await.map_err(|e| {
            AppError::analysis_error(format!("failed to parse completion response: {e}"))
        })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AppError::analysis_error("completion response has no choices"))?;

        debug!("Completion received: {} chars", content.len());
        Ok(content)
    }
}

/// Removes a leading ```` ```json ```` / ```` ``` ```` fence and a trailing
/// ```` ``` ```` from model output.
pub fn strip_code_fences(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    text = text.trim_start();
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{}\n```  "), "{}");
        assert_eq!(strip_code_fences("  {\"plain\": true} "), "{\"plain\": true}");
        assert_eq!(strip_code_fences("```json{}"), "{}");
    }

    #[test]
    fn test_roles_serialize_lowercase() {
        let value = serde_json::to_value(ChatMessage::assistant("hi")).unwrap();
        assert_eq!(value, json!({"role": "assistant", "content": "hi"}));
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let config = Config::default();
        assert!(matches!(
            OpenAiGateway::from_config(&config),
            Err(AppError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Over looks good"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway =
            OpenAiGateway::new(&server.uri(), "test-model", "test-key", Duration::from_secs(5))
                .unwrap();
        let reply = gateway
            .complete(&[ChatMessage::user("Analyze")])
            .await
            .unwrap();
        assert_eq!(reply, "Over looks good");
    }

    #[tokio::test]
    async fn test_error_status_is_analysis_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let gateway =
            OpenAiGateway::new(&server.uri(), "test-model", "wrong", Duration::from_secs(5))
                .unwrap();
        let result = gateway.complete(&[ChatMessage::user("Analyze")]).await;
        assert!(matches!(result, Err(AppError::Analysis(message)) if message.contains("bad key")));
    }
}
