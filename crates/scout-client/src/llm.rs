use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scout_core::config::DEFAULT_LLM_BASE_URL;
use scout_core::error::AppError;
use scout_core::traits::{Prompt, TextGenerator};
use serde::{Deserialize, Serialize};

const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(30);

/// OpenAI-compatible chat-completions client.
///
/// Defaults to Groq's endpoint; any server speaking the same protocol works
/// (OpenAI, a local Ollama, ...). Returns the first choice's text untouched,
/// fences included.
#[derive(Clone)]
pub struct OpenAiGenerator {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl OpenAiGenerator {
    pub fn new(api_key: &str, model: &str) -> Result<Self, AppError> {
        Self::with_base_url(api_key, model, DEFAULT_LLM_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, model: &str, base_url: &str) -> Result<Self, AppError> {
        Self::build(api_key, model, base_url, DEFAULT_LLM_TIMEOUT)
    }

    pub fn with_timeout(self, timeout: Duration) -> Result<Self, AppError> {
        Self::build(&self.api_key, &self.model, &self.base_url, timeout)
    }

    fn build(
        api_key: &str,
        model: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build LLM client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            timeout_secs: timeout.as_secs(),
        })
    }

    fn chat_request(&self, prompt: &Prompt) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: prompt.system.clone(),
                },
                Message {
                    role: "user".to_string(),
                    content: prompt.user.clone(),
                },
            ],
            max_tokens: prompt.max_tokens,
            temperature: prompt.temperature,
        }
    }
}

// ---- OpenAI API types ----

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Map a non-2xx completion response onto an error.
fn status_error(status_code: u16, body: &str) -> AppError {
    if status_code == 429 {
        return AppError::RateLimitExceeded;
    }
    let message = serde_json::from_str::<ApiError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| format!("HTTP {status_code}: {body}"));
    AppError::LlmError {
        message,
        status_code,
    }
}

/// First choice's content, or an error if the model said nothing.
fn first_content(response: ChatResponse) -> Result<String, AppError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::LlmError {
            message: "Empty response from LLM".into(),
            status_code: 200,
        })
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, AppError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = self.chat_request(prompt);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    AppError::NetworkError(format!("Connection failed: {e}"))
                } else {
                    AppError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::ParseError(format!("Failed to parse LLM response: {e}")))?;

        let content = first_content(chat_response)?;
        tracing::debug!(model = %self.model, chars = content.len(), "completion received");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> Prompt {
        Prompt {
            system: "You are a career data assistant.".to_string(),
            user: "List five Rust jobs.".to_string(),
            max_tokens: 4000,
            temperature: 0.7,
        }
    }

    #[test]
    fn request_carries_both_messages_and_sampling() {
        let generator =
            OpenAiGenerator::with_base_url("key", "llama-3.3-70b-versatile", "http://localhost/v1/")
                .unwrap();
        let body = serde_json::to_value(generator.chat_request(&prompt())).unwrap();

        assert_eq!(body["model"], "llama-3.3-70b-versatile");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "List five Rust jobs.");
        assert_eq!(body["max_tokens"], 4000);
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(generator.base_url, "http://localhost/v1");
    }

    #[test]
    fn rate_limit_status_maps_to_rate_limit_error() {
        assert!(matches!(
            status_error(429, "slow down"),
            AppError::RateLimitExceeded
        ));
    }

    #[test]
    fn api_error_message_is_extracted() {
        let err = status_error(401, r#"{"error":{"message":"Invalid API Key"}}"#);
        match err {
            AppError::LlmError {
                message,
                status_code,
            } => {
                assert_eq!(message, "Invalid API Key");
                assert_eq!(status_code, 401);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unstructured_error_body_is_kept() {
        let err = status_error(502, "Bad Gateway");
        assert!(err.to_string().contains("HTTP 502: Bad Gateway"));
    }

    #[test]
    fn first_choice_is_returned_verbatim() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"```json\n[]\n```"}},{"message":{"content":"ignored"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_content(response).unwrap(), "```json\n[]\n```");
    }

    #[test]
    fn empty_choices_are_an_error() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            first_content(response),
            Err(AppError::LlmError { status_code: 200, .. })
        ));
    }
}
