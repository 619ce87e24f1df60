//! OpenAI-compatible chat completion client.
//!
//! Only the subset needed to ask for a short piece of text is implemented:
//! one request, one choice, no streaming.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the chat completion API.
#[derive(Debug, Error)]
pub enum AiError {
    /// The request could not be sent or the body could not be read.
    #[error("chat completion request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with an error.
    #[error("chat completion API error ({status}): {message}")]
    Api {
        /// HTTP status.
        status: reqwest::StatusCode,
        /// Error message from the response body.
        message: String,
    },

    /// The response body was not a chat completion.
    #[error("failed to parse chat completion response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The model returned no text.
    #[error("chat completion returned an empty response")]
    EmptyResponse,
}

/// Chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    /// Create a client for the default endpoint and model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set a custom base URL (proxies and compatible providers).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the configured model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask for a completion and return the trimmed text of the first choice.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API reports an error, or
    /// the answer is empty.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, AiError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map_or_else(|_| body.chars().take(500).collect(), |e| e.error.message);
            return Err(AiError::Api { status, message });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AiError::EmptyResponse);
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_message_roles_serialize_lowercase() {
        let json = serde_json::to_value(ChatMessage::system("be brief")).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "be brief");
    }

    #[test]
    fn test_debug_hides_key() {
        let client = ChatClient::new("sk-secret");
        assert!(!format!("{client:?}").contains("sk-secret"));
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(bearer_token("sk-test"))
            .and(body_partial_json(serde_json::json!({"model": "tiny"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "  Quiet day.  "}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ChatClient::new("sk-test")
            .with_base_url(format!("{}/", server.uri()))
            .with_model("tiny");
        let text = client
            .complete(&[ChatMessage::user("hi")], 0.3, 100)
            .await
            .unwrap();

        assert_eq!(text, "Quiet day.");
    }

    #[tokio::test]
    async fn test_complete_empty_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let client = ChatClient::new("k").with_base_url(server.uri());
        let err = client.complete(&[], 0.3, 100).await.unwrap_err();

        assert!(matches!(err, AiError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_complete_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"message": "rate limited", "type": "requests"}
            })))
            .mount(&server)
            .await;

        let client = ChatClient::new("k").with_base_url(server.uri());
        let err = client.complete(&[], 0.3, 100).await.unwrap_err();

        match err {
            AiError::Api { status, message } => {
                assert_eq!(status.as_u16(), 429);
                assert_eq!(message, "rate limited");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
