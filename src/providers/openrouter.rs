//! OpenRouter provider implementation for Teddy
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint; the defaults
//! point at OpenRouter. One POST per call, no retries.

use crate::config::ProviderConfig;
use crate::error::{Result, TeddyError};
use crate::providers::{ApiMessage, CompletionProvider, CompletionRequest, CompletionResult};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Chat-completion client for OpenRouter-compatible endpoints
///
/// # Examples
///
/// ```
/// use teddy::config::ProviderConfig;
/// use teddy::providers::OpenRouterProvider;
///
/// let provider = OpenRouterProvider::new(ProviderConfig::default()).unwrap();
/// assert_eq!(
///     provider.endpoint(),
///     "https://openrouter.ai/api/v1/chat/completions"
/// );
/// ```
pub struct OpenRouterProvider {
    client: Client,
    config: ProviderConfig,
}

/// Request body for `/chat/completions`
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage>,
}

/// Response body for `/chat/completions`
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenRouterProvider {
    /// Create a new provider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("teddy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TeddyError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized completion provider: base={}, model={}",
            config.api_base,
            config.model
        );

        if config.api_key.is_empty() {
            tracing::warn!("No API key configured; the endpoint will reject requests");
        }

        Ok(Self { client, config })
    }

    /// Full URL of the completion endpoint
    pub fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }

    /// Configured model identifier
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn classify_body(body: &str) -> CompletionResult {
        let parsed: ChatResponse = match serde_json::from_str(body) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::error!("Failed to parse completion response: {}", e);
                return CompletionResult::NetworkError {
                    cause: format!("Invalid completion response: {}", e),
                };
            }
        };

        let choices = parsed.choices.unwrap_or_default();
        if choices.len() > 1 {
            tracing::debug!("Discarding {} extra choices", choices.len() - 1);
        }

        match choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
        {
            Some(text) if !text.trim().is_empty() => CompletionResult::Success { text },
            _ => {
                tracing::warn!("No choices returned from completion endpoint");
                CompletionResult::EmptyChoice
            }
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterProvider {
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult {
        let url = self.endpoint();
        let body = ChatRequest {
            model: &self.config.model,
            messages: request.api_messages(),
        };

        tracing::debug!(
            "Sending completion request: url={}, messages={}",
            url,
            body.messages.len()
        );

        let response = match self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.title)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Completion request failed: {}", e);
                let cause = if e.is_timeout() {
                    format!("Request timed out after {}s", self.config.timeout_seconds)
                } else {
                    e.to_string()
                };
                return CompletionResult::NetworkError { cause };
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Failed to read completion response body: {}", e);
                return CompletionResult::NetworkError {
                    cause: format!("Failed to read response body: {}", e),
                };
            }
        };

        if !status.is_success() {
            tracing::error!("HTTP error! status: {}, body: {}", status, text);
            return CompletionResult::HttpError {
                status: status.as_u16(),
                body: text,
            };
        }

        Self::classify_body(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let config = ProviderConfig {
            api_base: "http://localhost:8080/v1/".to_string(),
            ..ProviderConfig::default()
        };
        let provider = OpenRouterProvider::new(config).unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_request_body_shape() {
        let request = CompletionRequest::new("prompt", &[crate::providers::Message::user("hi")]);
        let body = ChatRequest {
            model: "openchat/openchat-7b:free",
            messages: request.api_messages(),
        };
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "openchat/openchat-7b:free");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hi");
    }

    #[test]
    fn test_classify_first_choice_wins() {
        let body = r#"{"choices":[{"message":{"content":"first"}},{"message":{"content":"second"}}]}"#;
        assert_eq!(
            OpenRouterProvider::classify_body(body),
            CompletionResult::Success {
                text: "first".to_string()
            }
        );
    }

    #[test]
    fn test_classify_missing_choices() {
        assert_eq!(
            OpenRouterProvider::classify_body(r#"{"id":"gen-1"}"#),
            CompletionResult::EmptyChoice
        );
        assert_eq!(
            OpenRouterProvider::classify_body(r#"{"choices":null}"#),
            CompletionResult::EmptyChoice
        );
    }

    #[test]
    fn test_classify_blank_content() {
        let body = r#"{"choices":[{"message":{"content":"  "}}]}"#;
        assert_eq!(
            OpenRouterProvider::classify_body(body),
            CompletionResult::EmptyChoice
        );
    }

    #[test]
    fn test_classify_invalid_json() {
        assert!(matches!(
            OpenRouterProvider::classify_body("<html>oops</html>"),
            CompletionResult::NetworkError { .. }
        ));
    }
}
