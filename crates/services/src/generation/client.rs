use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::GenerationConfig;
use crate::error::GenerationError;

/// Something that turns a prompt into a raw JSON document.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// # Errors
    ///
    /// Returns `GenerationError` when the backend cannot produce a response.
    async fn complete_json(&self, prompt: &str) -> Result<String, GenerationError>;
}

const SYSTEM_PROMPT: &str = "You are LearnFlow, a patient programming tutor. \
Reply with exactly one JSON object that follows the requested shape and nothing else.";

/// OpenAI-compatible `/chat/completions` backend in JSON mode.
#[derive(Clone)]
pub struct ChatCompletionsBackend {
    client: Client,
    config: GenerationConfig,
}

impl ChatCompletionsBackend {
    #[must_use]
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.as_str().trim_end_matches('/')
        )
    }
}

#[async_trait]
impl GenerationBackend for ChatCompletionsBackend {
    async fn complete_json(&self, prompt: &str) -> Result<String, GenerationError> {
        let payload = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.2,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        debug!(model = %self.config.model, "sending chat completion");
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("chat completion rate limited");
            return Err(GenerationError::RateLimited);
        }
        if !status.is_success() {
            warn!(status = %status, "chat completion failed");
            return Err(GenerationError::HttpStatus(status));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_owned())
            .filter(|content| !content.is_empty())
            .ok_or(GenerationError::EmptyResponse)?;

        Ok(content)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let backend = ChatCompletionsBackend::new(GenerationConfig {
            base_url: "http://localhost:8080/v1/".parse().unwrap(),
            api_key: "k".into(),
            model: "m".into(),
        });
        assert_eq!(backend.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn request_uses_json_mode() {
        let payload = ChatRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.2,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["messages"][0]["content"], "hi");
    }
}
