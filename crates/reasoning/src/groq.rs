//! Groq chat-completions client (OpenAI-compatible wire format).

use std::time::Duration;

use async_trait::async_trait;
use insight_core::config::LlmConfig;
use insight_core::types::{Segment, SignalSet};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ReasoningError;
use crate::explainer::Explainer;
use crate::prompt;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatContent,
}

#[derive(Debug, Deserialize)]
struct ChatContent {
    #[serde(default)]
    content: Option<String>,
}

pub struct GroqExplainer {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GroqExplainer {
    /// Fails when no API key is configured or exported as `GROQ_API_KEY`.
    pub fn new(config: &LlmConfig) -> Result<Self, ReasoningError> {
        let api_key = config.resolved_api_key().ok_or_else(|| {
            ReasoningError::Configuration("GROQ_API_KEY not set".to_string())
        })?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ReasoningError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        info!(
            endpoint = %config.endpoint,
            model = %config.model,
            "Groq explainer initialized"
        );

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl Explainer for GroqExplainer {
    async fn explain(
        &self,
        segment: Segment,
        signals: &SignalSet,
        domain: &str,
    ) -> Result<String, ReasoningError> {
        let user_prompt = prompt::build_user_prompt(segment, signals, domain);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt::SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(self.chat_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReasoningError::Api(format!("HTTP {status}: {body}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ReasoningError::InvalidResponse(e.to_string()))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ReasoningError::InvalidResponse("No choices in response".to_string()))?;

        debug!(segment = %segment, domain = %domain, chars = text.len(), "Explanation received");
        Ok(text.trim().to_string())
    }

    fn name(&self) -> &str {
        "groq"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_configuration_error() {
        let config = LlmConfig {
            api_key: String::new(),
            ..LlmConfig::default()
        };
        // Only meaningful when the host has no key exported.
        if std::env::var("GROQ_API_KEY").map(|k| k.is_empty()).unwrap_or(true) {
            assert!(matches!(
                GroqExplainer::new(&config),
                Err(ReasoningError::Configuration(_))
            ));
        }
    }

    #[test]
    fn test_chat_url_trims_trailing_slash() {
        let config = LlmConfig {
            api_key: "test-key".to_string(),
            endpoint: "https://api.groq.com/openai/v1/".to_string(),
            ..LlmConfig::default()
        };
        let explainer = GroqExplainer::new(&config).unwrap();
        assert_eq!(explainer.chat_url(), "https://api.groq.com/openai/v1/chat/completions");
        assert_eq!(explainer.name(), "groq");
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "llama-3.3-70b-versatile",
            messages: vec![ChatMessage {
                role: "system",
                content: prompt::SYSTEM_PROMPT,
            }],
            temperature: 0.3,
            max_tokens: 300,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama-3.3-70b-versatile");
        assert_eq!(json["max_tokens"], 300);
        assert_eq!(json["messages"][0]["role"], "system");
    }

    #[test]
    fn test_response_parsing() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"  Because.  "}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("  Because.  "));
    }
}
