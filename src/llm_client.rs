use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::AnthropicConfig;

pub type SharedLlmClient = Arc<dyn LlmClient>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One exchanged message, in the shape the Messages API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
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

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub messages: Vec<ConversationTurn>,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub model: String,
    pub usage: TokenUsage,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<Completion>;

    fn provider_label(&self) -> &'static str;
}

/// Offline stand-in that echoes the latest user turn back.
#[derive(Debug, Default, Clone)]
pub struct EchoLlmClient;

#[async_trait]
impl LlmClient for EchoLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<Completion> {
        let prompt = request
            .messages
            .iter()
            .rev()
            .find(|turn| turn.role == Role::User)
            .map(|turn| turn.content.as_str())
            .unwrap_or_default();

        Ok(Completion {
            text: format!(
                "[offline response]\nI received: {prompt}\nNext step: set ANTHROPIC_API_KEY to reach Claude."
            ),
            model: "echo".to_string(),
            usage: TokenUsage::default(),
        })
    }

    fn provider_label(&self) -> &'static str {
        "Offline echo"
    }
}

impl EchoLlmClient {
    pub fn shared() -> SharedLlmClient {
        Arc::new(Self)
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [ConversationTurn],
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    model: String,
    #[serde(default)]
    usage: TokenUsage,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Client for Anthropic's Messages API.
pub struct AnthropicLlmClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl AnthropicLlmClient {
    const API_VERSION: &'static str = "2023-06-01";

    pub fn from_config(config: &AnthropicConfig) -> anyhow::Result<Self> {
        let api_key = if config.has_api_key() {
            config.api_key.clone()
        } else {
            None
        };

        let mut builder = reqwest::Client::builder();
        if let Some(timeout_ms) = config.http_timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            endpoint: format!("{}/v1/messages", config.base_url.trim_end_matches('/')),
        })
    }

    pub fn shared_from_config(config: &AnthropicConfig) -> anyhow::Result<SharedLlmClient> {
        Ok(Arc::new(Self::from_config(config)?))
    }

    fn request_body<'a>(&'a self, request: &'a CompletionRequest) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: &request.messages,
        }
    }
}

#[async_trait]
impl LlmClient for AnthropicLlmClient {
    #[instrument(level = "debug", skip_all, fields(model = %self.model, turns = request.messages.len()))]
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<Completion> {
        let Some(api_key) = self.api_key.as_deref() else {
            bail!("Set ANTHROPIC_API_KEY to use the Anthropic client");
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .header("anthropic-version", Self::API_VERSION)
            .json(&self.request_body(request))
            .send()
            .await
            .context("Anthropic request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Anthropic API error {status}: {body}");
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .context("Failed to parse Anthropic response")?;

        let text = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");
        if text.is_empty() {
            bail!("Anthropic response did not contain any text content");
        }

        debug!(
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "Anthropic completion received"
        );

        Ok(Completion {
            text,
            model: parsed.model,
            usage: parsed.usage,
        })
    }

    fn provider_label(&self) -> &'static str {
        "Anthropic Claude"
    }
}

/// Build the Anthropic client. Without an API key the client still builds and
/// fails per call, unless `default_to_echo` swaps in the echo client.
pub fn build_llm_client(
    config: &AnthropicConfig,
    default_to_echo: bool,
) -> anyhow::Result<SharedLlmClient> {
    if default_to_echo && !config.has_api_key() {
        tracing::warn!("ANTHROPIC_API_KEY missing; falling back to EchoLlmClient");
        return Ok(EchoLlmClient::shared());
    }

    AnthropicLlmClient::shared_from_config(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(base_url: &str) -> AnthropicConfig {
        AnthropicConfig {
            api_key: Some("sk-ant-test".to_string()),
            model: "claude-sonnet-4-20250514".to_string(),
            base_url: base_url.to_string(),
            http_timeout_ms: Some(5_000),
        }
    }

    fn hello_request() -> CompletionRequest {
        CompletionRequest {
            system: "You are PULSE.".to_string(),
            messages: vec![ConversationTurn::user("hello")],
            max_tokens: 4096,
        }
    }

    #[test]
    fn request_body_keeps_system_prompt_top_level() {
        let client = AnthropicLlmClient::from_config(&test_config("http://localhost")).unwrap();
        let request = CompletionRequest {
            system: "Be direct.".to_string(),
            messages: vec![
                ConversationTurn::user("Hello"),
                ConversationTurn::assistant("Hi"),
                ConversationTurn::user("Status?"),
            ],
            max_tokens: 8192,
        };

        let json = serde_json::to_value(client.request_body(&request)).unwrap();
        assert_eq!(json["model"], "claude-sonnet-4-20250514");
        assert_eq!(json["system"], "Be direct.");
        assert_eq!(json["max_tokens"], 8192);

        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "Hello");
        assert_eq!(messages[1]["role"], "assistant");
        assert!(messages.iter().all(|m| m["role"] != "system"));
    }

    #[tokio::test]
    async fn missing_api_key_fails_each_call_not_construction() {
        let config = AnthropicConfig::default();
        let client = build_llm_client(&config, false).unwrap();
        assert_eq!(client.provider_label(), "Anthropic Claude");

        let err = client.complete(&hello_request()).await.unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));

        let blank = AnthropicConfig {
            api_key: Some("  ".to_string()),
            ..AnthropicConfig::default()
        };
        let client = AnthropicLlmClient::from_config(&blank).unwrap();
        assert!(client.complete(&hello_request()).await.is_err());

        let fallback = build_llm_client(&config, true).unwrap();
        assert_eq!(fallback.provider_label(), "Offline echo");
    }

    #[tokio::test]
    async fn completes_against_messages_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "sk-ant-test")
            .match_header("anthropic-version", "2023-06-01")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "id": "msg_01",
                    "type": "message",
                    "role": "assistant",
                    "model": "claude-sonnet-4-20250514",
                    "content": [
                        {"type": "text", "text": "PULSE online. "},
                        {"type": "text", "text": "Ready."}
                    ],
                    "stop_reason": "end_turn",
                    "usage": {"input_tokens": 12, "output_tokens": 30}
                }"#,
            )
            .create_async()
            .await;

        let client = AnthropicLlmClient::from_config(&test_config(&server.url())).unwrap();
        let completion = client.complete(&hello_request()).await.unwrap();

        assert_eq!(completion.text, "PULSE online. Ready.");
        assert_eq!(completion.model, "claude-sonnet-4-20250514");
        assert_eq!(completion.usage.total(), 42);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_error_carries_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(401)
            .with_body(r#"{"type":"error","error":{"type":"authentication_error"}}"#)
            .create_async()
            .await;

        let client = AnthropicLlmClient::from_config(&test_config(&server.url())).unwrap();
        let err = client.complete(&hello_request()).await.unwrap_err();
        let message = format!("{err:#}");

        assert!(message.contains("401"));
        assert!(message.contains("authentication_error"));
    }

    #[tokio::test]
    async fn empty_content_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"model":"claude-sonnet-4-20250514","content":[],"usage":{"input_tokens":1,"output_tokens":0}}"#)
            .create_async()
            .await;

        let client = AnthropicLlmClient::from_config(&test_config(&server.url())).unwrap();
        assert!(client.complete(&hello_request()).await.is_err());
    }

    #[tokio::test]
    async fn echo_client_returns_latest_user_turn() {
        let request = CompletionRequest {
            system: String::new(),
            messages: vec![
                ConversationTurn::user("first"),
                ConversationTurn::assistant("ack"),
                ConversationTurn::user("second"),
            ],
            max_tokens: 16,
        };

        let completion = EchoLlmClient.complete(&request).await.unwrap();
        assert!(completion.text.contains("I received: second"));
        assert_eq!(completion.usage.total(), 0);
    }
}
