//! Generative service client.
//!
//! The composer talks to the text-generation backend only through
//! [`GenerativeClient`]. [`HttpGenerativeClient`] speaks the OpenAI-compatible
//! chat completions protocol.

use crate::config::GenerationConfig;
use crate::error::ClientError;
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Collaborator that turns a two-part prompt into raw reply text
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    async fn generate(&self, system_text: &str, user_text: &str) -> Result<String, ClientError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    response_format: ResponseFormat,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completions client
pub struct HttpGenerativeClient {
    http_client: ReqwestClient,
    base_url: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
}

impl HttpGenerativeClient {
    /// Build a client; a missing `api_key` only fails at call time
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        temperature: f32,
        call_timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http_client = ReqwestClient::builder()
            .timeout(call_timeout)
            .build()
            .map_err(|e| ClientError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            temperature,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Build from configuration, reading the key from `api_key_env`
    pub fn from_config(config: &GenerationConfig) -> Result<Self, ClientError> {
        let api_key = std::env::var(&config.api_key_env).ok();
        if api_key.is_none() {
            tracing::debug!("{} is not set; generation will fall back", config.api_key_env);
        }
        Self::new(
            config.base_url.clone(),
            config.model.clone(),
            api_key,
            config.temperature,
            Duration::from_secs(config.call_timeout_secs),
        )
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl GenerativeClient for HttpGenerativeClient {
    async fn generate(&self, system_text: &str, user_text: &str) -> Result<String, ClientError> {
        let api_key = self.api_key.as_deref().ok_or(ClientError::MissingCredential)?;

        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_text,
                },
                ChatMessage {
                    role: "user",
                    content: user_text,
                },
            ],
        };

        tracing::debug!("Requesting generation from {} ({})", self.base_url, self.model);
        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error response".to_string());
            let message: String = body.chars().take(200).collect();
            return Err(ClientError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Decoding(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ClientError::InvalidResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, key: Option<&str>) -> HttpGenerativeClient {
        HttpGenerativeClient::new(
            format!("{}/v1/", server.uri()),
            "test-model",
            key.map(str::to_string),
            0.2,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_successful_generation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "response_format": {"type": "json_object"},
                "messages": [
                    {"role": "system", "content": "be a coach"},
                    {"role": "user", "content": "plan please"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "{\"title\": \"x\"}"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client(&server, Some("test-key"))
            .generate("be a coach", "plan please")
            .await
            .unwrap();
        assert_eq!(reply, "{\"title\": \"x\"}");
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server, None).generate("s", "u").await.unwrap_err();
        assert_eq!(err, ClientError::MissingCredential);
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_http_errors_carry_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let err = client(&server, Some("k")).generate("s", "u").await.unwrap_err();
        assert_eq!(
            err,
            ClientError::Http {
                status: 500,
                message: "upstream exploded".into()
            }
        );
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_unauthorized_is_permanent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = client(&server, Some("k")).generate("s", "u").await.unwrap_err();
        assert!(matches!(err, ClientError::Http { status: 401, .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_empty_or_malformed_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer empty"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer garbled"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let empty = client(&server, Some("empty")).generate("s", "u").await.unwrap_err();
        assert_eq!(empty, ClientError::InvalidResponse);

        let garbled = client(&server, Some("garbled")).generate("s", "u").await.unwrap_err();
        assert!(matches!(garbled, ClientError::Decoding(_)));
    }
}
