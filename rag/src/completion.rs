//! Chat-completion providers.
//!
//! [`CompletionProvider`] is the seam for everything that turns messages
//! into text: answers, fallbacks, emergency guidance, and rerank scoring.
//! [`OpenRouterClient`] speaks the OpenAI-compatible chat API, including
//! SSE streaming surfaced as a [`TokenStream`].

use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::RagError;
use crate::retry::RetryPolicy;
use crate::types::{ChatMessage, CompletionOptions};

/// Returned when a provider answers successfully but with no content.
pub const DEFAULT_RESPONSE: &str = "Unable to generate response";

/// Trait for chat-completion providers.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Run one completion and return the full response text.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: CompletionOptions,
    ) -> Result<String, RagError>;

    /// Run one completion, yielding tokens as they arrive. Dropping the
    /// stream cancels the underlying request.
    async fn complete_stream(
        &self,
        messages: &[ChatMessage],
        options: CompletionOptions,
    ) -> Result<TokenStream, RagError>;

    /// Models the backend currently serves.
    async fn list_models(&self) -> Result<Vec<String>, RagError>;

    /// Model used for completions.
    fn model_name(&self) -> &str;
}

/// Stream of response tokens pumped from the provider's SSE body.
pub struct TokenStream {
    receiver: mpsc::Receiver<Result<String, RagError>>,
    pump: tokio::task::JoinHandle<()>,
}

impl Stream for TokenStream {
    type Item = Result<String, RagError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}

impl Drop for TokenStream {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    /// Content can be null for some models.
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamResponse {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

/// Client for OpenRouter and other OpenAI-compatible chat endpoints.
pub struct OpenRouterClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    retry: RetryPolicy,
}

impl OpenRouterClient {
    /// # Arguments
    /// * `api_key` - Bearer token
    /// * `model` - Model identifier (e.g., "meta-llama/llama-3.1-70b-instruct")
    /// * `endpoint` - API base (defaults to "https://openrouter.ai/api/v1")
    pub fn new(api_key: String, model: String, endpoint: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.unwrap_or_else(|| "https://openrouter.ai/api/v1".to_string()),
            api_key,
            model,
            retry: RetryPolicy::default(),
        }
    }

    async fn send_chat(
        &self,
        messages: &[ChatMessage],
        options: CompletionOptions,
        stream: bool,
    ) -> Result<reqwest::Response, RagError> {
        let url = format!("{}/chat/completions", self.endpoint);
        let request = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            stream,
        };

        let response = self
            .retry
            .execute(|| {
                self.client
                    .post(&url)
                    .header("Authorization", format!("Bearer {}", self.api_key))
                    .json(&request)
                    .send()
            })
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&error_text)
                .map(|parsed| parsed.error.message)
                .unwrap_or(error_text);
            return Err(RagError::Completion(format!(
                "completion API error {status}: {message}"
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: CompletionOptions,
    ) -> Result<String, RagError> {
        let response = self.send_chat(messages, options, false).await?;
        let parsed: ChatResponse = response.json().await?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_else(|| DEFAULT_RESPONSE.to_string()))
    }

    async fn complete_stream(
        &self,
        messages: &[ChatMessage],
        options: CompletionOptions,
    ) -> Result<TokenStream, RagError> {
        let response = self.send_chat(messages, options, true).await?;

        let (sender, receiver) = mpsc::channel(32);
        let pump = tokio::spawn(async move {
            let mut bytes = response.bytes_stream();
            // SSE events can split across chunks, so lines are assembled
            // through a carry buffer.
            let mut buffer = String::new();

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(err) => {
                        let _ = sender.send(Err(RagError::Http(err))).await;
                        return;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&chunk));
                while let Some(newline) = buffer.find('\n') {
                    let line: String = buffer.drain(..=newline).collect();
                    let line = line.trim_end();

                    let Some(payload) = line.strip_prefix("data: ") else {
                        continue;
                    };
                    if payload == "[DONE]" {
                        return;
                    }

                    if let Ok(parsed) = serde_json::from_str::<StreamResponse>(payload) {
                        if let Some(token) = parsed
                            .choices
                            .first()
                            .and_then(|choice| choice.delta.content.clone())
                        {
                            if sender.send(Ok(token)).await.is_err() {
                                return;
                            }
                        }
                    }
                }
            }
        });

        Ok(TokenStream { receiver, pump })
    }

    async fn list_models(&self) -> Result<Vec<String>, RagError> {
        let url = format!("{}/models", self.endpoint);
        let response = self
            .retry
            .execute(|| {
                self.client
                    .get(&url)
                    .header("Authorization", format!("Bearer {}", self.api_key))
                    .send()
            })
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::Completion(format!(
                "completion API error {status}: {body}"
            )));
        }

        let parsed: ModelsResponse = response.json().await?;
        Ok(parsed.data.into_iter().map(|entry| entry.id).collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_omits_stream_when_false() {
        let messages = vec![ChatMessage::user("hello")];
        let request = ChatRequest {
            model: "test-model",
            messages: &messages,
            max_tokens: 1000,
            temperature: 0.2,
            stream: false,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("stream"));

        let request = ChatRequest { stream: true, ..request };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"stream\":true"));
    }

    #[test]
    fn test_chat_response_null_content() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }

    #[test]
    fn test_stream_delta_parse() {
        let parsed: StreamResponse =
            serde_json::from_str(r#"{"choices":[{"delta":{"content":"Call"}}]}"#).unwrap();
        assert_eq!(parsed.choices[0].delta.content.as_deref(), Some("Call"));

        let parsed: StreamResponse =
            serde_json::from_str(r#"{"choices":[{"delta":{}}]}"#).unwrap();
        assert!(parsed.choices[0].delta.content.is_none());
    }

    #[test]
    fn test_error_body_parse() {
        let parsed: ApiErrorResponse =
            serde_json::from_str(r#"{"error":{"message":"model overloaded"}}"#).unwrap();
        assert_eq!(parsed.error.message, "model overloaded");
    }

    #[test]
    fn test_default_endpoint() {
        let client = OpenRouterClient::new("key".to_string(), "m".to_string(), None);
        assert_eq!(client.endpoint, "https://openrouter.ai/api/v1");
        assert_eq!(client.model_name(), "m");
    }
}
