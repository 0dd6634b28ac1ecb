//! OpenAI-compatible Chat Completions provider (Groq, OpenAI, OpenRouter, Ollama)

use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest_eventsource::{Event, EventSource};
use serde::{Deserialize, Serialize};

use super::LlmProvider;
use crate::{
    error::{Error, Result},
    stream::{MessageEvent, MessageEventStream},
    types::{AiMetadata, Context, Message, Model, StopReason, StreamOptions, Usage},
};

/// OpenAI-compatible API client
pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl OpenAIProvider {
    /// Create a new provider with an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: Some(api_key.into()),
        }
    }

    /// Create a provider for endpoints that need no key (local Ollama)
    pub fn without_key() -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: None,
        }
    }

    fn build_request(
        &self,
        model: &Model,
        context: &Context,
        options: &StreamOptions,
    ) -> OpenAIRequest {
        let mut messages = Vec::new();

        if let Some(ref system_prompt) = context.system_prompt {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: system_prompt.clone(),
            });
        }

        for msg in &context.messages {
            messages.push(convert_message(msg));
        }

        OpenAIRequest {
            model: model.id.clone(),
            messages,
            stream: true,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            stop: if options.stop_sequences.is_empty() {
                None
            } else {
                Some(options.stop_sequences.clone())
            },
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    async fn stream(
        &self,
        model: &Model,
        context: &Context,
        options: &StreamOptions,
    ) -> Result<MessageEventStream> {
        if model.base_url.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "model {} has no base URL",
                model.id
            )));
        }

        let request = self.build_request(model, context, options);
        let url = format!("{}/chat/completions", model.base_url.trim_end_matches('/'));

        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(ref api_key) = self.api_key {
            let value = format!("Bearer {}", api_key)
                .parse::<reqwest::header::HeaderValue>()
                .map_err(|_| Error::InvalidApiKey)?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        for (key, value) in &model.headers {
            if let (Ok(name), Ok(val)) = (
                key.parse::<reqwest::header::HeaderName>(),
                value.parse::<reqwest::header::HeaderValue>(),
            ) {
                headers.insert(name, val);
            }
        }

        tracing::debug!(
            model = %model.id,
            messages = request.messages.len(),
            "sending chat completion request"
        );

        let request_builder = self.client.post(&url).headers(headers).json(&request);

        let event_source = EventSource::new(request_builder)
            .map_err(|e| Error::Sse(format!("Failed to create event source: {}", e)))?;

        Ok(Box::pin(create_stream(event_source, model.clone())))
    }
}

fn convert_message(msg: &Message) -> OpenAIMessage {
    match msg {
        Message::Human { content } => OpenAIMessage {
            role: "user".to_string(),
            content: content.clone(),
        },
        Message::Ai { content, .. } => OpenAIMessage {
            role: "assistant".to_string(),
            content: content.clone(),
        },
    }
}

fn create_stream(
    mut event_source: EventSource,
    model: Model,
) -> impl futures::Stream<Item = MessageEvent> {
    stream! {
        let mut accumulated_text = String::new();
        let mut finish_reason: Option<String> = None;
        let mut usage = Usage::default();

        let start_message = Message::Ai {
            content: String::new(),
            metadata: AiMetadata {
                provider: Some(model.provider),
                model: Some(model.id.clone()),
                ..Default::default()
            },
        };
        yield MessageEvent::Start { message: start_message };

        while let Some(event) = event_source.next().await {
            match event {
                Ok(Event::Open) => {}
                Ok(Event::Message(msg)) => {
                    if msg.data == "[DONE]" {
                        break;
                    }

                    let chunk: std::result::Result<StreamChunk, _> =
                        serde_json::from_str(&msg.data);
                    match chunk {
                        Ok(chunk) => {
                            for choice in &chunk.choices {
                                if let Some(ref content) = choice.delta.content {
                                    if !content.is_empty() {
                                        accumulated_text.push_str(content);
                                        yield MessageEvent::TextDelta {
                                            delta: content.clone(),
                                        };
                                    }
                                }

                                if let Some(ref reason) = choice.finish_reason {
                                    finish_reason = Some(reason.clone());
                                }
                            }

                            if let Some(ref stream_usage) = chunk.usage {
                                usage.input = stream_usage.prompt_tokens;
                                usage.output = stream_usage.completion_tokens;
                            }
                        }
                        Err(e) => {
                            event_source.close();
                            yield MessageEvent::Error {
                                message: format!("Failed to parse chunk: {}", e),
                            };
                            return;
                        }
                    }
                }
                Err(reqwest_eventsource::Error::StreamEnded) => break,
                Err(reqwest_eventsource::Error::InvalidStatusCode(status, response)) => {
                    event_source.close();
                    let body = response.text().await.unwrap_or_default();
                    yield MessageEvent::Error {
                        message: Error::from_status(status.as_u16(), body).to_string(),
                    };
                    return;
                }
                Err(e) => {
                    event_source.close();
                    yield MessageEvent::Error {
                        message: format!("SSE error: {}", e),
                    };
                    return;
                }
            }
        }
        event_source.close();

        let stop_reason = match finish_reason.as_deref() {
            Some("length") => StopReason::Length,
            Some("content_filter") => StopReason::ContentFilter,
            _ => StopReason::Stop,
        };

        let final_message = Message::Ai {
            content: accumulated_text,
            metadata: AiMetadata {
                provider: Some(model.provider),
                model: Some(model.id.clone()),
                usage: usage.clone(),
                stop_reason: Some(stop_reason),
                timestamp: chrono::Utc::now().timestamp_millis(),
            },
        };

        yield MessageEvent::Done {
            message: final_message,
            stop_reason,
            usage,
        };
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

// Streaming response types

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    usage: Option<StreamUsage>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Provider;

    fn test_model() -> Model {
        Model {
            id: "openai/gpt-oss-120b".into(),
            name: "GPT OSS 120B".into(),
            provider: Provider::Groq,
            base_url: "http://localhost".into(),
            context_window: 131072,
            max_tokens: 8192,
            headers: Default::default(),
        }
    }

    #[test]
    fn test_build_request_maps_roles() {
        let provider = OpenAIProvider::new("key");
        let mut context = Context::from_messages(vec![
            Message::human("hello"),
            Message::ai("hi there"),
        ]);
        context.system_prompt = Some("be brief".into());
        let options = StreamOptions {
            temperature: Some(0.6),
            ..Default::default()
        };

        let request = provider.build_request(&test_model(), &context, &options);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "openai/gpt-oss-120b");
        assert_eq!(json["stream"], true);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert_eq!(json["messages"][2]["role"], "assistant");
        assert!((json["temperature"].as_f64().unwrap() - 0.6).abs() < 1e-6);
        assert!(json.get("max_tokens").is_none());
        assert!(json.get("stop").is_none());
    }

    #[test]
    fn test_parse_stream_chunk() {
        let data = r#"{"choices":[{"delta":{"content":"Akwaaba"},"finish_reason":null}]}"#;
        let chunk: StreamChunk = serde_json::from_str(data).unwrap();
        assert_eq!(chunk.choices[0].delta.content.as_deref(), Some("Akwaaba"));
        assert!(chunk.usage.is_none());
    }

    #[tokio::test]
    async fn test_stream_rejects_missing_base_url() {
        let provider = OpenAIProvider::without_key();
        let mut model = test_model();
        model.base_url.clear();
        let result = provider
            .stream(&model, &Context::default(), &StreamOptions::default())
            .await;
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
