//! Chat model abstraction used by the orchestrator

use std::sync::Arc;

use async_trait::async_trait;
use kasa_ai::{
    Context, Message, Model, StreamOptions, providers::LlmProvider, stream::collect_message,
};

use crate::error::Result;

/// Fixed sampling temperature for every model call
pub const TEMPERATURE: f32 = 0.6;

/// A chat model that turns an ordered message list into one reply
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a reply to the conversation
    async fn invoke(&self, messages: &[Message]) -> Result<Message>;

    /// Generate a reply to a single standalone prompt
    async fn invoke_prompt(&self, prompt: &str) -> Result<Message> {
        self.invoke(&[Message::human(prompt)]).await
    }
}

/// Chat model backed by a streaming provider
pub struct ProviderChatModel {
    provider: Arc<dyn LlmProvider>,
    model: Model,
    options: StreamOptions,
}

impl ProviderChatModel {
    /// Create a chat model with the fixed temperature
    pub fn new(provider: Arc<dyn LlmProvider>, model: Model) -> Self {
        Self {
            provider,
            model,
            options: StreamOptions {
                temperature: Some(TEMPERATURE),
                ..Default::default()
            },
        }
    }
}

#[async_trait]
impl ChatModel for ProviderChatModel {
    async fn invoke(&self, messages: &[Message]) -> Result<Message> {
        let context = Context::from_messages(messages.to_vec());
        let stream = self
            .provider
            .stream(&self.model, &context, &self.options)
            .await?;
        Ok(collect_message(stream).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kasa_ai::stream::{MessageEvent, MessageEventStream};
    use kasa_ai::{StopReason, Usage};
    use parking_lot::Mutex;

    /// Provider that records the request and replays a canned stream
    struct RecordingProvider {
        seen: Mutex<Vec<(usize, Option<f32>)>>,
        reply: &'static str,
    }

    #[async_trait]
    impl LlmProvider for RecordingProvider {
        async fn stream(
            &self,
            _model: &Model,
            context: &Context,
            options: &StreamOptions,
        ) -> kasa_ai::Result<MessageEventStream> {
            self.seen
                .lock()
                .push((context.messages.len(), options.temperature));
            let events = vec![
                MessageEvent::TextDelta {
                    delta: self.reply.to_string(),
                },
                MessageEvent::Done {
                    message: Message::ai(self.reply),
                    stop_reason: StopReason::Stop,
                    usage: Usage::default(),
                },
            ];
            Ok(Box::pin(futures::stream::iter(events)))
        }
    }

    #[tokio::test]
    async fn test_invoke_uses_fixed_temperature() {
        let provider = Arc::new(RecordingProvider {
            seen: Mutex::new(Vec::new()),
            reply: "Medaase",
        });
        let model = ProviderChatModel::new(provider.clone(), kasa_ai::models::default_model());

        let reply = model
            .invoke(&[Message::human("hello"), Message::ai("hi"), Message::human("thanks")])
            .await
            .unwrap();

        assert_eq!(reply.text(), "Medaase");
        let seen = provider.seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, 3);
        assert_eq!(seen[0].1, Some(TEMPERATURE));
    }

    #[tokio::test]
    async fn test_invoke_prompt_sends_single_message() {
        let provider = Arc::new(RecordingProvider {
            seen: Mutex::new(Vec::new()),
            reply: "summary",
        });
        let model = ProviderChatModel::new(provider.clone(), kasa_ai::models::default_model());

        model.invoke_prompt("summarize this").await.unwrap();
        assert_eq!(provider.seen.lock()[0].0, 1);
    }
}
