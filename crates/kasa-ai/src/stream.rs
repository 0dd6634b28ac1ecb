//! Streaming event types and utilities

use crate::error::{Error, Result};
use crate::types::{AiMetadata, Message, StopReason, Usage};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio_stream::Stream;

/// Events emitted during message streaming
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageEvent {
    /// Initial message structure
    Start { message: Message },
    /// Text content delta
    TextDelta { delta: String },
    /// Message completed successfully
    Done {
        message: Message,
        stop_reason: StopReason,
        usage: Usage,
    },
    /// Error occurred
    Error { message: String },
}

impl MessageEvent {
    /// Check if this is a terminal event (Done or Error)
    pub fn is_terminal(&self) -> bool {
        matches!(self, MessageEvent::Done { .. } | MessageEvent::Error { .. })
    }
}

/// A stream of message events
pub type MessageEventStream = Pin<Box<dyn Stream<Item = MessageEvent> + Send>>;

/// Builder for constructing an AI message from streaming events
#[derive(Debug, Default)]
pub struct MessageBuilder {
    text: String,
    metadata: AiMetadata,
    done: Option<Message>,
    error: Option<String>,
}

impl MessageBuilder {
    /// Create a new message builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a streaming event and update the message state
    pub fn process_event(&mut self, event: &MessageEvent) {
        match event {
            MessageEvent::Start { message } => {
                if let Message::Ai { metadata, .. } = message {
                    self.metadata = metadata.clone();
                }
            }
            MessageEvent::TextDelta { delta } => {
                self.text.push_str(delta);
            }
            MessageEvent::Done {
                message,
                stop_reason,
                usage,
            } => {
                self.metadata.stop_reason = Some(*stop_reason);
                self.metadata.usage = usage.clone();
                self.done = Some(message.clone());
            }
            MessageEvent::Error { message } => {
                self.error = Some(message.clone());
            }
        }
    }

    /// Build the final message.
    ///
    /// Prefers the provider's own final message; falls back to the
    /// accumulated deltas when the stream ended without a `Done` event.
    pub fn build(self) -> Result<Message> {
        if let Some(error) = self.error {
            return Err(Error::Sse(error));
        }

        let message = match self.done {
            Some(message) => message,
            None => Message::Ai {
                content: self.text,
                metadata: AiMetadata {
                    timestamp: chrono::Utc::now().timestamp_millis(),
                    ..self.metadata
                },
            },
        };

        if message.text().trim().is_empty() {
            return Err(Error::EmptyResponse);
        }
        Ok(message)
    }
}

/// Drain a stream into a single message
pub async fn collect_message(mut stream: MessageEventStream) -> Result<Message> {
    let mut builder = MessageBuilder::new();
    while let Some(event) = stream.next().await {
        let terminal = event.is_terminal();
        builder.process_event(&event);
        if terminal {
            break;
        }
    }
    builder.build()
}
