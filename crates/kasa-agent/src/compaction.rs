//! History compaction for long conversations
//!
//! Once a conversation grows past a fixed number of messages, the older part
//! is summarized by the chat model and replaced with a single summary message.
//! The most recent messages are always kept verbatim.

use kasa_ai::Message;
use serde::{Deserialize, Serialize};

use crate::chat_model::ChatModel;
use crate::conversation::ConversationState;

/// Configuration for history compaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactionConfig {
    /// Compaction triggers once the conversation holds more messages than this
    pub max_context_messages: usize,
    /// Number of most recent messages kept verbatim
    pub keep_recent_messages: usize,
}

impl Default for CompactionConfig {
    fn default() -> Self {
        Self {
            max_context_messages: 20,
            keep_recent_messages: 8,
        }
    }
}

/// What a compaction pass did to the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompactionOutcome {
    /// Nothing older than the recent window existed
    Skipped,
    /// Older messages were replaced with a summary
    Summarized { summary: String, summarized: usize },
    /// The summary call failed and older messages were dropped
    Dropped { dropped: usize, error: String },
}

/// Prefix of the synthetic summary message
pub const SUMMARY_PREFIX: &str = "[Previous conversation summary: ";

const SUMMARIZATION_PROMPT: &str = "\
Please provide a concise summary of this conversation, capturing the key topics, \
decisions, and context that would be important for continuing the conversation:

{conversation}

Summary:";

/// Decide whether this turn needs compaction and record it on the state.
pub fn check_summarize(state: &mut ConversationState, config: &CompactionConfig) -> bool {
    state.should_summarize = state.messages.len() > config.max_context_messages;
    state.should_summarize
}

/// Split messages into (older, recent) around the recent window.
pub fn split_for_compaction(messages: &[Message], keep_recent: usize) -> (&[Message], &[Message]) {
    let cut = messages.len().saturating_sub(keep_recent);
    messages.split_at(cut)
}

/// Serialize messages to plain text for the summarization prompt.
fn serialize_messages_for_summary(messages: &[Message]) -> String {
    let mut out = String::new();
    for msg in messages {
        out.push_str(msg.role().transcript_label());
        out.push_str(": ");
        out.push_str(msg.text());
        out.push('\n');
    }
    out
}

/// Build the summarization prompt for a slice of older messages
pub fn summarization_prompt(older: &[Message]) -> String {
    SUMMARIZATION_PROMPT.replace("{conversation}", &serialize_messages_for_summary(older))
}

/// Wrap summary text in the recognizable marker
pub fn summary_message(summary: &str) -> Message {
    Message::ai(format!("{}{}]", SUMMARY_PREFIX, summary.trim()))
}

/// Check whether a message is a compaction summary
pub fn is_summary_message(message: &Message) -> bool {
    !message.is_human() && message.text().starts_with(SUMMARY_PREFIX)
}

/// Run one compaction pass over the state.
///
/// Always clears `should_summarize`. On a failed model call the older
/// messages are discarded without a summary and `summary_count` is left alone.
pub async fn compact(
    state: &mut ConversationState,
    config: &CompactionConfig,
    model: &dyn ChatModel,
) -> CompactionOutcome {
    state.should_summarize = false;

    let (older, recent) = split_for_compaction(&state.messages, config.keep_recent_messages);
    if older.is_empty() {
        return CompactionOutcome::Skipped;
    }

    let older_count = older.len();
    let prompt = summarization_prompt(older);
    let recent = recent.to_vec();

    match model.invoke_prompt(&prompt).await {
        Ok(reply) => {
            let summary = reply.text().to_string();
            let mut messages = Vec::with_capacity(recent.len() + 1);
            messages.push(summary_message(&summary));
            messages.extend(recent);
            state.messages = messages;
            state.summary_count += 1;
            CompactionOutcome::Summarized {
                summary,
                summarized: older_count,
            }
        }
        Err(e) => {
            tracing::warn!(
                "Summarization failed, dropping {} older messages: {}",
                older_count,
                e
            );
            state.messages = recent;
            CompactionOutcome::Dropped {
                dropped: older_count,
                error: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct ScriptedModel {
        reply: Option<&'static str>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn replying(reply: &'static str) -> Self {
            Self {
                reply: Some(reply),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn invoke(&self, messages: &[Message]) -> Result<Message> {
            self.prompts
                .lock()
                .push(messages.last().map(|m| m.text().to_string()).unwrap_or_default());
            match self.reply {
                Some(text) => Ok(Message::ai(text)),
                None => Err(Error::Other("provider unavailable".into())),
            }
        }
    }

    fn conversation(n: usize) -> Vec<Message> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Message::human(format!("question {}", i))
                } else {
                    Message::ai(format!("answer {}", i))
                }
            })
            .collect()
    }

    #[test]
    fn test_check_summarize_threshold() {
        let config = CompactionConfig::default();
        for n in [0, 1, 8, 19, 20] {
            let mut state = ConversationState::with_messages(conversation(n));
            assert!(!check_summarize(&mut state, &config), "len {}", n);
            assert!(!state.should_summarize);
        }
        for n in [21, 25, 60] {
            let mut state = ConversationState::with_messages(conversation(n));
            assert!(check_summarize(&mut state, &config), "len {}", n);
            assert!(state.should_summarize);
        }
    }

    #[test]
    fn test_split_keeps_recent_window() {
        let messages = conversation(25);
        let (older, recent) = split_for_compaction(&messages, 8);
        assert_eq!(older.len(), 17);
        assert_eq!(recent.len(), 8);
        assert_eq!(recent[0].text(), "answer 17");

        let short = conversation(5);
        let (older, recent) = split_for_compaction(&short, 8);
        assert!(older.is_empty());
        assert_eq!(recent.len(), 5);
    }

    #[test]
    fn test_serialize_messages() {
        let text =
            serialize_messages_for_summary(&[Message::human("Hello"), Message::ai("Hi there!")]);
        assert_eq!(text, "Human: Hello\nAssistant: Hi there!\n");
    }

    #[test]
    fn test_summary_marker() {
        let msg = summary_message("  talked about cocoa prices ");
        assert_eq!(
            msg.text(),
            "[Previous conversation summary: talked about cocoa prices]"
        );
        assert!(is_summary_message(&msg));
        assert!(!is_summary_message(&Message::human(msg.text())));
    }

    #[tokio::test]
    async fn test_compact_replaces_older_with_summary() {
        let model = ScriptedModel::replying("user asked about Accra weather");
        let mut state = ConversationState::with_messages(conversation(25));
        state.should_summarize = true;

        let outcome = compact(&mut state, &CompactionConfig::default(), &model).await;

        assert_eq!(
            outcome,
            CompactionOutcome::Summarized {
                summary: "user asked about Accra weather".into(),
                summarized: 17,
            }
        );
        assert_eq!(state.messages.len(), 9);
        assert!(is_summary_message(&state.messages[0]));
        assert_eq!(state.messages[1].text(), "answer 17");
        assert_eq!(state.messages[8].text(), "question 24");
        assert_eq!(state.summary_count, 1);
        assert!(!state.should_summarize);

        let prompts = model.prompts.lock();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Human: question 0"));
        assert!(prompts[0].contains("Human: question 16"));
        assert!(prompts[0].contains("Assistant: answer 15"));
        assert!(!prompts[0].contains("answer 17"));
    }

    #[tokio::test]
    async fn test_compact_failure_drops_older() {
        let model = ScriptedModel::failing();
        let mut state = ConversationState::with_messages(conversation(25));
        state.should_summarize = true;
        state.summary_count = 3;

        let outcome = compact(&mut state, &CompactionConfig::default(), &model).await;

        assert!(matches!(outcome, CompactionOutcome::Dropped { dropped: 17, .. }));
        assert_eq!(state.messages.len(), 8);
        assert_eq!(state.messages[0].text(), "answer 17");
        assert_eq!(state.summary_count, 3);
        assert!(!state.should_summarize);
    }

    #[tokio::test]
    async fn test_compact_noop_when_nothing_older() {
        let model = ScriptedModel::replying("unused");
        let mut state = ConversationState::with_messages(conversation(6));
        state.should_summarize = true;

        let outcome = compact(&mut state, &CompactionConfig::default(), &model).await;

        assert_eq!(outcome, CompactionOutcome::Skipped);
        let texts: Vec<&str> = state.messages.iter().map(|m| m.text()).collect();
        assert_eq!(
            texts,
            ["question 0", "answer 1", "question 2", "answer 3", "question 4", "answer 5"]
        );
        assert_eq!(state.summary_count, 0);
        assert!(!state.should_summarize);
        assert!(model.prompts.lock().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_compactions_count() {
        let model = ScriptedModel::replying("summary");
        let config = CompactionConfig::default();
        let mut state = ConversationState::with_messages(conversation(21));

        for round in 1..=3 {
            assert!(check_summarize(&mut state, &config));
            compact(&mut state, &config, &model).await;
            assert_eq!(state.summary_count, round);
            state.messages.extend(conversation(12));
        }
    }
}
