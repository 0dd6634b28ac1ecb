//! Per-turn conversation orchestration
//!
//! Every turn walks a fixed pipeline: CheckSummarize, then Summarize when the
//! history has grown too long, then Generate. Generate optionally splices
//! document passages and web results into the outgoing copy of the last user
//! message before invoking the chat model. A turn always ends with a reply
//! appended to the conversation, even when the model fails.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use kasa_ai::Message;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::{
    chat_model::ChatModel,
    compaction::{self, CompactionConfig, CompactionOutcome},
    context::{ContextBlocks, build_enhanced_prompt, format_passages, format_web_results},
    conversation::{ContextMode, ConversationState},
    events::OrchestratorEvent,
    retrieval::Retriever,
    web_search::WebSearch,
};

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CheckSummarize,
    Summarize,
    Generate,
    Done,
}

impl Stage {
    /// Transition function. No stage is visited twice in a turn.
    pub fn next(self, state: &ConversationState) -> Stage {
        match self {
            Stage::CheckSummarize if state.should_summarize => Stage::Summarize,
            Stage::CheckSummarize | Stage::Summarize => Stage::Generate,
            Stage::Generate | Stage::Done => Stage::Done,
        }
    }
}

/// Orchestrator configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    pub compaction: CompactionConfig,
    /// Passages requested from the retriever per turn
    pub retrieval_top_k: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            compaction: CompactionConfig::default(),
            retrieval_top_k: 5,
        }
    }
}

/// Whether the next turn will compact history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContextStatus {
    Optimal,
    WillSummarizeNext,
}

impl fmt::Display for ContextStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContextStatus::Optimal => "Optimal",
            ContextStatus::WillSummarizeNext => "Will summarize next",
        })
    }
}

/// Snapshot of a session's context usage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextInfo {
    pub total_messages: usize,
    pub summaries_created: u32,
    pub context_status: ContextStatus,
    pub documents_loaded: bool,
    pub num_documents: usize,
    pub current_mode: ContextMode,
}

/// Reply appended when generation fails
pub fn error_reply(error: impl fmt::Display) -> Message {
    Message::ai(format!("I apologize, but I encountered an error: {}", error))
}

/// Runs conversation turns against a chat model and optional context sources.
///
/// Holds no per-session state; the conversation is passed in and returned.
pub struct Orchestrator {
    model: Arc<dyn ChatModel>,
    web_search: Option<Arc<dyn WebSearch>>,
    config: OrchestratorConfig,
    event_tx: broadcast::Sender<OrchestratorEvent>,
}

impl Orchestrator {
    pub fn new(
        model: Arc<dyn ChatModel>,
        web_search: Option<Arc<dyn WebSearch>>,
        config: OrchestratorConfig,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            model,
            web_search,
            config,
            event_tx,
        }
    }

    /// Subscribe to orchestrator events
    pub fn subscribe(&self) -> broadcast::Receiver<OrchestratorEvent> {
        self.event_tx.subscribe()
    }

    // Nobody listening is fine
    fn emit(&self, event: OrchestratorEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Run one full turn over the state.
    pub async fn run(
        &self,
        mut state: ConversationState,
        retriever: &dyn Retriever,
    ) -> ConversationState {
        self.emit(OrchestratorEvent::TurnStart {
            message_count: state.messages.len(),
            context_mode: state.context_mode,
        });

        let mut stage = Stage::CheckSummarize;
        while stage != Stage::Done {
            tracing::debug!("Entering stage {:?}", stage);
            match stage {
                Stage::CheckSummarize => {
                    compaction::check_summarize(&mut state, &self.config.compaction);
                }
                Stage::Summarize => self.summarize(&mut state).await,
                Stage::Generate => self.generate(&mut state, retriever).await,
                Stage::Done => {}
            }
            stage = stage.next(&state);
        }

        self.emit(OrchestratorEvent::TurnEnd {
            message_count: state.messages.len(),
            context_mode: state.context_mode,
        });
        state
    }

    /// Append a user message, run a turn and return the reply with the new state.
    pub async fn respond(
        &self,
        mut state: ConversationState,
        input: &str,
        retriever: &dyn Retriever,
    ) -> (ConversationState, Message) {
        state.push_human(input);
        let state = self.run(state, retriever).await;
        let reply = state
            .last_message()
            .cloned()
            .unwrap_or_else(|| Message::ai(String::new()));
        (state, reply)
    }

    /// Run a turn with a deadline.
    ///
    /// On timeout the pre-turn state gets an error reply and the mode falls
    /// back to chat, exactly as for a failed model call.
    pub async fn run_with_timeout(
        &self,
        state: ConversationState,
        retriever: &dyn Retriever,
        timeout: Duration,
    ) -> ConversationState {
        let snapshot = state.clone();
        match tokio::time::timeout(timeout, self.run(state, retriever)).await {
            Ok(state) => state,
            Err(_) => {
                let message = format!("turn timed out after {}s", timeout.as_secs());
                tracing::warn!("{}", message);
                self.emit(OrchestratorEvent::Error {
                    message: message.clone(),
                });
                let mut state = snapshot;
                state.should_summarize = false;
                state.messages.push(error_reply(message));
                state.context_mode = ContextMode::Chat;
                state
            }
        }
    }

    /// Report how much context the session is using
    pub fn context_info(
        &self,
        state: &ConversationState,
        retriever: &dyn Retriever,
    ) -> ContextInfo {
        let total_messages = state.messages.len();
        let context_status = if total_messages > self.config.compaction.max_context_messages {
            ContextStatus::WillSummarizeNext
        } else {
            ContextStatus::Optimal
        };
        ContextInfo {
            total_messages,
            summaries_created: state.summary_count,
            context_status,
            documents_loaded: retriever.is_loaded(),
            num_documents: retriever.document_count(),
            current_mode: state.context_mode,
        }
    }

    async fn summarize(&self, state: &mut ConversationState) {
        let messages_before = state.messages.len();
        self.emit(OrchestratorEvent::CompactionStart {
            message_count: messages_before,
        });

        let outcome =
            compaction::compact(state, &self.config.compaction, self.model.as_ref()).await;
        if let CompactionOutcome::Summarized { summarized, .. } = &outcome {
            tracing::debug!("Summarized {} older messages", summarized);
        }

        self.emit(OrchestratorEvent::CompactionEnd {
            messages_before,
            messages_after: state.messages.len(),
            summarized: matches!(outcome, CompactionOutcome::Summarized { .. }),
        });
    }

    async fn gather_context(
        &self,
        mode: ContextMode,
        query: &str,
        retriever: &dyn Retriever,
    ) -> ContextBlocks {
        let mut blocks = ContextBlocks::default();

        if mode.uses_documents() && retriever.is_loaded() {
            match retriever.search(query, self.config.retrieval_top_k).await {
                Ok(passages) => blocks.documents = format_passages(&passages),
                Err(e) => tracing::warn!("Document search failed: {}", e),
            }
        }

        if mode.uses_web() {
            if let Some(search) = &self.web_search {
                match search.run(query).await {
                    Ok(raw) => blocks.web = format_web_results(&raw),
                    Err(e) => tracing::warn!("Web search failed: {}", e),
                }
            }
        }

        blocks
    }

    async fn generate(&self, state: &mut ConversationState, retriever: &dyn Retriever) {
        let mut outgoing = state.messages.clone();

        if state.context_mode != ContextMode::Chat {
            if let Some(query) = state.last_message().map(|m| m.text().to_string()) {
                let blocks = self.gather_context(state.context_mode, &query, retriever).await;
                if let Some(prompt) = build_enhanced_prompt(&query, &blocks) {
                    tracing::debug!(
                        "Injecting context: {} document chars, {} web chars",
                        blocks.documents.len(),
                        blocks.web.len()
                    );
                    self.emit(OrchestratorEvent::ContextInjected {
                        document_chars: blocks.documents.len(),
                        web_chars: blocks.web.len(),
                    });
                    if let Some(last) = outgoing.last_mut() {
                        *last = Message::human(prompt);
                    }
                }
            }
        }

        match self.model.invoke(&outgoing).await {
            Ok(reply) => state.messages.push(reply),
            Err(e) => {
                tracing::warn!("Generation failed: {}", e);
                self.emit(OrchestratorEvent::Error {
                    message: e.to_string(),
                });
                state.messages.push(error_reply(&e));
                state.context_mode = ContextMode::Chat;
            }
        }
    }
}
