//! kasa-agent: conversation orchestrator with context injection
//!
//! This crate runs conversation turns: it compacts long histories into a
//! summary, optionally augments the latest question with document passages
//! and web results, and invokes the chat model.

pub mod chat_model;
pub mod compaction;
pub mod context;
pub mod conversation;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod retrieval;
pub mod translate;
pub mod web_search;

pub use chat_model::{ChatModel, ProviderChatModel};
pub use compaction::{CompactionConfig, CompactionOutcome};
pub use conversation::{ContextMode, ConversationState};
pub use error::{Error, Result};
pub use events::OrchestratorEvent;
pub use orchestrator::{
    ContextInfo, ContextStatus, Orchestrator, OrchestratorConfig, Stage, error_reply,
};
pub use retrieval::{Passage, Retriever, VectorIndex};
pub use translate::{GhanaNlpTranslator, Translator};
pub use web_search::{DuckDuckGoSearch, WebSearch};
