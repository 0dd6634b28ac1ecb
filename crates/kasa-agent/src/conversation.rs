//! Conversation state: messages, compaction bookkeeping and the selected context mode.

use std::fmt;
use std::str::FromStr;

use kasa_ai::Message;
use serde::{Deserialize, Serialize};

/// Which auxiliary context sources are consulted before generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextMode {
    /// Plain conversation, no extra context
    #[default]
    Chat,
    /// Uploaded document retrieval
    Rag,
    /// Live web search
    WebSearch,
    /// Documents and web search together
    Hybrid,
}

impl ContextMode {
    pub const ALL: [ContextMode; 4] = [
        ContextMode::Chat,
        ContextMode::Rag,
        ContextMode::WebSearch,
        ContextMode::Hybrid,
    ];

    /// Wire name (`chat`, `rag`, `web_search`, `hybrid`)
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextMode::Chat => "chat",
            ContextMode::Rag => "rag",
            ContextMode::WebSearch => "web_search",
            ContextMode::Hybrid => "hybrid",
        }
    }

    /// Short description for status lines
    pub fn description(&self) -> &'static str {
        match self {
            ContextMode::Chat => "Normal chat mode",
            ContextMode::Rag => "Using uploaded documents",
            ContextMode::WebSearch => "Web Search",
            ContextMode::Hybrid => "Documents + Web",
        }
    }

    /// Whether this mode consults the document index
    pub fn uses_documents(&self) -> bool {
        matches!(self, ContextMode::Rag | ContextMode::Hybrid)
    }

    /// Whether this mode consults web search
    pub fn uses_web(&self) -> bool {
        matches!(self, ContextMode::WebSearch | ContextMode::Hybrid)
    }
}

impl fmt::Display for ContextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "chat" => Ok(ContextMode::Chat),
            "rag" | "documents" | "docs" => Ok(ContextMode::Rag),
            "web_search" | "web" => Ok(ContextMode::WebSearch),
            "hybrid" => Ok(ContextMode::Hybrid),
            other => Err(format!("unknown context mode: {}", other)),
        }
    }
}

/// Per-session conversation state, owned by the orchestrator while a turn runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationState {
    /// Conversation messages in order
    pub messages: Vec<Message>,
    /// Set at the start of a turn when history must be compacted
    #[serde(skip)]
    pub should_summarize: bool,
    /// Number of compactions performed over the session
    pub summary_count: u32,
    /// Context sources used for generation
    pub context_mode: ContextMode,
}

impl ConversationState {
    /// Empty chat-mode state
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing history (e.g. a reloaded session)
    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Append a user message
    pub fn push_human(&mut self, content: impl Into<String>) {
        self.messages.push(Message::human(content));
    }

    /// The most recent message, if any
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = ConversationState::new();
        assert!(state.messages.is_empty());
        assert!(!state.should_summarize);
        assert_eq!(state.summary_count, 0);
        assert_eq!(state.context_mode, ContextMode::Chat);
    }

    #[test]
    fn test_context_mode_parse() {
        assert_eq!("web_search".parse::<ContextMode>(), Ok(ContextMode::WebSearch));
        assert_eq!("Web-Search".parse::<ContextMode>(), Ok(ContextMode::WebSearch));
        assert_eq!("HYBRID".parse::<ContextMode>(), Ok(ContextMode::Hybrid));
        assert!("telepathy".parse::<ContextMode>().is_err());
    }

    #[test]
    fn test_context_mode_round_trips_wire_name() {
        for mode in ContextMode::ALL {
            assert_eq!(mode.as_str().parse::<ContextMode>(), Ok(mode));
            let json = serde_json::to_value(mode).unwrap();
            assert_eq!(json, mode.as_str());
        }
    }

    #[test]
    fn test_should_summarize_is_not_persisted() {
        let mut state = ConversationState::with_messages(vec![Message::human("hi")]);
        state.should_summarize = true;
        let json = serde_json::to_string(&state).unwrap();
        let back: ConversationState = serde_json::from_str(&json).unwrap();
        assert!(!back.should_summarize);
        assert_eq!(back.messages.len(), 1);
    }
}
