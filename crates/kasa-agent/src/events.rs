//! Orchestrator event types

use serde::{Deserialize, Serialize};

use crate::conversation::ContextMode;

/// Events emitted while a turn runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrchestratorEvent {
    /// A turn started
    TurnStart {
        message_count: usize,
        context_mode: ContextMode,
    },

    /// History compaction started
    CompactionStart { message_count: usize },

    /// History compaction completed
    CompactionEnd {
        messages_before: usize,
        messages_after: usize,
        summarized: bool,
    },

    /// Retrieved context was spliced into the outgoing request
    ContextInjected {
        document_chars: usize,
        web_chars: usize,
    },

    /// A turn completed
    TurnEnd {
        message_count: usize,
        context_mode: ContextMode,
    },

    /// Error occurred
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_tag() {
        let event = OrchestratorEvent::ContextInjected {
            document_chars: 120,
            web_chars: 0,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "context_injected");
        assert_eq!(json["document_chars"], 120);
    }
}
