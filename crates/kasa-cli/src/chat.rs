//! One interactive chat session: conversation state, documents, language and
//! transcript persistence around the orchestrator.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use kasa_agent::{
    ContextInfo, ContextMode, ConversationState, Orchestrator, Translator, VectorIndex,
    retrieval::{DocumentMetadata, IngestOutcome, Retriever, ingest},
    translate::{self, BASE_LANGUAGE, Language},
};
use kasa_ai::Message;

use crate::session::{ChatRecord, RecordRole, SessionStore};

/// What a turn produced, ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutput {
    /// The user's prompt in the session language
    pub display_prompt: String,
    /// The reply in the session language
    pub display_reply: String,
    /// Mode after the turn; differs from before when generation failed
    pub mode: ContextMode,
}

pub struct ChatSession {
    id: String,
    language: Language,
    state: ConversationState,
    records: Vec<ChatRecord>,
    index: VectorIndex,
    documents: Vec<DocumentMetadata>,
    orchestrator: Orchestrator,
    translator: Arc<dyn Translator>,
    store: Option<SessionStore>,
    turn_timeout: Duration,
}

impl ChatSession {
    pub fn new(
        id: impl Into<String>,
        orchestrator: Orchestrator,
        translator: Arc<dyn Translator>,
        index: VectorIndex,
        store: Option<SessionStore>,
        turn_timeout: Duration,
    ) -> Self {
        Self {
            id: id.into(),
            language: translate::SUPPORTED_LANGUAGES[0],
            state: ConversationState::new(),
            records: Vec::new(),
            index,
            documents: Vec::new(),
            orchestrator,
            translator,
            store,
            turn_timeout,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn mode(&self) -> ContextMode {
        self.state.context_mode
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn documents(&self) -> &[DocumentMetadata] {
        &self.documents
    }

    pub fn records(&self) -> &[ChatRecord] {
        &self.records
    }

    pub fn has_documents(&self) -> bool {
        self.index.is_loaded()
    }

    /// Switch the answer language
    pub fn set_language(&mut self, code: &str) -> Result<Language, String> {
        let language = translate::language(code).ok_or_else(|| {
            let codes: Vec<&str> = translate::SUPPORTED_LANGUAGES.iter().map(|l| l.code).collect();
            format!("Unsupported language '{}'. Choose one of: {}", code, codes.join(", "))
        })?;
        self.language = language;
        Ok(language)
    }

    /// Switch the context mode. Document modes need a loaded index.
    pub fn set_mode(&mut self, mode: ContextMode) -> Result<(), String> {
        if mode.uses_documents() && !self.index.is_loaded() {
            return Err(format!(
                "Mode '{}' needs documents. Load some with /docs <files> first.",
                mode
            ));
        }
        self.state.context_mode = mode;
        Ok(())
    }

    /// Ingest files into the session's index
    pub async fn load_documents(&mut self, paths: &[PathBuf]) -> IngestOutcome {
        let outcome = ingest(paths, &mut self.index).await;
        if outcome.success {
            self.documents = outcome.documents.clone();
        }
        outcome
    }

    /// Drop all documents. Document modes fall back to chat.
    pub fn clear_documents(&mut self) {
        self.index.clear();
        self.documents.clear();
        if self.state.context_mode.uses_documents() {
            self.state.context_mode = ContextMode::Chat;
        }
    }

    /// Start a fresh conversation and delete this session's transcripts
    pub fn clear_conversation(&mut self) {
        let mode = self.state.context_mode;
        self.state = ConversationState::new();
        self.state.context_mode = mode;
        self.records.clear();
        if let Some(store) = &self.store {
            if let Err(e) = store.clear(&self.id, None) {
                tracing::warn!("Failed to clear chat history: {}", e);
            }
        }
    }

    /// Rebuild the conversation from the transcript in the current language.
    /// Returns the number of records restored.
    pub fn resume(&mut self) -> std::io::Result<usize> {
        let Some(store) = &self.store else {
            return Ok(0);
        };
        let records = store.load(&self.id, self.language.code)?;
        let messages = records
            .iter()
            .map(|r| match r.role {
                RecordRole::User => Message::human(r.content.clone()),
                RecordRole::Ai => Message::ai(r.content.clone()),
            })
            .collect();
        let mode = self.state.context_mode;
        self.state = ConversationState::with_messages(messages);
        self.state.context_mode = mode;
        self.records = records;
        Ok(self.records.len())
    }

    pub fn context_info(&self) -> ContextInfo {
        self.orchestrator.context_info(&self.state, &self.index)
    }

    async fn localize(&self, text: &str) -> String {
        if self.language.code == BASE_LANGUAGE {
            return text.to_string();
        }
        self.translator.translate(self.language.code, text).await
    }

    /// Run one turn: translate for display, generate, persist the exchange.
    pub async fn turn(&mut self, prompt: &str) -> TurnOutput {
        let language = self.language.code;
        let display_prompt = self.localize(prompt).await;

        let mut user = ChatRecord::new(RecordRole::User, prompt);
        if language != BASE_LANGUAGE {
            user = user.with_translation(language, display_prompt.clone());
        }
        self.records.push(user);

        let mut state = std::mem::take(&mut self.state);
        state.push_human(prompt);
        let state = self
            .orchestrator
            .run_with_timeout(state, &self.index, self.turn_timeout)
            .await;
        let reply = state
            .last_message()
            .map(|m| m.text().to_string())
            .unwrap_or_default();
        let mode = state.context_mode;
        self.state = state;

        let display_reply = self.localize(&reply).await;
        let mut ai = ChatRecord::new(RecordRole::Ai, reply).with_mode(mode);
        if language != BASE_LANGUAGE {
            ai = ai.with_translation(language, display_reply.clone());
        }
        self.records.push(ai);

        self.persist_last_exchange();

        TurnOutput {
            display_prompt,
            display_reply,
            mode,
        }
    }

    fn persist_last_exchange(&self) {
        let Some(store) = &self.store else {
            return;
        };
        if self.records.len() < 2 {
            return;
        }
        let exchange = &self.records[self.records.len() - 2..];
        if let Err(e) = store.save(&self.id, self.language.code, exchange) {
            tracing::warn!("Failed to save chat history: {}", e);
        }
    }
}
