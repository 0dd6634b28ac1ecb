//! Slash commands for interactive mode

mod docs;
mod info;
mod lang;
mod mode;

pub use docs::DocsCommand;
pub use info::InfoCommand;
pub use lang::LanguageCommand;
pub use mode::ModeCommand;

use std::path::PathBuf;

use kasa_agent::ContextMode;

use crate::chat::ChatSession;

/// Result of executing a slash command
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Clear the conversation
    Clear,
    /// Switch the context mode
    ChangeMode(ContextMode),
    /// Switch the answer language
    ChangeLanguage(String),
    /// Ingest files into the document index
    LoadDocuments(Vec<PathBuf>),
    /// Drop all loaded documents
    ClearDocuments,
    /// Show a message to the user (not sent to the model)
    Message(String),
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse and execute a slash command
pub fn execute_command(input: &str, session: &ChatSession) -> Option<CommandResult> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let (command, args) = match rest.split_once(' ') {
        Some((command, args)) => (command, args.trim()),
        None => (rest, ""),
    };
    let command = command.to_lowercase();

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),

        "clear" | "c" => CommandResult::Clear,

        "quit" | "exit" | "q" => CommandResult::Exit,

        "mode" | "m" => ModeCommand::execute(args, session),

        "lang" | "l" => LanguageCommand::execute(args, session),

        "docs" | "d" => DocsCommand::execute(args, session),

        "info" | "i" => InfoCommand::execute(session),

        _ => CommandResult::Unknown(command),
    })
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?           Show this help message
  /mode, /m [mode]        Show or set context mode (chat/rag/web_search/hybrid)
  /lang, /l [code]        Show or set answer language (en/gaa/tw)
  /docs, /d <files...>    Load documents for rag and hybrid modes (quote paths with spaces)
  /docs list              Show loaded documents
  /docs clear             Remove loaded documents
  /info, /i               Show context usage for this session
  /clear, /c              Start a fresh conversation
  /quit, /exit, /q        Exit kasa

Examples:
  /docs notes.txt report.pdf   Load two documents
  /mode hybrid                 Answer from documents and the web
  /lang tw                     Answer in Twi"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use kasa_agent::retrieval::Embedder;
    use kasa_agent::translate::Passthrough;
    use kasa_agent::{ChatModel, Orchestrator, OrchestratorConfig, VectorIndex};
    use kasa_ai::Message;
    use std::sync::Arc;
    use std::time::Duration;

    struct SilentModel;

    #[async_trait]
    impl ChatModel for SilentModel {
        async fn invoke(&self, _messages: &[Message]) -> kasa_agent::Result<Message> {
            Ok(Message::ai("ok"))
        }
    }

    /// Same vector for every text
    struct FlatEmbedder;

    #[async_trait]
    impl Embedder for FlatEmbedder {
        async fn embed(&self, texts: &[String]) -> kasa_agent::Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn session() -> ChatSession {
        ChatSession::new(
            "abc",
            Orchestrator::new(Arc::new(SilentModel), None, OrchestratorConfig::default()),
            Arc::new(Passthrough),
            VectorIndex::new(Arc::new(FlatEmbedder)),
            None,
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(execute_command("hello there", &session()), None);
    }

    #[test]
    fn test_basic_commands() {
        let session = session();
        assert_eq!(execute_command("/quit", &session), Some(CommandResult::Exit));
        assert_eq!(execute_command(" /C ", &session), Some(CommandResult::Clear));
        assert_eq!(
            execute_command("/frobnicate now", &session),
            Some(CommandResult::Unknown("frobnicate".into()))
        );
    }

    #[test]
    fn test_mode_command() {
        let session = session();
        assert_eq!(
            execute_command("/mode web", &session),
            Some(CommandResult::ChangeMode(ContextMode::WebSearch))
        );
        match execute_command("/mode rag", &session) {
            Some(CommandResult::Message(msg)) => assert!(msg.contains("needs documents")),
            other => panic!("unexpected {:?}", other),
        }
        match execute_command("/mode", &session) {
            Some(CommandResult::Message(msg)) => {
                assert!(msg.contains("chat        Normal chat mode *"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_lang_command() {
        let session = session();
        assert_eq!(
            execute_command("/lang GAA", &session),
            Some(CommandResult::ChangeLanguage("gaa".into()))
        );
        match execute_command("/lang xx", &session) {
            Some(CommandResult::Message(msg)) => assert!(msg.starts_with("No language matching")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_docs_command() {
        let session = session();
        assert_eq!(
            execute_command("/docs a.txt  b.pdf", &session),
            Some(CommandResult::LoadDocuments(vec![
                PathBuf::from("a.txt"),
                PathBuf::from("b.pdf")
            ]))
        );
        assert_eq!(
            execute_command(r#"/docs "farm plan.pdf" b.pdf"#, &session),
            Some(CommandResult::LoadDocuments(vec![
                PathBuf::from("farm plan.pdf"),
                PathBuf::from("b.pdf")
            ]))
        );
        assert_eq!(
            execute_command("/docs clear", &session),
            Some(CommandResult::ClearDocuments)
        );
        match execute_command("/docs", &session) {
            Some(CommandResult::Message(msg)) => assert!(msg.starts_with("No documents loaded")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_info_command() {
        match execute_command("/info", &session()) {
            Some(CommandResult::Message(msg)) => {
                assert!(msg.contains("Session:    abc"));
                assert!(msg.contains("Context:    Optimal"));
                assert!(msg.contains("Documents:  none"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
