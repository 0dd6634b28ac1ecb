//! /info command - show context usage for the session

use super::CommandResult;
use crate::chat::ChatSession;

pub struct InfoCommand;

impl InfoCommand {
    pub fn execute(session: &ChatSession) -> CommandResult {
        let info = session.context_info();
        let language = session.language();

        let mut output = String::from("Session Info\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');

        output.push_str(&format!("Session:    {}\n", session.id()));
        output.push_str(&format!(
            "Language:   {} ({})\n",
            language.name, language.code
        ));
        output.push_str(&format!(
            "Mode:       {} ({})\n",
            info.current_mode,
            info.current_mode.description()
        ));
        output.push('\n');

        output.push_str(&format!("Messages:   {} total\n", info.total_messages));
        output.push_str(&format!("Summaries:  {}\n", info.summaries_created));
        output.push_str(&format!("Context:    {}\n", info.context_status));
        output.push('\n');

        if info.documents_loaded {
            output.push_str(&format!("Documents:  {} loaded\n", info.num_documents));
        } else {
            output.push_str("Documents:  none\n");
        }

        CommandResult::Message(output)
    }
}
