//! /lang command - show or switch the answer language

use super::CommandResult;
use crate::chat::ChatSession;
use kasa_agent::translate;

pub struct LanguageCommand;

impl LanguageCommand {
    pub fn execute(args: &str, session: &ChatSession) -> CommandResult {
        if args.is_empty() {
            let mut output = String::from("Languages:\n");
            for language in translate::SUPPORTED_LANGUAGES {
                let marker = if language == session.language() { " *" } else { "" };
                output.push_str(&format!("  {:<4} {}{}\n", language.code, language.name, marker));
            }
            return CommandResult::Message(output);
        }

        match translate::language(args) {
            Some(language) => CommandResult::ChangeLanguage(language.code.to_string()),
            None => CommandResult::Message(format!(
                "No language matching '{}'\nUse /lang to list languages",
                args
            )),
        }
    }
}
