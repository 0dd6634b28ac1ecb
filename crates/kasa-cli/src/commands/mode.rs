//! /mode command - show or switch the context mode

use super::CommandResult;
use crate::chat::ChatSession;
use kasa_agent::ContextMode;

pub struct ModeCommand;

impl ModeCommand {
    pub fn execute(args: &str, session: &ChatSession) -> CommandResult {
        if args.is_empty() {
            return CommandResult::Message(list_modes(session));
        }

        match args.parse::<ContextMode>() {
            Ok(mode) if mode.uses_documents() && !session.has_documents() => {
                CommandResult::Message(format!(
                    "Mode '{}' needs documents. Load some with /docs <files> first.",
                    mode
                ))
            }
            Ok(mode) => CommandResult::ChangeMode(mode),
            Err(e) => CommandResult::Message(format!("{}\nUse /mode to list modes", e)),
        }
    }
}

fn list_modes(session: &ChatSession) -> String {
    let mut output = String::from("Context modes:\n");
    for mode in ContextMode::ALL {
        let marker = if mode == session.mode() { " *" } else { "" };
        let unavailable = if mode.uses_documents() && !session.has_documents() {
            " (load documents first)"
        } else {
            ""
        };
        output.push_str(&format!(
            "  {:<11} {}{}{}\n",
            mode.as_str(),
            mode.description(),
            unavailable,
            marker
        ));
    }
    output
}
