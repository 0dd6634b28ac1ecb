//! /docs command - load, list and clear documents

use std::path::PathBuf;

use super::CommandResult;
use crate::chat::ChatSession;

pub struct DocsCommand;

impl DocsCommand {
    pub fn execute(args: &str, session: &ChatSession) -> CommandResult {
        match args {
            "" | "list" => CommandResult::Message(list_documents(session)),
            "clear" => CommandResult::ClearDocuments,
            paths => CommandResult::LoadDocuments(
                split_paths(paths).into_iter().map(PathBuf::from).collect(),
            ),
        }
    }
}

/// Split on whitespace, keeping single- or double-quoted runs together
fn split_paths(args: &str) -> Vec<String> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_token = false;

    for c in args.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    paths.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        paths.push(current);
    }
    paths
}

fn list_documents(session: &ChatSession) -> String {
    let documents = session.documents();
    if documents.is_empty() {
        return "No documents loaded. Use /docs <files...> to load some.".to_string();
    }

    let mut output = format!("Loaded documents ({}):\n", documents.len());
    for doc in documents {
        let unit = if doc.num_pages == 1 { "page" } else { "pages" };
        output.push_str(&format!(
            "  {} [{}] {} {}\n",
            doc.name, doc.file_type, doc.num_pages, unit
        ));
    }
    output
}
