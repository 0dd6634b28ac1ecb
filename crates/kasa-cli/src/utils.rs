//! Shared utilities

use kasa_agent::OrchestratorEvent;

/// Truncate a string to `max` characters, appending "..." if truncated.
/// Operates on Unicode char boundaries, not bytes.
pub fn truncate_chars(s: &str, max: usize) -> String {
    let mut chars = s.chars();
    let truncated: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

/// One-line notice for events worth showing the user. Context sizes only
/// when verbose.
pub fn event_notice(event: &OrchestratorEvent, verbose: bool) -> Option<String> {
    match event {
        OrchestratorEvent::CompactionStart { message_count } => Some(format!(
            "[Summarizing conversation ({} messages)]",
            message_count
        )),
        OrchestratorEvent::CompactionEnd {
            messages_before,
            messages_after,
            summarized,
        } => Some(if *summarized {
            format!("[Summarized: {} -> {} messages]", messages_before, messages_after)
        } else {
            format!(
                "[Summary unavailable, kept the latest {} messages]",
                messages_after
            )
        }),
        OrchestratorEvent::ContextInjected {
            document_chars,
            web_chars,
        } if verbose => Some(format!(
            "[Context: {} chars from documents, {} chars from the web]",
            document_chars, web_chars
        )),
        _ => None,
    }
}
