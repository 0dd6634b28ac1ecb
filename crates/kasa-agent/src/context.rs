//! Rendering retrieved documents and web results into the outgoing prompt

use crate::retrieval::Passage;

/// Separator between document passages
pub const PASSAGE_SEPARATOR: &str = "\n\n---\n\n";

const DOCUMENT_HEADING: &str = "## Document Context:\n";
const WEB_HEADING: &str = "## Web Search Results:\n";

/// Format passages as `[Source: X]` blocks. Empty input yields an empty string.
pub fn format_passages(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|p| format!("[Source: {}]\n{}", p.source, p.text))
        .collect::<Vec<_>>()
        .join(PASSAGE_SEPARATOR)
}

/// Wrap raw web search output. Blank output yields an empty string.
pub fn format_web_results(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }
    format!("Web Search Results:\n\n{}", raw)
}

/// Context blocks gathered for one turn
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ContextBlocks {
    pub documents: String,
    pub web: String,
}

impl ContextBlocks {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty() && self.web.is_empty()
    }

    /// Headed sections in fixed order: documents first, then web
    fn sections(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if !self.documents.is_empty() {
            parts.push(format!("{}{}", DOCUMENT_HEADING, self.documents));
        }
        if !self.web.is_empty() {
            parts.push(format!("{}{}", WEB_HEADING, self.web));
        }
        parts
    }
}

/// Build the enhanced user prompt. Returns `None` when there is no context.
pub fn build_enhanced_prompt(query: &str, blocks: &ContextBlocks) -> Option<String> {
    if blocks.is_empty() {
        return None;
    }
    let context = blocks.sections().join("\n");
    Some(format!(
        "Based on the following context, please answer the user's question.\n\n\
         {context}\n\n\
         User Question: {query}\n\n\
         Please provide a comprehensive answer based on the provided context. \
         If the context doesn't contain relevant information, please state that clearly. \
         Lastly, make sure your responses are brief and to the point."
    ))
}
