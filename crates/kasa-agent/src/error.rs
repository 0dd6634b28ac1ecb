//! Error types for kasa-agent

use thiserror::Error;

/// Result type alias using kasa-agent Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the orchestrator and its context providers
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the chat model layer
    #[error(transparent)]
    Ai(#[from] kasa_ai::Error),

    /// HTTP failure talking to a context provider
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Document retrieval failed
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Embedding text failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Web search failed
    #[error("Web search error: {0}")]
    WebSearch(String),

    /// A generic error
    #[error("{0}")]
    Other(String),
}
