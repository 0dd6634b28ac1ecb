//! kasa-ai: chat model types and provider layer
//!
//! This crate provides the message types exchanged with the hosted chat model
//! and an OpenAI-compatible streaming provider (Groq, OpenAI, OpenRouter, Ollama).

pub mod error;
pub mod models;
pub mod providers;
pub mod stream;
pub mod types;

pub use error::{Error, Result};
pub use stream::MessageEventStream;
pub use types::*;
