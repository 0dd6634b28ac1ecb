//! Model registry with public lookup API.

use crate::{Model, Provider};

/// Model used when nothing else is configured
pub const DEFAULT_MODEL_ID: &str = "openai/gpt-oss-120b";

struct ModelEntry {
    id: &'static str,
    name: &'static str,
    provider: Provider,
    context_window: u32,
    max_tokens: u32,
}

const MODEL_ENTRIES: &[ModelEntry] = &[
    ModelEntry {
        id: "openai/gpt-oss-120b",
        name: "GPT OSS 120B",
        provider: Provider::Groq,
        context_window: 131_072,
        max_tokens: 65_536,
    },
    ModelEntry {
        id: "openai/gpt-oss-20b",
        name: "GPT OSS 20B",
        provider: Provider::Groq,
        context_window: 131_072,
        max_tokens: 65_536,
    },
    ModelEntry {
        id: "llama-3.3-70b-versatile",
        name: "Llama 3.3 70B Versatile",
        provider: Provider::Groq,
        context_window: 131_072,
        max_tokens: 32_768,
    },
    ModelEntry {
        id: "llama-3.1-8b-instant",
        name: "Llama 3.1 8B Instant",
        provider: Provider::Groq,
        context_window: 131_072,
        max_tokens: 131_072,
    },
    ModelEntry {
        id: "gpt-4o-mini",
        name: "GPT-4o mini",
        provider: Provider::OpenAI,
        context_window: 128_000,
        max_tokens: 16_384,
    },
    ModelEntry {
        id: "gpt-4.1",
        name: "GPT-4.1",
        provider: Provider::OpenAI,
        context_window: 1_047_576,
        max_tokens: 32_768,
    },
    ModelEntry {
        id: "openai/gpt-oss-120b:free",
        name: "GPT OSS 120B (free)",
        provider: Provider::OpenRouter,
        context_window: 131_072,
        max_tokens: 32_768,
    },
];

impl ModelEntry {
    fn to_model(&self) -> Model {
        Model {
            id: self.id.to_string(),
            name: self.name.to_string(),
            provider: self.provider,
            base_url: self.provider.default_base_url().to_string(),
            context_window: self.context_window,
            max_tokens: self.max_tokens,
            headers: Default::default(),
        }
    }
}

/// Look up a model by provider and ID.
pub fn get_model(provider: Provider, id: &str) -> Option<Model> {
    MODEL_ENTRIES
        .iter()
        .find(|e| e.id == id && e.provider == provider)
        .map(|e| e.to_model())
}

/// The default chat model (Groq hosted GPT OSS 120B).
pub fn default_model() -> Model {
    MODEL_ENTRIES[0].to_model()
}

/// Resolve a model for a provider, constructing one for unknown IDs.
pub fn resolve_model(provider: Provider, id: &str) -> Model {
    if let Some(model) = get_model(provider, id) {
        return model;
    }

    Model {
        id: id.to_string(),
        name: id.to_string(),
        provider,
        base_url: provider.default_base_url().to_string(),
        context_window: 128_000,
        max_tokens: 8192,
        headers: Default::default(),
    }
}
