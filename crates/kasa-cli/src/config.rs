//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use kasa_ai::Provider;

/// Default deadline for a whole turn
pub const DEFAULT_TURN_TIMEOUT_SECS: u64 = 120;

/// Configuration for kasa
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default model to use
    pub model: Option<String>,
    /// Default provider
    pub provider: Option<String>,
    /// Answer language (en, gaa, tw)
    pub language: Option<String>,
    /// Starting context mode (chat, rag, web_search, hybrid)
    pub context_mode: Option<String>,
    /// Where chat transcripts are stored
    pub chats_dir: Option<PathBuf>,
    /// Deadline for one turn in seconds
    pub turn_timeout_secs: Option<u64>,
    /// API keys (alternative to environment variables)
    #[serde(default)]
    pub api_keys: ApiKeys,
    /// Document embeddings; the local all-MiniLM-L6-v2 model is used unless a
    /// remote endpoint is set
    #[serde(default)]
    pub embeddings: EmbeddingSettings,
}

/// API key configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    pub groq: Option<String>,
    pub openai: Option<String>,
    pub openrouter: Option<String>,
    pub ghana_nlp: Option<String>,
}

/// Embedding backend settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// OpenAI-compatible endpoint; unset means the local model
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    /// Vector size reported by the remote model
    pub dimensions: Option<usize>,
    /// Where the local model files are downloaded
    pub cache_dir: Option<PathBuf>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kasa")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("KASA_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                eprintln!("Warning: Failed to parse config file: {}", e);
                Self::default()
            }),
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Parse config from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save config to file
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            model: Some(kasa_ai::models::DEFAULT_MODEL_ID.to_string()),
            provider: Some("groq".to_string()),
            language: Some("en".to_string()),
            context_mode: Some("chat".to_string()),
            turn_timeout_secs: Some(DEFAULT_TURN_TIMEOUT_SECS),
            ..Default::default()
        };

        default_config.save()?;
        Ok(path)
    }

    /// Get API key for a provider, checking config then env
    pub fn get_api_key(&self, provider: Provider) -> Option<String> {
        let from_config = match provider {
            Provider::Groq => self.api_keys.groq.as_deref(),
            Provider::OpenAI => self.api_keys.openai.as_deref(),
            Provider::OpenRouter => self.api_keys.openrouter.as_deref(),
            Provider::Ollama | Provider::Custom => None,
        };
        let env_var = provider.api_key_env_var()?;
        kasa_ai::providers::get_api_key(from_config, env_var).ok()
    }

    /// Translation API key, checking config then `GHANA_NLP_KEY`
    pub fn ghana_nlp_key(&self) -> Option<String> {
        kasa_ai::providers::get_api_key(self.api_keys.ghana_nlp.as_deref(), "GHANA_NLP_KEY").ok()
    }

    /// Directory holding chat transcripts
    pub fn chats_dir(&self) -> PathBuf {
        self.chats_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("kasa")
                .join("chats")
        })
    }

    /// Directory for downloaded embedding model files
    pub fn model_cache_dir(&self) -> PathBuf {
        self.embeddings.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("kasa")
                .join("models")
        })
    }

    pub fn turn_timeout(&self) -> Duration {
        Duration::from_secs(self.turn_timeout_secs.unwrap_or(DEFAULT_TURN_TIMEOUT_SECS))
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# kasa configuration file
# Place at ~/.config/kasa/config.toml (Linux/Mac) or %APPDATA%\kasa\config.toml (Windows)

# Default model to use
model = "openai/gpt-oss-120b"

# Default provider (groq, openai, openrouter, ollama)
provider = "groq"

# Answer language: en (English), gaa (Ga), tw (Twi)
language = "en"

# Starting context mode (chat, rag, web_search, hybrid)
# rag and hybrid need documents loaded with --docs or /docs
context_mode = "chat"

# Where chat transcripts are written (optional)
# chats_dir = "~/.local/share/kasa/chats"

# Give up on a turn after this many seconds
turn_timeout_secs = 120

# API keys (optional - can also use environment variables)
# GROQ_API_KEY, OPENAI_API_KEY, OPENROUTER_API_KEY, GHANA_NLP_KEY
[api_keys]
# groq = "gsk_..."
# openai = "sk-..."
# openrouter = "sk-or-..."
# ghana_nlp = "..."

# Embeddings for document search
# By default all-MiniLM-L6-v2 runs locally (downloaded on first use)
[embeddings]
# cache_dir = "~/.cache/kasa/models"
# Use a remote OpenAI-compatible endpoint instead:
# base_url = "https://api.openai.com/v1"
# model = "text-embedding-3-small"
# api_key = "sk-..."
# dimensions = 1536
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
            model = "llama-3.3-70b-versatile"
            provider = "groq"
            language = "tw"
            context_mode = "hybrid"
            chats_dir = "/tmp/kasa-chats"
            turn_timeout_secs = 30

            [api_keys]
            groq = "gsk_test"
            ghana_nlp = "nlp_test"

            [embeddings]
            base_url = "http://localhost:11434/v1"
            model = "nomic-embed-text"
            dimensions = 768
            cache_dir = "/tmp/kasa-models"
            "#,
        )
        .unwrap();

        assert_eq!(config.language.as_deref(), Some("tw"));
        assert_eq!(config.context_mode.as_deref(), Some("hybrid"));
        assert_eq!(config.chats_dir(), PathBuf::from("/tmp/kasa-chats"));
        assert_eq!(config.turn_timeout(), Duration::from_secs(30));
        assert_eq!(config.get_api_key(Provider::Groq).as_deref(), Some("gsk_test"));
        assert_eq!(config.ghana_nlp_key().as_deref(), Some("nlp_test"));
        assert_eq!(
            config.embeddings.model.as_deref(),
            Some("nomic-embed-text")
        );
        assert_eq!(config.embeddings.dimensions, Some(768));
        assert_eq!(config.model_cache_dir(), PathBuf::from("/tmp/kasa-models"));
    }

    #[test]
    fn test_empty_config_defaults() {
        let config = Config::parse("").unwrap();
        assert!(config.model.is_none());
        assert_eq!(
            config.turn_timeout(),
            Duration::from_secs(DEFAULT_TURN_TIMEOUT_SECS)
        );
        assert!(config.embeddings.base_url.is_none());
        assert!(config.chats_dir().ends_with("chats"));
        assert!(config.model_cache_dir().ends_with("kasa/models"));
    }

    #[test]
    fn test_keyless_providers() {
        let config = Config::default();
        assert!(config.get_api_key(Provider::Ollama).is_none());
        assert!(config.get_api_key(Provider::Custom).is_none());
    }

    #[test]
    fn test_example_config_parses() {
        let config = Config::parse(example_config()).unwrap();
        assert_eq!(config.provider.as_deref(), Some("groq"));
        assert_eq!(config.turn_timeout_secs, Some(120));
    }
}
