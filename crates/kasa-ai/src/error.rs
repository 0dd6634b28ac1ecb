//! Error types for kasa-ai

use thiserror::Error;

/// Result type alias using kasa-ai Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to a chat model provider
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response
    #[error("API error: {message} (type: {error_type})")]
    Api { error_type: String, message: String },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Invalid API key
    #[error("Invalid or missing API key")]
    InvalidApiKey,

    /// Server-sent events error
    #[error("SSE error: {0}")]
    Sse(String),

    /// The model finished without producing any text
    #[error("Empty response from model")]
    EmptyResponse,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create an API error from type and message
    pub fn api(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            error_type: error_type.into(),
            message: message.into(),
        }
    }

    /// Map an HTTP status and body to the closest error variant
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            401 | 403 => Error::Auth(body),
            _ => Error::api(format!("http_{}", status), body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let e = Error::api("invalid_request_error", "model does not exist");
        assert_eq!(
            e.to_string(),
            "API error: model does not exist (type: invalid_request_error)"
        );
    }

    #[test]
    fn test_from_status_auth() {
        let e = Error::from_status(401, "Invalid API Key");
        assert!(matches!(e, Error::Auth(ref m) if m == "Invalid API Key"));
    }

    #[test]
    fn test_from_status_server_error() {
        let e = Error::from_status(503, "overloaded");
        match e {
            Error::Api { error_type, message } => {
                assert_eq!(error_type, "http_503");
                assert_eq!(message, "overloaded");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_empty_response_display() {
        assert_eq!(Error::EmptyResponse.to_string(), "Empty response from model");
    }
}
