use thiserror::Error;

/// Errors returned by the Gemini API client.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gemini answered with a non-2xx status.
    #[error("Gemini API error ({status}) for model {model}: {message}")]
    Api {
        status: u16,
        model: String,
        message: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for model {model}: {source}")]
    Deserialize {
        model: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    /// The prompt was blocked before any candidate was produced.
    #[error("prompt blocked by Gemini: {reason}")]
    Blocked { reason: String },

    /// A 2xx response carried no candidate text.
    #[error("Gemini returned no text for model {model}")]
    EmptyResponse { model: String },
}
