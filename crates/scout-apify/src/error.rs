use thiserror::Error;

/// Errors returned by the Apify API client.
#[derive(Debug, Error)]
pub enum ApifyError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Apify answered with a non-2xx status.
    #[error("Apify API error ({status}) for {context}: {message}")]
    Api {
        status: u16,
        context: String,
        message: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    /// The actor run reached a terminal status other than `SUCCEEDED`.
    #[error("actor run {run_id} finished with status {status}")]
    RunFailed { run_id: String, status: String },

    /// The actor run was still going when the client stopped waiting.
    #[error("actor run {run_id} did not finish within {waited_secs}s")]
    RunTimedOut { run_id: String, waited_secs: u64 },
}
