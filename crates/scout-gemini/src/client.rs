//! HTTP client for the Gemini REST API (`v1beta`).

use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::GeminiError;
use crate::types::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";

/// Client for Gemini structured generation.
///
/// Use [`GeminiClient::new`] for production or [`GeminiClient::with_base_url`]
/// to point at a mock server in tests.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl GeminiClient {
    /// Creates a new client pointed at the production Gemini API.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, GeminiError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeminiError::InvalidBaseUrl`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GeminiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("content-scout/0.1 (trend-transform)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|_| GeminiError::InvalidBaseUrl(base_url.to_owned()))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Asks `model` for a JSON document conforming to `schema` and returns the
    /// raw text of the first candidate.
    ///
    /// The text is not parsed here; callers own validation of model output.
    ///
    /// # Errors
    ///
    /// - [`GeminiError::Api`] on a non-2xx status.
    /// - [`GeminiError::Blocked`] if the prompt was refused.
    /// - [`GeminiError::EmptyResponse`] if no candidate carried text.
    /// - [`GeminiError::Http`] or [`GeminiError::Deserialize`] otherwise.
    pub async fn generate_json(
        &self,
        model: &str,
        prompt: &str,
        schema: &Value,
    ) -> Result<String, GeminiError> {
        let url = self
            .base_url
            .join(&format!("v1beta/models/{model}:generateContent"))
            .map_err(|_| GeminiError::InvalidBaseUrl(format!("{}{model}", self.base_url)))?;

        let request = GenerateContentRequest::structured(prompt, schema);
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GeminiError::Api {
                status: status.as_u16(),
                model: model.to_owned(),
                message,
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| GeminiError::Deserialize {
                model: model.to_owned(),
                source: e,
            })?;

        if let Some(text) = parsed.first_text() {
            tracing::debug!(model, chars = text.len(), "gemini response received");
            return Ok(text);
        }

        let block_reason = parsed
            .prompt_feedback
            .and_then(|f| f.block_reason);
        match block_reason {
            Some(reason) => Err(GeminiError::Blocked { reason }),
            None => Err(GeminiError::EmptyResponse {
                model: model.to_owned(),
            }),
        }
    }
}
