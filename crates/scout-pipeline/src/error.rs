use scout_apify::ApifyError;
use scout_db::DbError;
use scout_gemini::GeminiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A collaborator was left unbuilt because its credential is missing.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("scrape failed: {0}")]
    Scrape(#[from] ApifyError),

    #[error("model call failed: {0}")]
    Model(#[from] GeminiError),

    #[error("model output is not valid JSON: {0}")]
    MalformedOutput(#[source] serde_json::Error),

    #[error("model output has no `trends` array")]
    MissingTrends,

    #[error("store error: {0}")]
    Store(#[from] DbError),
}
