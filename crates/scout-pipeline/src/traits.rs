//! Seams between the pipeline and its external collaborators.
//!
//! The orchestrator and gate hold these as `Arc<dyn ...>` so production wires
//! in Postgres, Apify and Gemini while tests wire in-memory fakes.

use async_trait::async_trait;
use scout_apify::{ApifyClient, TrendScraperInput};
use scout_core::{Category, NewTrend, TrendRecord};
use scout_gemini::GeminiClient;
use serde_json::Value;

use crate::error::PipelineError;

/// Persistence for trend records.
#[async_trait]
pub trait TrendStore: Send + Sync {
    /// Up to `limit` records, newest first, ties broken by `id DESC`.
    async fn fetch_top(&self, limit: i64) -> Result<Vec<TrendRecord>, PipelineError>;

    async fn fetch_top_in_category(
        &self,
        category: Category,
        limit: i64,
    ) -> Result<Vec<TrendRecord>, PipelineError>;

    /// All-or-nothing insert. An empty slice must not touch storage.
    async fn insert_many(&self, trends: &[NewTrend]) -> Result<u64, PipelineError>;

    async fn delete_by_category(&self, category: Category) -> Result<u64, PipelineError>;

    /// Swaps a category's rows for `trends` atomically, returning
    /// `(replaced, inserted)`. On error the previous rows are untouched.
    async fn replace_category(
        &self,
        category: Category,
        trends: &[NewTrend],
    ) -> Result<(u64, u64), PipelineError>;
}

/// Source of raw, provider-shaped trend items.
#[async_trait]
pub trait TrendSource: Send + Sync {
    async fn scrape(&self, input: &TrendScraperInput) -> Result<Vec<Value>, PipelineError>;
}

/// A language model that answers a prompt with JSON text shaped by `schema`.
#[async_trait]
pub trait StructuredModel: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        schema: &Value,
    ) -> Result<String, PipelineError>;
}

/// [`TrendSource`] backed by one Apify actor.
pub struct ApifyTrendSource {
    client: ApifyClient,
    actor_id: String,
}

impl ApifyTrendSource {
    #[must_use]
    pub fn new(client: ApifyClient, actor_id: impl Into<String>) -> Self {
        Self {
            client,
            actor_id: actor_id.into(),
        }
    }
}

#[async_trait]
impl TrendSource for ApifyTrendSource {
    async fn scrape(&self, input: &TrendScraperInput) -> Result<Vec<Value>, PipelineError> {
        Ok(self.client.call_actor(&self.actor_id, input).await?)
    }
}

#[async_trait]
impl StructuredModel for GeminiClient {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        schema: &Value,
    ) -> Result<String, PipelineError> {
        Ok(self.generate_json(model, prompt, schema).await?)
    }
}

/// Stand-in used when `APIFY_API_TOKEN` is unset.
pub struct UnconfiguredSource;

#[async_trait]
impl TrendSource for UnconfiguredSource {
    async fn scrape(&self, _input: &TrendScraperInput) -> Result<Vec<Value>, PipelineError> {
        Err(PipelineError::NotConfigured("APIFY_API_TOKEN"))
    }
}

/// Stand-in used when `GEMINI_API_KEY` is unset.
pub struct UnconfiguredModel;

#[async_trait]
impl StructuredModel for UnconfiguredModel {
    async fn generate(
        &self,
        _model: &str,
        _prompt: &str,
        _schema: &Value,
    ) -> Result<String, PipelineError> {
        Err(PipelineError::NotConfigured("GEMINI_API_KEY"))
    }
}
