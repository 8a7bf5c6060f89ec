//! Trend sync pipeline for Content Scout.
//!
//! Scrapes raw trend items through an Apify actor, reshapes them into the
//! card schema with a Gemini structured-output call, and stores the result in
//! `trending_topics`. The [`FreshnessGate`] decides per read whether the stored
//! feed is recent enough to serve or must be re-synced first.
//!
//! Every external collaborator sits behind a trait in [`traits`] so the
//! orchestrator and gate can be exercised with in-memory fakes.

pub mod error;
pub mod freshness;
pub mod schema;
pub mod store;
pub mod sync;
pub mod traits;
pub mod transform;

#[cfg(test)]
mod testing;

pub use error::PipelineError;
pub use freshness::{is_stale, FeedRead, FeedStatus, FreshnessGate};
pub use schema::{ModelTier, SchemaDescriptor, SchemaPreset};
pub use store::PgTrendStore;
pub use sync::{ScrapeSettings, SyncReport, SyncStage, TrendSync, UnitOutcome, UnitReport};
pub use traits::{
    ApifyTrendSource, StructuredModel, TrendSource, TrendStore, UnconfiguredModel,
    UnconfiguredSource,
};
pub use transform::{TransformOutput, TransformSettings, Transformer};
