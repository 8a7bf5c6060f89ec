//! Scrape -> transform -> store orchestration.
//!
//! Two modes share one code path. Single-query sync appends one `card` batch
//! to the shared table. Multi-industry sync walks [`Category::ALL`] in order
//! and replaces each category's rows with a fresh `industry` batch. Every unit
//! of work ends in an explicit [`UnitOutcome`]; nothing is swallowed.

use std::fmt;
use std::sync::Arc;

use scout_apify::{ApifyClient, TrendScraperInput};
use scout_core::{AppConfig, Category, SyncMode};
use scout_gemini::GeminiClient;

use crate::error::PipelineError;
use crate::schema::SchemaDescriptor;
use crate::traits::{
    ApifyTrendSource, StructuredModel, TrendSource, TrendStore, UnconfiguredModel,
    UnconfiguredSource,
};
use crate::transform::{TransformSettings, Transformer};

/// Actor input fields shared by every scrape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeSettings {
    pub platforms: Vec<String>,
    pub region: String,
    pub time_range: String,
    pub max_trends: u32,
}

impl ScrapeSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            platforms: config.scrape_platforms.clone(),
            region: config.scrape_region.clone(),
            time_range: config.scrape_time_range.clone(),
            max_trends: config.scrape_max_trends,
        }
    }

    #[must_use]
    pub fn input(&self, keywords: Option<&str>) -> TrendScraperInput {
        TrendScraperInput {
            platforms: self.platforms.clone(),
            region: self.region.clone(),
            time_range: self.time_range.clone(),
            max_trends: self.max_trends,
            include_metrics: false,
            enable_comparison: false,
            comparison_type: "comprehensive".to_string(),
            keywords: keywords.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    Scrape,
    Transform,
    Insert,
    Replace,
}

impl SyncStage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SyncStage::Scrape => "scrape",
            SyncStage::Transform => "transform",
            SyncStage::Insert => "insert",
            SyncStage::Replace => "replace",
        }
    }
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one scrape -> transform -> store unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// `replaced` counts rows deleted before the insert (industry mode only).
    Stored {
        inserted: u64,
        rejected: usize,
        replaced: u64,
    },
    /// The scraper returned nothing; the store was not touched.
    NoData,
    Failed {
        stage: SyncStage,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    /// `None` for a single-query sync.
    pub category: Option<Category>,
    pub outcome: UnitOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub units: Vec<UnitReport>,
}

impl SyncReport {
    #[must_use]
    pub fn inserted(&self) -> u64 {
        self.units
            .iter()
            .map(|u| match u.outcome {
                UnitOutcome::Stored { inserted, .. } => inserted,
                _ => 0,
            })
            .sum()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.units
            .iter()
            .filter(|u| matches!(u.outcome, UnitOutcome::Failed { .. }))
            .count()
    }

    #[must_use]
    pub fn no_data(&self) -> usize {
        self.units
            .iter()
            .filter(|u| matches!(u.outcome, UnitOutcome::NoData))
            .count()
    }
}

pub struct TrendSync {
    store: Arc<dyn TrendStore>,
    source: Arc<dyn TrendSource>,
    transformer: Transformer,
    scrape: ScrapeSettings,
}

impl TrendSync {
    #[must_use]
    pub fn new(
        store: Arc<dyn TrendStore>,
        source: Arc<dyn TrendSource>,
        transformer: Transformer,
        scrape: ScrapeSettings,
    ) -> Self {
        Self {
            store,
            source,
            transformer,
            scrape,
        }
    }

    /// Wires the Apify and Gemini clients from config.
    ///
    /// A missing credential is logged and replaced by a stand-in that fails
    /// every unit with "not configured", so reads keep working.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if an HTTP client cannot be constructed.
    pub fn from_app_config(
        config: &AppConfig,
        store: Arc<dyn TrendStore>,
    ) -> Result<Self, PipelineError> {
        let source: Arc<dyn TrendSource> = match config.apify_api_token.as_deref() {
            Some(token) => Arc::new(ApifyTrendSource::new(
                ApifyClient::new(token, config.apify_timeout_secs)?,
                config.apify_actor.clone(),
            )),
            None => {
                tracing::warn!("APIFY_API_TOKEN not set; syncs will fail at the scrape stage");
                Arc::new(UnconfiguredSource)
            }
        };

        let model: Arc<dyn StructuredModel> = match config.gemini_api_key.as_deref() {
            Some(key) => Arc::new(GeminiClient::new(key, config.http_timeout_secs)?),
            None => {
                tracing::warn!("GEMINI_API_KEY not set; syncs will fail at the transform stage");
                Arc::new(UnconfiguredModel)
            }
        };

        Ok(Self::new(
            store,
            source,
            Transformer::new(model, TransformSettings::from_app_config(config)),
            ScrapeSettings::from_app_config(config),
        ))
    }

    /// Runs the configured mode across its default scope.
    pub async fn run(&self, mode: SyncMode) -> SyncReport {
        match mode {
            SyncMode::Single => self.sync_single(&SchemaDescriptor::CARD).await,
            SyncMode::Industries => self.sync_industries(&Category::ALL).await,
        }
    }

    /// One scrape with no keyword focus, appended to the shared table.
    pub async fn sync_single(&self, descriptor: &SchemaDescriptor) -> SyncReport {
        let outcome = self.run_unit(descriptor, None).await;
        log_outcome(None, &outcome);
        SyncReport {
            units: vec![UnitReport {
                category: None,
                outcome,
            }],
        }
    }

    /// Replaces each category's rows in turn. A failure in one category never
    /// stops the next.
    pub async fn sync_industries(&self, categories: &[Category]) -> SyncReport {
        let mut report = SyncReport::default();
        for &category in categories {
            let outcome = self
                .run_unit(&SchemaDescriptor::INDUSTRY, Some(category))
                .await;
            log_outcome(Some(category), &outcome);
            report.units.push(UnitReport {
                category: Some(category),
                outcome,
            });
        }

        tracing::info!(
            categories = report.units.len(),
            inserted = report.inserted(),
            failed = report.failed(),
            no_data = report.no_data(),
            "industry sync complete"
        );
        report
    }

    async fn run_unit(
        &self,
        descriptor: &SchemaDescriptor,
        category: Option<Category>,
    ) -> UnitOutcome {
        let input = self.scrape.input(category.map(Category::label));
        let raw = match self.source.scrape(&input).await {
            Ok(raw) => raw,
            Err(e) => return failed(SyncStage::Scrape, &e),
        };
        if raw.is_empty() {
            return UnitOutcome::NoData;
        }

        let output = match self.transformer.transform(&raw, descriptor, category).await {
            Ok(output) => output,
            Err(e) => return failed(SyncStage::Transform, &e),
        };

        // Nothing survived validation: keep whatever is already stored.
        if output.trends.is_empty() {
            return UnitOutcome::Stored {
                inserted: 0,
                rejected: output.rejected,
                replaced: 0,
            };
        }

        let Some(category) = category else {
            return match self.store.insert_many(&output.trends).await {
                Ok(inserted) => UnitOutcome::Stored {
                    inserted,
                    rejected: output.rejected,
                    replaced: 0,
                },
                Err(e) => failed(SyncStage::Insert, &e),
            };
        };

        match self.store.replace_category(category, &output.trends).await {
            Ok((replaced, inserted)) => UnitOutcome::Stored {
                inserted,
                rejected: output.rejected,
                replaced,
            },
            Err(e) => failed(SyncStage::Replace, &e),
        }
    }
}

fn failed(stage: SyncStage, error: &PipelineError) -> UnitOutcome {
    UnitOutcome::Failed {
        stage,
        reason: error.to_string(),
    }
}

fn log_outcome(category: Option<Category>, outcome: &UnitOutcome) {
    let category = category.map_or("-", Category::label);
    match outcome {
        UnitOutcome::Stored {
            inserted,
            rejected,
            replaced,
        } => tracing::info!(category, inserted, rejected, replaced, "trends stored"),
        UnitOutcome::NoData => tracing::info!(category, "scraper returned no items"),
        UnitOutcome::Failed { stage, reason } => {
            tracing::error!(category, stage = stage.as_str(), error = %reason, "sync unit failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use chrono::Utc;

    use super::*;
    use crate::testing::{trend, FakeModel, FakeSource, FakeStore};

    fn scrape_settings() -> ScrapeSettings {
        ScrapeSettings {
            platforms: vec!["reddit".to_string()],
            region: "IN".to_string(),
            time_range: "4h".to_string(),
            max_trends: 25,
        }
    }

    fn build(store: Arc<FakeStore>, source: Arc<FakeSource>, model: Arc<FakeModel>) -> TrendSync {
        let transformer = Transformer::new(
            model,
            TransformSettings {
                fast_model: "fast".to_string(),
                quality_model: "quality".to_string(),
                max_items: 12,
            },
        );
        TrendSync::new(store, source, transformer, scrape_settings())
    }

    fn card_reply() -> String {
        serde_json::json!({
            "trends": [
                {
                    "topic_name": "Agents everywhere",
                    "short_description": "Teams ship AI agents",
                    "platform_icon": "icon-linkedin",
                    "hashtags": ["#AI", "#SaaS"]
                },
                {
                    "topic_name": "Broken",
                    "short_description": "No icon here",
                    "hashtags": ["#a", "#b"]
                }
            ]
        })
        .to_string()
    }

    #[test]
    fn scrape_input_sets_keywords_only_when_given() {
        let settings = scrape_settings();
        assert_eq!(settings.input(None).keywords, None);
        let input = settings.input(Some("Real Estate"));
        assert_eq!(input.keywords.as_deref(), Some("Real Estate"));
        assert_eq!(input.comparison_type, "comprehensive");
        assert!(!input.include_metrics);
    }

    #[tokio::test]
    async fn single_sync_persists_valid_records_and_counts_rejections() {
        let store = Arc::new(FakeStore::default());
        let sync = build(
            store.clone(),
            Arc::new(FakeSource::with_items(20)),
            Arc::new(FakeModel::replying(card_reply())),
        );

        let report = sync.sync_single(&SchemaDescriptor::CARD).await;

        assert_eq!(
            report.units[0].outcome,
            UnitOutcome::Stored {
                inserted: 1,
                rejected: 1,
                replaced: 0
            }
        );
        let rows = store.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].trend.topic_name, "Agents everywhere");
        assert_eq!(rows[0].trend.category, None);
    }

    #[tokio::test]
    async fn single_sync_appends_without_deleting() {
        let store = Arc::new(FakeStore::default());
        store.seed(trend("Older"), Utc::now());
        let sync = build(
            store.clone(),
            Arc::new(FakeSource::with_items(3)),
            Arc::new(FakeModel::replying(card_reply())),
        );

        sync.run(SyncMode::Single).await;
        assert_eq!(store.rows().len(), 2);
    }

    #[tokio::test]
    async fn empty_scrape_short_circuits() {
        let store = Arc::new(FakeStore::default());
        let model = Arc::new(FakeModel::replying(card_reply()));
        let sync = build(store.clone(), Arc::new(FakeSource::with_items(0)), model.clone());

        let report = sync.sync_single(&SchemaDescriptor::CARD).await;

        assert_eq!(report.units[0].outcome, UnitOutcome::NoData);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.insert_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transform_failure_is_reported_with_stage() {
        let store = Arc::new(FakeStore::default());
        let sync = build(
            store.clone(),
            Arc::new(FakeSource::with_items(3)),
            Arc::new(FakeModel::replying("not json at all")),
        );

        let report = sync.sync_single(&SchemaDescriptor::CARD).await;

        assert!(matches!(
            report.units[0].outcome,
            UnitOutcome::Failed {
                stage: SyncStage::Transform,
                ..
            }
        ));
        assert!(store.rows().is_empty());
    }

    #[tokio::test]
    async fn insert_failure_is_reported_with_stage() {
        let store = Arc::new(FakeStore::default());
        store.fail_inserts.store(true, Ordering::SeqCst);
        let sync = build(
            store.clone(),
            Arc::new(FakeSource::with_items(3)),
            Arc::new(FakeModel::replying(card_reply())),
        );

        let report = sync.sync_single(&SchemaDescriptor::CARD).await;
        assert!(matches!(
            report.units[0].outcome,
            UnitOutcome::Failed {
                stage: SyncStage::Insert,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn industry_sync_isolates_a_failing_category() {
        let a = Category::TechnologySoftware;
        let b = Category::FinanceFintech;
        let c = Category::HealthWellness;

        let store = Arc::new(FakeStore::default());
        let mut source = FakeSource::with_items(5);
        source.failing = vec![b.label().to_string()];
        let sync = build(
            store.clone(),
            Arc::new(source),
            Arc::new(FakeModel::valid_industry()),
        );

        let report = sync.sync_industries(&[a, b, c]).await;

        assert_eq!(report.units.len(), 3);
        assert!(matches!(
            report.units[1].outcome,
            UnitOutcome::Failed {
                stage: SyncStage::Scrape,
                ..
            }
        ));
        assert_eq!(report.failed(), 1);
        assert_eq!(report.inserted(), 4);

        let rows = store.rows();
        assert_eq!(rows.iter().filter(|r| r.trend.category == Some(a)).count(), 2);
        assert_eq!(rows.iter().filter(|r| r.trend.category == Some(b)).count(), 0);
        assert_eq!(rows.iter().filter(|r| r.trend.category == Some(c)).count(), 2);
    }

    #[tokio::test]
    async fn industry_sync_replaces_prior_rows_per_category() {
        let store = Arc::new(FakeStore::default());
        let mut stale = trend("Stale");
        stale.category = Some(Category::RealEstate);
        store.seed(stale.clone(), Utc::now());
        store.seed(stale, Utc::now());
        let mut other = trend("Other");
        other.category = Some(Category::CreatorEconomy);
        store.seed(other, Utc::now());

        let sync = build(
            store.clone(),
            Arc::new(FakeSource::with_items(5)),
            Arc::new(FakeModel::valid_industry()),
        );
        let report = sync.sync_industries(&[Category::RealEstate]).await;

        assert_eq!(
            report.units[0].outcome,
            UnitOutcome::Stored {
                inserted: 2,
                rejected: 0,
                replaced: 2
            }
        );
        let rows = store.rows();
        assert_eq!(rows.len(), 3);
        assert!(rows
            .iter()
            .filter(|r| r.trend.category == Some(Category::RealEstate))
            .all(|r| r.trend.topic_name != "Stale"));
    }

    #[tokio::test]
    async fn industry_sync_keeps_prior_rows_when_scrape_is_empty() {
        let store = Arc::new(FakeStore::default());
        let mut kept = trend("Kept");
        kept.category = Some(Category::RealEstate);
        store.seed(kept, Utc::now());

        let mut source = FakeSource::with_items(5);
        source.empty = vec![Category::RealEstate.label().to_string()];
        let sync = build(
            store.clone(),
            Arc::new(source),
            Arc::new(FakeModel::valid_industry()),
        );

        let report = sync.sync_industries(&[Category::RealEstate]).await;

        assert_eq!(report.units[0].outcome, UnitOutcome::NoData);
        assert_eq!(report.no_data(), 1);
        assert_eq!(store.rows()[0].trend.topic_name, "Kept");
    }

    #[tokio::test]
    async fn industry_sync_keeps_prior_rows_when_replace_fails() {
        let store = Arc::new(FakeStore::default());
        let mut kept = trend("Kept");
        kept.category = Some(Category::RealEstate);
        store.seed(kept, Utc::now());
        store.fail_inserts.store(true, Ordering::SeqCst);

        let sync = build(
            store.clone(),
            Arc::new(FakeSource::with_items(5)),
            Arc::new(FakeModel::valid_industry()),
        );
        let report = sync.sync_industries(&[Category::RealEstate]).await;

        assert!(matches!(
            report.units[0].outcome,
            UnitOutcome::Failed {
                stage: SyncStage::Replace,
                ..
            }
        ));
        let rows = store.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].trend.topic_name, "Kept");
    }

    #[tokio::test]
    async fn industry_sync_isolates_a_transform_failure() {
        let a = Category::TechnologySoftware;
        let b = Category::FinanceFintech;
        let c = Category::HealthWellness;

        let store = Arc::new(FakeStore::default());
        let model = Arc::new(FakeModel::valid_industry());
        let valid = model.fallback_text();
        model.push_reply(&valid);
        model.push_reply("not json at all");
        let sync = build(store.clone(), Arc::new(FakeSource::with_items(5)), model);

        let report = sync.sync_industries(&[a, b, c]).await;

        assert!(matches!(
            report.units[1].outcome,
            UnitOutcome::Failed {
                stage: SyncStage::Transform,
                ..
            }
        ));
        assert_eq!(report.failed(), 1);
        assert_eq!(report.inserted(), 4);

        let rows = store.rows();
        assert_eq!(rows.iter().filter(|r| r.trend.category == Some(a)).count(), 2);
        assert_eq!(rows.iter().filter(|r| r.trend.category == Some(b)).count(), 0);
        assert_eq!(rows.iter().filter(|r| r.trend.category == Some(c)).count(), 2);
    }

    #[tokio::test]
    async fn industry_sync_with_all_records_rejected_keeps_prior_rows() {
        let store = Arc::new(FakeStore::default());
        let mut kept = trend("Kept");
        kept.category = Some(Category::CreatorEconomy);
        store.seed(kept, Utc::now());

        let model = Arc::new(FakeModel::valid_industry());
        model.push_reply(
            &serde_json::json!({
                "trends": [
                    { "topic_name": "No icon", "short_description": "x", "hashtags": ["#a", "#b"] },
                    { "topic_name": "No context", "short_description": "y",
                      "platform_icon": "icon-x", "hashtags": ["#a", "#b"] }
                ]
            })
            .to_string(),
        );
        let sync = build(store.clone(), Arc::new(FakeSource::with_items(3)), model);

        let report = sync.sync_industries(&[Category::CreatorEconomy]).await;

        assert_eq!(
            report.units[0].outcome,
            UnitOutcome::Stored {
                inserted: 0,
                rejected: 2,
                replaced: 0
            }
        );
        assert_eq!(store.insert_calls.load(Ordering::SeqCst), 0);
        let rows = store.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].trend.topic_name, "Kept");
    }

    #[tokio::test]
    async fn industry_sync_passes_category_to_scraper_and_prompt() {
        let store = Arc::new(FakeStore::default());
        let source = Arc::new(FakeSource::with_items(2));
        let model = Arc::new(FakeModel::valid_industry());
        let sync = build(store, source.clone(), model.clone());

        sync.sync_industries(&[Category::EducationEdtech]).await;

        assert_eq!(
            *source.seen_keywords.lock().unwrap(),
            vec![Some("Education & EdTech".to_string())]
        );
        assert!(model.prompts.lock().unwrap()[0].contains("Education & EdTech industry"));
    }

    #[tokio::test]
    async fn run_industries_walks_every_category_in_order() {
        let source = Arc::new(FakeSource::with_items(1));
        let sync = build(
            Arc::new(FakeStore::default()),
            source.clone(),
            Arc::new(FakeModel::valid_industry()),
        );

        let report = sync.run(SyncMode::Industries).await;

        let order: Vec<Option<Category>> = report.units.iter().map(|u| u.category).collect();
        assert_eq!(order, Category::ALL.map(Some).to_vec());
        assert_eq!(source.calls.load(Ordering::SeqCst), Category::ALL.len());
    }

    #[tokio::test]
    async fn unconfigured_source_fails_every_unit() {
        let transformer = Transformer::new(
            Arc::new(UnconfiguredModel),
            TransformSettings {
                fast_model: "fast".to_string(),
                quality_model: "quality".to_string(),
                max_items: 12,
            },
        );
        let sync = TrendSync::new(
            Arc::new(FakeStore::default()),
            Arc::new(UnconfiguredSource),
            transformer,
            scrape_settings(),
        );

        let report = sync.sync_single(&SchemaDescriptor::CARD).await;
        match &report.units[0].outcome {
            UnitOutcome::Failed { stage, reason } => {
                assert_eq!(*stage, SyncStage::Scrape);
                assert_eq!(reason, "APIFY_API_TOKEN is not configured");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
