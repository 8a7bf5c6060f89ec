//! Manual sync commands.

use std::sync::Arc;

use scout_core::{AppConfig, Category};
use scout_pipeline::{PgTrendStore, SchemaPreset, SyncReport, TrendSync, UnitOutcome};

/// `sync`: one scrape appended to the shared table.
///
/// # Errors
///
/// Returns an error if the pipeline clients cannot be built.
pub(crate) async fn run_sync(
    config: &AppConfig,
    pool: sqlx::PgPool,
    preset: SchemaPreset,
) -> anyhow::Result<()> {
    if config.apify_api_token.is_none() {
        println!("APIFY_API_TOKEN is not set; nothing to sync.");
        return Ok(());
    }

    let sync = TrendSync::from_app_config(config, Arc::new(PgTrendStore::new(pool)))?;
    println!("Syncing trends with the {preset} preset...");
    let report = sync.sync_single(preset.descriptor()).await;
    print_report(&report);
    Ok(())
}

/// `sync-industries`: replaces each category's rows in turn.
///
/// An empty `categories` slice means every category.
///
/// # Errors
///
/// Returns an error if the pipeline clients cannot be built.
pub(crate) async fn run_sync_industries(
    config: &AppConfig,
    pool: sqlx::PgPool,
    categories: &[Category],
) -> anyhow::Result<()> {
    if config.apify_api_token.is_none() {
        println!("APIFY_API_TOKEN is not set; nothing to sync.");
        return Ok(());
    }

    let scope: &[Category] = if categories.is_empty() {
        &Category::ALL
    } else {
        categories
    };

    let sync = TrendSync::from_app_config(config, Arc::new(PgTrendStore::new(pool)))?;
    println!("Syncing {} categories...", scope.len());
    let report = sync.sync_industries(scope).await;
    print_report(&report);
    Ok(())
}

fn print_report(report: &SyncReport) {
    for unit in &report.units {
        let label = unit.category.map_or("feed", Category::label);
        println!("  {label:<24} {}", describe(&unit.outcome));
    }
    println!(
        "Done: {} inserted, {} failed, {} without data.",
        report.inserted(),
        report.failed(),
        report.no_data()
    );
}

pub(crate) fn describe(outcome: &UnitOutcome) -> String {
    match outcome {
        UnitOutcome::Stored {
            inserted,
            rejected,
            replaced,
        } => format!("stored {inserted} (rejected {rejected}, replaced {replaced})"),
        UnitOutcome::NoData => "no data".to_string(),
        UnitOutcome::Failed { stage, reason } => format!("failed at {stage}: {reason}"),
    }
}
