use chrono::{TimeZone, Utc};
use clap::Parser;
use scout_core::{Category, NewTrend, PlatformIcon, TrendRecord};
use scout_pipeline::{SchemaPreset, SyncStage, UnitOutcome};

use super::*;

#[test]
fn parses_sync_with_default_preset() {
    let cli = Cli::try_parse_from(["scout-cli", "sync"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Sync {
            preset: SchemaPreset::Card
        }
    ));
}

#[test]
fn parses_sync_with_explained_preset() {
    let cli = Cli::try_parse_from(["scout-cli", "sync", "--preset", "explained"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Sync {
            preset: SchemaPreset::Explained
        }
    ));
}

#[test]
fn rejects_unknown_preset() {
    assert!(Cli::try_parse_from(["scout-cli", "sync", "--preset", "poster"]).is_err());
}

#[test]
fn sync_rejects_industry_preset() {
    let err = Cli::try_parse_from(["scout-cli", "sync", "--preset", "industry"])
        .expect_err("industry preset needs a category");
    assert!(err.to_string().contains("sync-industries"));
}

#[test]
fn parses_repeated_categories_by_slug_or_label() {
    let cli = Cli::try_parse_from([
        "scout-cli",
        "sync-industries",
        "--category",
        "real-estate",
        "--category",
        "Creator Economy",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Commands::SyncIndustries { categories } => assert_eq!(
            categories,
            vec![Category::RealEstate, Category::CreatorEconomy]
        ),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn sync_industries_without_filter_is_empty() {
    let cli = Cli::try_parse_from(["scout-cli", "sync-industries"]).expect("valid");
    assert!(matches!(
        cli.command,
        Commands::SyncIndustries { ref categories } if categories.is_empty()
    ));
}

#[test]
fn parses_feed_options() {
    let cli = Cli::try_parse_from([
        "scout-cli",
        "feed",
        "--limit",
        "3",
        "--category",
        "finance-fintech",
    ])
    .expect("valid");
    assert!(matches!(
        cli.command,
        Commands::Feed {
            limit: Some(3),
            category: Some(Category::FinanceFintech)
        }
    ));
}

#[test]
fn feed_rejects_non_positive_limit() {
    assert!(Cli::try_parse_from(["scout-cli", "feed", "--limit", "0"]).is_err());
    assert!(Cli::try_parse_from(["scout-cli", "feed", "--limit", "-5"]).is_err());
}

#[test]
fn rejects_unknown_category() {
    assert!(Cli::try_parse_from(["scout-cli", "feed", "--category", "gardening"]).is_err());
}

#[test]
fn requires_a_command() {
    assert!(Cli::try_parse_from(["scout-cli"]).is_err());
}

#[test]
fn describe_outcomes() {
    assert_eq!(
        sync::describe(&UnitOutcome::Stored {
            inserted: 4,
            rejected: 1,
            replaced: 3
        }),
        "stored 4 (rejected 1, replaced 3)"
    );
    assert_eq!(sync::describe(&UnitOutcome::NoData), "no data");
    assert_eq!(
        sync::describe(&UnitOutcome::Failed {
            stage: SyncStage::Scrape,
            reason: "APIFY_API_TOKEN is not configured".to_string()
        }),
        "failed at scrape: APIFY_API_TOKEN is not configured"
    );
}

#[test]
fn format_record_includes_category_when_set() {
    let record = TrendRecord {
        id: 12,
        created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
        trend: NewTrend {
            topic_name: "Rates drop".to_string(),
            short_description: "Buyers return".to_string(),
            trending_context: None,
            platform_icon: PlatformIcon::X,
            hashtags: vec!["#homes".to_string(), "#rates".to_string()],
            source: None,
            category: Some(Category::RealEstate),
        },
    };
    assert_eq!(
        feed::format_record(&record),
        "[12] 2026-03-01 09:30 icon-x | Rates drop | Buyers return #homes #rates (Real Estate)"
    );
}
