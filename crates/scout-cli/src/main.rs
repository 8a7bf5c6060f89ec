mod feed;
mod sync;

use clap::{Parser, Subcommand};
use scout_core::Category;
use scout_pipeline::SchemaPreset;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "scout-cli")]
#[command(about = "Content Scout command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape, transform and append one batch of trends
    Sync {
        /// Output schema preset: card or explained
        #[arg(long, default_value = "card", value_parser = parse_single_preset)]
        preset: SchemaPreset,
    },
    /// Replace each industry's trends with a fresh batch
    SyncIndustries {
        /// Restrict to these categories (slug or label); repeatable
        #[arg(long = "category")]
        categories: Vec<Category>,
    },
    /// Print the stored feed without syncing
    Feed {
        /// Number of rows to print (defaults to SCOUT_FEED_LIMIT)
        #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
        limit: Option<i64>,

        /// Only show one category (slug or label)
        #[arg(long)]
        category: Option<Category>,
    },
    /// List the industry categories and their slugs
    Categories,
}

/// The industry preset needs a category, which only `sync-industries` supplies.
fn parse_single_preset(value: &str) -> Result<SchemaPreset, String> {
    match value.parse::<SchemaPreset>()? {
        SchemaPreset::Industry => {
            Err("the industry preset is only used by sync-industries".to_string())
        }
        preset => Ok(preset),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Categories) {
        feed::print_categories();
        return Ok(());
    }

    let config = scout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = scout_db::PoolConfig::from_app_config(&config);
    let pool = scout_db::connect_pool(&config.database_url, pool_config).await?;
    scout_db::run_migrations(&pool).await?;

    match cli.command {
        Commands::Sync { preset } => sync::run_sync(&config, pool, preset).await,
        Commands::SyncIndustries { categories } => {
            sync::run_sync_industries(&config, pool, &categories).await
        }
        Commands::Feed { limit, category } => {
            feed::run_feed(&pool, limit.unwrap_or(config.feed_limit), category).await
        }
        Commands::Categories => Ok(()),
    }
}

#[cfg(test)]
mod tests;
