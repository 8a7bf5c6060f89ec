use std::str::FromStr;

use crate::app_config::{AppConfig, Environment, SyncMode};
use crate::ConfigError;

const DEFAULT_APIFY_ACTOR: &str = "manju4k/social-media-trend-scraper-6-in-1-ai-analysis";
const DEFAULT_SCRAPE_PLATFORMS: &str = "instagram,youtube,reddit,twitter";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim().to_string())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let database_url = require("DATABASE_URL")?;
    let apify_api_token = optional("APIFY_API_TOKEN");
    let gemini_api_key = optional("GEMINI_API_KEY");

    let env = parse_environment(&or_default("SCOUT_ENV", "development"));
    let bind_addr: SocketAddr = parse_or(&optional, "SCOUT_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("SCOUT_LOG_LEVEL", "info");

    let db_max_connections = parse_or(&optional, "SCOUT_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_or(&optional, "SCOUT_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_or(&optional, "SCOUT_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let sync_mode = parse_sync_mode(&or_default("SCOUT_SYNC_MODE", "single"))?;
    let stale_after_secs = parse_or(&optional, "SCOUT_STALE_AFTER_SECS", "21600")?;
    let feed_limit: i64 = parse_or(&optional, "SCOUT_FEED_LIMIT", "10")?;
    if feed_limit < 1 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SCOUT_FEED_LIMIT".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let transform_max_items: usize = parse_or(&optional, "SCOUT_TRANSFORM_MAX_ITEMS", "12")?;
    if transform_max_items == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SCOUT_TRANSFORM_MAX_ITEMS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let apify_actor = or_default("SCOUT_APIFY_ACTOR", DEFAULT_APIFY_ACTOR);
    let apify_timeout_secs = parse_or(&optional, "SCOUT_APIFY_TIMEOUT_SECS", "600")?;
    let scrape_platforms = split_list(&or_default(
        "SCOUT_SCRAPE_PLATFORMS",
        DEFAULT_SCRAPE_PLATFORMS,
    ));
    if scrape_platforms.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "SCOUT_SCRAPE_PLATFORMS".to_string(),
            reason: "must list at least one platform".to_string(),
        });
    }
    let scrape_region = or_default("SCOUT_SCRAPE_REGION", "IN");
    let scrape_time_range = or_default("SCOUT_SCRAPE_TIME_RANGE", "4h");
    let scrape_max_trends = parse_or(&optional, "SCOUT_SCRAPE_MAX_TRENDS", "25")?;

    let gemini_fast_model = or_default("SCOUT_GEMINI_FAST_MODEL", "gemini-2.5-flash");
    let gemini_quality_model = or_default("SCOUT_GEMINI_QUALITY_MODEL", "gemini-2.5-pro");
    let http_timeout_secs = parse_or(&optional, "SCOUT_HTTP_TIMEOUT_SECS", "120")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        apify_api_token,
        gemini_api_key,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        sync_mode,
        stale_after_secs,
        feed_limit,
        transform_max_items,
        apify_actor,
        apify_timeout_secs,
        scrape_platforms,
        scrape_region,
        scrape_time_range,
        scrape_max_trends,
        gemini_fast_model,
        gemini_quality_model,
        http_timeout_secs,
    })
}

fn parse_or<T, F>(optional: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = optional(var).unwrap_or_else(|| default.to_string());
    raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

fn parse_sync_mode(s: &str) -> Result<SyncMode, ConfigError> {
    match s {
        "single" => Ok(SyncMode::Single),
        "industries" => Ok(SyncMode::Industries),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SCOUT_SYNC_MODE".to_string(),
            reason: format!("expected 'single' or 'industries', got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
