use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which orchestrator variant a stale feed read triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// One fixed scrape query appended to the shared table.
    Single,
    /// One scrape per industry category, replacing that category's rows.
    Industries,
}

impl std::fmt::Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncMode::Single => write!(f, "single"),
            SyncMode::Industries => write!(f, "industries"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub apify_api_token: Option<String>,
    pub gemini_api_key: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub sync_mode: SyncMode,
    pub stale_after_secs: u64,
    pub feed_limit: i64,
    pub transform_max_items: usize,
    pub apify_actor: String,
    pub apify_timeout_secs: u64,
    pub scrape_platforms: Vec<String>,
    pub scrape_region: String,
    pub scrape_time_range: String,
    pub scrape_max_trends: u32,
    pub gemini_fast_model: String,
    pub gemini_quality_model: String,
    pub http_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field(
                "apify_api_token",
                &self.apify_api_token.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("sync_mode", &self.sync_mode)
            .field("stale_after_secs", &self.stale_after_secs)
            .field("feed_limit", &self.feed_limit)
            .field("transform_max_items", &self.transform_max_items)
            .field("apify_actor", &self.apify_actor)
            .field("apify_timeout_secs", &self.apify_timeout_secs)
            .field("scrape_platforms", &self.scrape_platforms)
            .field("scrape_region", &self.scrape_region)
            .field("scrape_time_range", &self.scrape_time_range)
            .field("scrape_max_trends", &self.scrape_max_trends)
            .field("gemini_fast_model", &self.gemini_fast_model)
            .field("gemini_quality_model", &self.gemini_quality_model)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}
