use thiserror::Error;

pub mod app_config;
mod config;
pub mod trends;

pub use app_config::{AppConfig, Environment, SyncMode};
pub use config::{load_app_config, load_app_config_from_env};
pub use trends::{Category, NewTrend, PlatformIcon, TrendRecord};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown platform icon: {0}")]
    UnknownPlatformIcon(String),

    #[error("unknown category: {0}")]
    UnknownCategory(String),
}
