//! Client for the Apify actor platform, used to run the social-media trend
//! scraper and read back its dataset.

pub mod client;
pub mod error;
pub mod types;

pub use client::ApifyClient;
pub use error::ApifyError;
pub use types::{ActorRun, RunStatus, TrendScraperInput};
