//! HTTP client for the Apify REST API (v2).
//!
//! Runs an actor, waits for it to reach a terminal status using Apify's
//! server-side `waitForFinish` long-poll, then pages through the run's default
//! dataset. Every non-2xx response is surfaced as [`ApifyError::Api`] with the
//! message from Apify's error envelope when one is present.

use std::time::{Duration, Instant};

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApifyError;
use crate::types::{ActorRun, DataEnvelope, ErrorEnvelope, RunStatus};

const DEFAULT_BASE_URL: &str = "https://api.apify.com/";

/// Apify caps `waitForFinish` at 60 seconds per request.
const MAX_WAIT_PER_POLL_SECS: u64 = 60;

/// Must exceed [`MAX_WAIT_PER_POLL_SECS`] so a long-poll is not cut short.
const REQUEST_TIMEOUT_SECS: u64 = 90;

const DATASET_PAGE_SIZE: usize = 1000;

/// Client for the Apify actor platform.
///
/// Use [`ApifyClient::new`] for production or [`ApifyClient::with_base_url`]
/// to point at a mock server in tests.
pub struct ApifyClient {
    client: Client,
    token: String,
    base_url: Url,
    /// Upper bound on how long [`ApifyClient::call_actor`] waits for a run.
    run_timeout_secs: u64,
}

/// Apify addresses actors as `username~actor-name` in URL paths.
fn actor_path(actor_id: &str) -> String {
    actor_id.replacen('/', "~", 1)
}

impl ApifyClient {
    /// Creates a new client pointed at the production Apify API.
    ///
    /// # Errors
    ///
    /// Returns [`ApifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(token: &str, run_timeout_secs: u64) -> Result<Self, ApifyError> {
        Self::with_base_url(token, run_timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ApifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ApifyError::InvalidBaseUrl`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        token: &str,
        run_timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ApifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("content-scout/0.1 (trend-sync)")
            .build()?;

        // Ensure exactly one trailing slash so `Url::join` appends path
        // segments instead of replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalised).map_err(|_| ApifyError::InvalidBaseUrl(base_url.to_owned()))?;

        Ok(Self {
            client,
            token: token.to_owned(),
            base_url,
            run_timeout_secs,
        })
    }

    /// Runs an actor to completion and returns every item in its default dataset.
    ///
    /// # Errors
    ///
    /// - [`ApifyError::RunFailed`] if the run ends in any status but `SUCCEEDED`.
    /// - [`ApifyError::RunTimedOut`] if the run outlives `run_timeout_secs`.
    /// - [`ApifyError::Api`], [`ApifyError::Http`], [`ApifyError::Deserialize`]
    ///   from the underlying requests.
    pub async fn call_actor<I>(&self, actor_id: &str, input: &I) -> Result<Vec<Value>, ApifyError>
    where
        I: Serialize + ?Sized,
    {
        let run = self.start_run(actor_id, input).await?;
        tracing::info!(
            actor = actor_id,
            run_id = %run.id,
            status = run.status.as_str(),
            "actor run started"
        );

        let run = self.wait_for_run(run).await?;
        if run.status != RunStatus::Succeeded {
            return Err(ApifyError::RunFailed {
                run_id: run.id,
                status: run.status.as_str().to_string(),
            });
        }

        let items = self.dataset_items(&run.default_dataset_id).await?;
        tracing::info!(
            actor = actor_id,
            run_id = %run.id,
            items = items.len(),
            "actor dataset fetched"
        );
        Ok(items)
    }

    /// Starts an actor run, letting Apify hold the request open for up to
    /// 60 seconds in case the run finishes quickly.
    ///
    /// # Errors
    ///
    /// Returns [`ApifyError`] on network failure, non-2xx status, or an
    /// unexpected response shape.
    pub async fn start_run<I>(&self, actor_id: &str, input: &I) -> Result<ActorRun, ApifyError>
    where
        I: Serialize + ?Sized,
    {
        let wait = self.run_timeout_secs.min(MAX_WAIT_PER_POLL_SECS);
        let url = self.endpoint(
            &format!("v2/acts/{}/runs", actor_path(actor_id)),
            &[("waitForFinish", &wait.to_string())],
        )?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;

        let envelope: DataEnvelope<ActorRun> =
            Self::parse_json(response, &format!("start run of {actor_id}")).await?;
        Ok(envelope.data)
    }

    /// Fetches the current state of a run, long-polling for up to `wait_secs`.
    ///
    /// # Errors
    ///
    /// Returns [`ApifyError`] on network failure, non-2xx status, or an
    /// unexpected response shape.
    pub async fn get_run(&self, run_id: &str, wait_secs: u64) -> Result<ActorRun, ApifyError> {
        let url = self.endpoint(
            &format!("v2/actor-runs/{run_id}"),
            &[("waitForFinish", &wait_secs.to_string())],
        )?;

        let response = self.client.get(url).bearer_auth(&self.token).send().await?;
        let envelope: DataEnvelope<ActorRun> =
            Self::parse_json(response, &format!("actor run {run_id}")).await?;
        Ok(envelope.data)
    }

    /// Reads every item of a dataset, one page of [`DATASET_PAGE_SIZE`] at a time.
    ///
    /// # Errors
    ///
    /// Returns [`ApifyError`] on network failure, non-2xx status, or a body
    /// that is not a JSON array.
    pub async fn dataset_items(&self, dataset_id: &str) -> Result<Vec<Value>, ApifyError> {
        let mut items = Vec::new();
        let limit = DATASET_PAGE_SIZE.to_string();

        loop {
            let offset = items.len().to_string();
            let url = self.endpoint(
                &format!("v2/datasets/{dataset_id}/items"),
                &[
                    ("clean", "true"),
                    ("format", "json"),
                    ("offset", &offset),
                    ("limit", &limit),
                ],
            )?;

            let response = self.client.get(url).bearer_auth(&self.token).send().await?;
            let page: Vec<Value> =
                Self::parse_json(response, &format!("dataset {dataset_id} items")).await?;

            let page_len = page.len();
            items.extend(page);
            if page_len < DATASET_PAGE_SIZE {
                break;
            }
        }

        Ok(items)
    }

    async fn wait_for_run(&self, mut run: ActorRun) -> Result<ActorRun, ApifyError> {
        let started = Instant::now();

        while !run.status.is_terminal() {
            let elapsed = started.elapsed().as_secs();
            if elapsed >= self.run_timeout_secs {
                return Err(ApifyError::RunTimedOut {
                    run_id: run.id,
                    waited_secs: elapsed,
                });
            }

            let wait = (self.run_timeout_secs - elapsed).min(MAX_WAIT_PER_POLL_SECS);
            tracing::debug!(
                run_id = %run.id,
                status = run.status.as_str(),
                wait,
                "waiting for actor run"
            );
            run = self.get_run(&run.id, wait).await?;
        }

        Ok(run)
    }

    /// Joins `path` onto the base URL and appends percent-encoded query pairs.
    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ApifyError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|_| ApifyError::InvalidBaseUrl(format!("{}{path}", self.base_url)))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Asserts a 2xx status and deserializes the body.
    async fn parse_json<T: DeserializeOwned>(
        response: Response,
        context: &str,
    ) -> Result<T, ApifyError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ApifyError::Api {
                status: status.as_u16(),
                context: context.to_owned(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| ApifyError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}
