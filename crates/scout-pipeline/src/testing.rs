//! In-memory fakes for the pipeline's trait seams.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scout_apify::{ApifyError, TrendScraperInput};
use scout_core::{Category, NewTrend, PlatformIcon, TrendRecord};
use scout_db::DbError;
use serde_json::{json, Value};

use crate::error::PipelineError;
use crate::traits::{StructuredModel, TrendSource, TrendStore};

pub(crate) fn trend(topic: &str) -> NewTrend {
    NewTrend {
        topic_name: topic.to_string(),
        short_description: "Short and punchy".to_string(),
        trending_context: None,
        platform_icon: PlatformIcon::X,
        hashtags: vec!["#one".to_string(), "#two".to_string()],
        source: None,
        category: None,
    }
}

pub(crate) fn store_error() -> PipelineError {
    PipelineError::Store(DbError::Sqlx(sqlx::Error::PoolTimedOut))
}

#[derive(Default)]
pub(crate) struct FakeStore {
    rows: Mutex<Vec<TrendRecord>>,
    next_id: AtomicUsize,
    pub fail_reads: AtomicBool,
    pub fail_inserts: AtomicBool,
    pub insert_calls: AtomicUsize,
}

impl FakeStore {
    pub fn seed(&self, trend: NewTrend, created_at: DateTime<Utc>) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.rows.lock().unwrap().push(TrendRecord {
            id: i64::try_from(id).unwrap(),
            created_at,
            trend,
        });
    }

    pub fn rows(&self) -> Vec<TrendRecord> {
        self.rows.lock().unwrap().clone()
    }

    fn sorted(&self, category: Option<Category>, limit: i64) -> Vec<TrendRecord> {
        let mut rows: Vec<TrendRecord> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| category.is_none() || r.trend.category == category)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows.truncate(usize::try_from(limit).unwrap());
        rows
    }
}

#[async_trait]
impl TrendStore for FakeStore {
    async fn fetch_top(&self, limit: i64) -> Result<Vec<TrendRecord>, PipelineError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(store_error());
        }
        Ok(self.sorted(None, limit))
    }

    async fn fetch_top_in_category(
        &self,
        category: Category,
        limit: i64,
    ) -> Result<Vec<TrendRecord>, PipelineError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(store_error());
        }
        Ok(self.sorted(Some(category), limit))
    }

    async fn insert_many(&self, trends: &[NewTrend]) -> Result<u64, PipelineError> {
        if trends.is_empty() {
            return Ok(0);
        }
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(store_error());
        }
        let now = Utc::now();
        for trend in trends {
            self.seed(trend.clone(), now);
        }
        Ok(trends.len() as u64)
    }

    async fn delete_by_category(&self, category: Category) -> Result<u64, PipelineError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.trend.category != Some(category));
        Ok((before - rows.len()) as u64)
    }

    async fn replace_category(
        &self,
        category: Category,
        trends: &[NewTrend],
    ) -> Result<(u64, u64), PipelineError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(store_error());
        }
        let replaced = {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r.trend.category != Some(category));
            (before - rows.len()) as u64
        };
        let now = Utc::now();
        for trend in trends {
            self.seed(trend.clone(), now);
        }
        Ok((replaced, trends.len() as u64))
    }
}

/// Returns the same items for every scrape, except for keywords listed in
/// `failing` (error) or `empty` (no items).
pub(crate) struct FakeSource {
    items: Vec<Value>,
    pub failing: Vec<String>,
    pub empty: Vec<String>,
    pub delay: Duration,
    pub calls: AtomicUsize,
    pub seen_keywords: Mutex<Vec<Option<String>>>,
}

impl FakeSource {
    pub fn with_items(count: usize) -> Self {
        Self {
            items: (0..count)
                .map(|i| json!({ "title": format!("raw {i}") }))
                .collect(),
            failing: Vec::new(),
            empty: Vec::new(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            seen_keywords: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TrendSource for FakeSource {
    async fn scrape(&self, input: &TrendScraperInput) -> Result<Vec<Value>, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_keywords
            .lock()
            .unwrap()
            .push(input.keywords.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let keywords = input.keywords.clone().unwrap_or_default();
        if self.failing.contains(&keywords) {
            return Err(PipelineError::Scrape(ApifyError::RunFailed {
                run_id: "run-x".to_string(),
                status: "FAILED".to_string(),
            }));
        }
        if self.empty.contains(&keywords) {
            return Ok(Vec::new());
        }
        Ok(self.items.clone())
    }
}

/// Replies with queued responses in order, then with `fallback`.
pub(crate) struct FakeModel {
    queued: Mutex<VecDeque<Result<String, String>>>,
    fallback: String,
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
    pub models: Mutex<Vec<String>>,
}

impl FakeModel {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback: text.into(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            models: Mutex::new(Vec::new()),
        }
    }

    /// Two valid industry-shaped records.
    pub fn valid_industry() -> Self {
        Self::replying(
            json!({
                "trends": [
                    {
                        "topic_name": "First topic",
                        "short_description": "First summary",
                        "trending_context": "It is everywhere. People share it.",
                        "platform_icon": "icon-linkedin",
                        "hashtags": ["#a", "#b"]
                    },
                    {
                        "topic_name": "Second topic",
                        "short_description": "Second summary",
                        "trending_context": "Creators picked it up. It spread.",
                        "platform_icon": "icon-x",
                        "hashtags": ["c", "#d"]
                    }
                ]
            })
            .to_string(),
        )
    }

    pub fn fallback_text(&self) -> String {
        self.fallback.clone()
    }

    pub fn push_error(&self, message: &str) {
        self.queued
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn push_reply(&self, text: &str) {
        self.queued.lock().unwrap().push_back(Ok(text.to_string()));
    }
}

#[async_trait]
impl StructuredModel for FakeModel {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        _schema: &Value,
    ) -> Result<String, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.models.lock().unwrap().push(model.to_string());

        match self.queued.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(PipelineError::Model(
                scout_gemini::GeminiError::Blocked { reason: message },
            )),
            None => Ok(self.fallback.clone()),
        }
    }
}
