//! Read-through cache policy for the feed.
//!
//! Each read consults the store first. If the feed is empty or its newest row
//! is older than the threshold, the gate runs a sync inline and re-reads.
//! Syncs are single-flight: readers that queued behind a running sync re-check
//! freshness once they get the lock and normally serve the fresh rows.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use scout_core::{SyncMode, TrendRecord};
use tokio::sync::Mutex;

use crate::sync::{SyncReport, TrendSync};
use crate::traits::TrendStore;

/// `true` when there is no newest record, or it is strictly older than
/// `threshold`. A record exactly `threshold` old is still fresh.
#[must_use]
pub fn is_stale(newest: Option<DateTime<Utc>>, now: DateTime<Utc>, threshold: TimeDelta) -> bool {
    match newest {
        None => true,
        Some(created_at) => now.signed_duration_since(created_at) > threshold,
    }
}

/// How a feed read was satisfied. Sent to clients as `x-feed-status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Fresh,
    Synced,
    SyncNoData,
    SyncFailed,
    StoreUnavailable,
}

impl FeedStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FeedStatus::Fresh => "fresh",
            FeedStatus::Synced => "synced",
            FeedStatus::SyncNoData => "sync_no_data",
            FeedStatus::SyncFailed => "sync_failed",
            FeedStatus::StoreUnavailable => "store_unavailable",
        }
    }

    /// Any inserted row counts as synced; otherwise a failure outranks no data.
    #[must_use]
    pub fn from_report(report: &SyncReport) -> Self {
        if report.inserted() > 0 {
            FeedStatus::Synced
        } else if report.failed() > 0 {
            FeedStatus::SyncFailed
        } else {
            FeedStatus::SyncNoData
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRead {
    pub records: Vec<TrendRecord>,
    pub status: FeedStatus,
}

impl FeedRead {
    fn unavailable() -> Self {
        Self {
            records: Vec::new(),
            status: FeedStatus::StoreUnavailable,
        }
    }
}

pub struct FreshnessGate {
    store: Arc<dyn TrendStore>,
    sync: Arc<TrendSync>,
    mode: SyncMode,
    limit: i64,
    threshold: TimeDelta,
    sync_lock: Mutex<()>,
}

impl FreshnessGate {
    #[must_use]
    pub fn new(
        store: Arc<dyn TrendStore>,
        sync: Arc<TrendSync>,
        mode: SyncMode,
        limit: i64,
        stale_after: Duration,
    ) -> Self {
        Self {
            store,
            sync,
            mode,
            limit,
            threshold: TimeDelta::from_std(stale_after).unwrap_or(TimeDelta::MAX),
            sync_lock: Mutex::new(()),
        }
    }

    /// Returns the latest `limit` records, syncing first when they are stale.
    ///
    /// Never fails: store errors degrade to an empty list with
    /// [`FeedStatus::StoreUnavailable`].
    pub async fn read(&self) -> FeedRead {
        let Some(records) = self.fetch().await else {
            return FeedRead::unavailable();
        };
        if !self.stale(&records) {
            return FeedRead {
                records,
                status: FeedStatus::Fresh,
            };
        }

        let _guard = self.sync_lock.lock().await;

        // Another request may have synced while this one waited.
        let Some(records) = self.fetch().await else {
            return FeedRead::unavailable();
        };
        if !self.stale(&records) {
            return FeedRead {
                records,
                status: FeedStatus::Fresh,
            };
        }

        tracing::info!(
            mode = %self.mode,
            cached = records.len(),
            "feed is stale, syncing before serving"
        );
        let report = self.sync.run(self.mode).await;
        let status = FeedStatus::from_report(&report);

        match self.fetch().await {
            Some(records) => FeedRead { records, status },
            None => FeedRead::unavailable(),
        }
    }

    async fn fetch(&self) -> Option<Vec<TrendRecord>> {
        match self.store.fetch_top(self.limit).await {
            Ok(records) => Some(records),
            Err(e) => {
                tracing::error!(error = %e, "failed to read cached trends");
                None
            }
        }
    }

    fn stale(&self, records: &[TrendRecord]) -> bool {
        is_stale(
            records.first().map(|r| r.created_at),
            Utc::now(),
            self.threshold,
        )
    }
}
