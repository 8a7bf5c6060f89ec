//! Postgres-backed [`TrendStore`].

use async_trait::async_trait;
use scout_core::{Category, NewTrend, TrendRecord};
use sqlx::PgPool;

use crate::error::PipelineError;
use crate::traits::TrendStore;

#[derive(Debug, Clone)]
pub struct PgTrendStore {
    pool: PgPool,
}

impl PgTrendStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrendStore for PgTrendStore {
    async fn fetch_top(&self, limit: i64) -> Result<Vec<TrendRecord>, PipelineError> {
        Ok(scout_db::list_recent_trends(&self.pool, limit).await?)
    }

    async fn fetch_top_in_category(
        &self,
        category: Category,
        limit: i64,
    ) -> Result<Vec<TrendRecord>, PipelineError> {
        Ok(scout_db::list_recent_trends_in_category(&self.pool, category, limit).await?)
    }

    async fn insert_many(&self, trends: &[NewTrend]) -> Result<u64, PipelineError> {
        Ok(scout_db::insert_trends(&self.pool, trends).await?)
    }

    async fn delete_by_category(&self, category: Category) -> Result<u64, PipelineError> {
        Ok(scout_db::delete_trends_by_category(&self.pool, category).await?)
    }

    async fn replace_category(
        &self,
        category: Category,
        trends: &[NewTrend],
    ) -> Result<(u64, u64), PipelineError> {
        Ok(scout_db::replace_trends_in_category(&self.pool, category, trends).await?)
    }
}
