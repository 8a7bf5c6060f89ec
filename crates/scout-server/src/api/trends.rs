use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use scout_core::{Category, TrendRecord};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_store_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct CategoryTrends {
    pub category: &'static str,
    pub trending_topics: Vec<TrendRecord>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CategoryTrendsQuery {
    pub limit: Option<i64>,
}

/// Latest rows for one industry. Read-only: never triggers a sync.
pub(super) async fn list_category_trends(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(slug): Path<String>,
    Query(query): Query<CategoryTrendsQuery>,
) -> Result<Json<ApiResponse<CategoryTrends>>, ApiError> {
    let category = Category::from_slug(&slug).map_err(|_| {
        ApiError::new(
            req_id.0.clone(),
            "not_found",
            format!("unknown category '{slug}'"),
        )
    })?;

    let trending_topics = state
        .store
        .fetch_top_in_category(category, normalize_limit(query.limit))
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: CategoryTrends {
            category: category.label(),
            trending_topics,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
