use axum::{extract::State, response::IntoResponse, Json};

use super::{AppState, FEED_STATUS_HEADER};

/// `GET /feed`: the latest trends as a bare JSON array.
///
/// Always 200. A stale or empty feed is synced inline first; the outcome is
/// reported in the `x-feed-status` header rather than the body.
pub(super) async fn get_feed(State(state): State<AppState>) -> impl IntoResponse {
    let read = state.gate.read().await;
    tracing::debug!(
        status = read.status.as_str(),
        records = read.records.len(),
        "feed served"
    );
    ([(FEED_STATUS_HEADER, read.status.as_str())], Json(read.records))
}
