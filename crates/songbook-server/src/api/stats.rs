use axum::{extract::State, Json};
use std::sync::Arc;

use songbook_db::{AppState, Stats};

use crate::error::ApiResult;

/// GET {prefix}/stats
pub async fn get_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<Stats>> {
    collect(&state).await.map(Json)
}

/// Stats over the current document. Also feeds the health check.
pub(crate) async fn collect(state: &AppState) -> ApiResult<Stats> {
    let document = state.store.load().await?;
    let size = state.store.document_size().await?;
    Ok(Stats::compute(&document.songs, size))
}
