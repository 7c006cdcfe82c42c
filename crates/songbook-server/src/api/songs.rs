use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use songbook_db::entities::{Song, SongCreate, SongUpdate};
use songbook_db::{AppState, Page};

use super::{JsonBody, SongId, SuccessResponse};
use crate::error::{ApiError, ApiResult};

/// Raw query values. Kept as strings so `?page=abc` falls back to the
/// default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl PaginationParams {
    fn page(&self, total: usize) -> Page {
        Page::new(total, parse_count(&self.page), parse_count(&self.per_page))
    }
}

fn parse_count(raw: &Option<String>) -> Option<usize> {
    let n = raw.as_deref()?.trim().parse::<i64>().ok()?;
    Some(n.max(0) as usize)
}

#[derive(Debug, Serialize)]
pub struct SongList {
    pub songs: Vec<Song>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Serialize)]
pub struct DeletedSong {
    pub song_id: u64,
}

/// GET {prefix}/songs
pub async fn list_songs(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PaginationParams>, QueryRejection>,
) -> ApiResult<Json<SongList>> {
    let params = query.map(|Query(p)| p).unwrap_or_default();
    let document = state.store.load().await?;
    let page = params.page(document.songs.len());

    tracing::debug!(page = page.page, per_page = page.per_page, total = page.total, "listing songs");

    Ok(Json(SongList {
        songs: page.slice(&document.songs).to_vec(),
        total: page.total,
        page: page.page,
        per_page: page.per_page,
        has_next: page.has_next(),
        has_prev: page.has_prev(),
    }))
}

/// GET {prefix}/songs/{id} and GET /songs/{id}
pub async fn get_song(
    State(state): State<Arc<AppState>>,
    SongId(id): SongId,
) -> ApiResult<Json<Song>> {
    let document = state.store.load().await?;
    document
        .find(id)
        .cloned()
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}

/// POST {prefix}/songs and POST /songs
pub async fn create_song(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<SongCreate>,
) -> ApiResult<(StatusCode, Json<Song>)> {
    let fields = body.validate().map_err(ApiError::Validation)?;

    let mut document = state.store.load().await?;
    let song = document.insert(fields, Utc::now())?.clone();
    state.store.save(&mut document).await?;

    tracing::info!(song_id = song.id, title = %song.title, "song created");
    Ok((StatusCode::CREATED, Json(song)))
}

/// PUT {prefix}/songs/{id}
pub async fn update_song(
    State(state): State<Arc<AppState>>,
    SongId(id): SongId,
    JsonBody(body): JsonBody<SongUpdate>,
) -> ApiResult<Json<Song>> {
    update_song_record(&state, id, body).await.map(Json)
}

/// DELETE {prefix}/songs/{id}
pub async fn delete_song(
    State(state): State<Arc<AppState>>,
    SongId(id): SongId,
) -> ApiResult<Json<SuccessResponse<DeletedSong>>> {
    let song = remove_song_record(&state, id).await?;
    Ok(Json(SuccessResponse::new(
        "Song deleted successfully",
        DeletedSong { song_id: song.id },
    )))
}

/// Validate, merge and persist. Shared by both update routes.
pub(crate) async fn update_song_record(
    state: &AppState,
    id: u64,
    body: SongUpdate,
) -> ApiResult<Song> {
    let changes = body.validate().map_err(ApiError::Validation)?;

    let mut document = state.store.load().await?;
    let song = document
        .update(id, changes, Utc::now())
        .cloned()
        .ok_or(ApiError::NotFound(id))?;
    state.store.save(&mut document).await?;

    tracing::info!(song_id = id, "song updated");
    Ok(song)
}

/// Remove and persist. Shared by both delete routes.
pub(crate) async fn remove_song_record(state: &AppState, id: u64) -> ApiResult<Song> {
    let mut document = state.store.load().await?;
    let song = document.remove(id).ok_or(ApiError::NotFound(id))?;
    state.store.save(&mut document).await?;

    tracing::info!(song_id = id, title = %song.title, "song deleted");
    Ok(song)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<&str>, per_page: Option<&str>) -> PaginationParams {
        PaginationParams {
            page: page.map(Into::into),
            per_page: per_page.map(Into::into),
        }
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(&Some("3".into())), Some(3));
        assert_eq!(parse_count(&Some(" 7 ".into())), Some(7));
        assert_eq!(parse_count(&Some("-4".into())), Some(0));
        assert_eq!(parse_count(&Some("abc".into())), None);
        assert_eq!(parse_count(&None), None);
    }

    #[test]
    fn test_non_integer_params_use_defaults() {
        let page = params(Some("x"), Some("1.5")).page(120);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 50);
    }

    #[test]
    fn test_params_are_clamped() {
        let page = params(Some("-1"), Some("500")).page(10);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 100);
    }
}
