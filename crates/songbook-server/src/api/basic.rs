//! Unversioned `/songs` routes with the minimal response shapes: a plain
//! array on list and `{message}` envelopes on update and delete. They share
//! the store and validation with the versioned routes.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use songbook_db::entities::{Song, SongUpdate};
use songbook_db::AppState;

use super::songs::{remove_song_record, update_song_record};
use super::{JsonBody, SongId};
use crate::error::ApiResult;

#[derive(Debug, Serialize)]
pub struct SongUpdated {
    pub message: &'static str,
    pub song: Song,
}

#[derive(Debug, Serialize)]
pub struct SongDeleted {
    pub message: &'static str,
}

/// GET /songs
pub async fn list_songs(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Song>>> {
    let document = state.store.load().await?;
    Ok(Json(document.songs))
}

/// PUT /songs/{id}
pub async fn update_song(
    State(state): State<Arc<AppState>>,
    SongId(id): SongId,
    JsonBody(body): JsonBody<SongUpdate>,
) -> ApiResult<Json<SongUpdated>> {
    let song = update_song_record(&state, id, body).await?;
    Ok(Json(SongUpdated {
        message: "Song updated successfully",
        song,
    }))
}

/// DELETE /songs/{id}
pub async fn delete_song(
    State(state): State<Arc<AppState>>,
    SongId(id): SongId,
) -> ApiResult<Json<SongDeleted>> {
    remove_song_record(&state, id).await?;
    Ok(Json(SongDeleted {
        message: "Song deleted successfully",
    }))
}
