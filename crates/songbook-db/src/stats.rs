use serde::Serialize;
use std::collections::HashSet;

use crate::entities::Song;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
}

/// Aggregates over the whole collection, recomputed on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total_songs: usize,
    pub total_artists: usize,
    pub total_albums: usize,
    pub year_range: YearRange,
    pub database_size: u64,
}

impl Stats {
    pub fn compute(songs: &[Song], database_size: u64) -> Self {
        let artists: HashSet<&str> = songs.iter().map(|s| s.artist.as_str()).collect();
        let albums: HashSet<&str> = songs
            .iter()
            .filter_map(|s| s.album.as_deref())
            .filter(|a| !a.is_empty())
            .collect();
        let years = songs.iter().filter_map(|s| s.year);

        Self {
            total_songs: songs.len(),
            total_artists: artists.len(),
            total_albums: albums.len(),
            year_range: YearRange {
                min_year: years.clone().min(),
                max_year: years.max(),
            },
            database_size,
        }
    }
}
