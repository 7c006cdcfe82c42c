//! The persisted document and the collection operations handlers run
//! against it between a load and a save.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::song::timestamp;
use crate::entities::{NewSong, Song, SongChanges};
use crate::storage::StoreError;

/// Version stamped into `metadata.version` when a document is first written.
pub const DOCUMENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub version: String,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_records: usize,
}

impl Metadata {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            created_at: Some(now),
            last_updated: None,
            total_records: 0,
        }
    }
}

/// `{"songs": [...], "metadata": {...}}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongDocument {
    #[serde(default)]
    pub songs: Vec<Song>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl SongDocument {
    /// `1` for an empty collection, otherwise one past the largest id.
    /// Never `len + 1`: that reuses ids after a delete. `None` once the
    /// largest id is `u64::MAX`.
    pub fn next_id(&self) -> Option<u64> {
        self.songs.iter().map(|s| s.id).max().unwrap_or(0).checked_add(1)
    }

    pub fn find(&self, id: u64) -> Option<&Song> {
        self.songs.iter().find(|s| s.id == id)
    }

    /// Append a new record with generated id, uuid and timestamps.
    pub fn insert(&mut self, fields: NewSong, now: DateTime<Utc>) -> Result<&Song, StoreError> {
        let id = self.next_id().ok_or(StoreError::IdsExhausted)?;
        self.songs.push(Song::new(id, fields, now));
        Ok(&self.songs[self.songs.len() - 1])
    }

    /// Merge `changes` into the record with `id`. `None` when absent.
    pub fn update(&mut self, id: u64, changes: SongChanges, now: DateTime<Utc>) -> Option<&Song> {
        let song = self.songs.iter_mut().find(|s| s.id == id)?;
        song.apply(changes, now);
        Some(&*song)
    }

    pub fn remove(&mut self, id: u64) -> Option<Song> {
        let index = self.songs.iter().position(|s| s.id == id)?;
        Some(self.songs.remove(index))
    }

    /// Refresh bookkeeping metadata right before a save.
    pub fn stamp(&mut self, now: DateTime<Utc>) {
        let total = self.songs.len();
        let metadata = self.metadata.get_or_insert_with(|| Metadata::new(now));
        metadata.last_updated = Some(now);
        metadata.total_records = total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(title: &str, artist: &str) -> NewSong {
        NewSong {
            title: title.into(),
            artist: artist.into(),
            album: None,
            year: None,
        }
    }

    #[test]
    fn test_next_id_empty_is_one() {
        assert_eq!(SongDocument::default().next_id(), Some(1));
    }

    #[test]
    fn test_next_id_never_reuses_freed_slot() {
        let mut doc = SongDocument::default();
        let now = Utc::now();
        assert_eq!(doc.insert(fields("A", "B"), now).unwrap().id, 1);
        assert_eq!(doc.insert(fields("C", "D"), now).unwrap().id, 2);
        assert!(doc.remove(1).is_some());
        assert_eq!(doc.insert(fields("E", "F"), now).unwrap().id, 3);
    }

    #[test]
    fn test_next_id_uses_max_not_len() {
        let doc: SongDocument = serde_json::from_str(
            r#"{"songs": [{"id": 10, "titulo": "A", "artista": "B"},
                          {"id": 4, "titulo": "C", "artista": "D"}]}"#,
        )
        .unwrap();
        assert_eq!(doc.next_id(), Some(11));
    }

    #[test]
    fn test_insert_preserves_order() {
        let mut doc = SongDocument::default();
        let now = Utc::now();
        doc.insert(fields("first", "x"), now).unwrap();
        doc.insert(fields("second", "x"), now).unwrap();
        let titles: Vec<_> = doc.songs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second"]);
    }

    #[test]
    fn test_find_and_remove_missing() {
        let mut doc = SongDocument::default();
        assert!(doc.find(999).is_none());
        assert!(doc.remove(999).is_none());
        assert!(doc
            .update(999, SongChanges::default(), Utc::now())
            .is_none());
    }

    #[test]
    fn test_update_merges_in_place() {
        let mut doc = SongDocument::default();
        let now = Utc::now();
        doc.insert(fields("X", "Y"), now).unwrap();
        let updated = doc
            .update(
                1,
                SongChanges {
                    album: Some(Some("New".into())),
                    ..Default::default()
                },
                now,
            )
            .unwrap();
        assert_eq!(updated.album.as_deref(), Some("New"));
        assert_eq!(updated.title, "X");
        assert_eq!(doc.songs.len(), 1);
    }

    #[test]
    fn test_stamp_creates_and_refreshes_metadata() {
        let mut doc = SongDocument::default();
        let now = Utc::now();
        doc.insert(fields("A", "B"), now).unwrap();
        doc.stamp(now);
        let meta = doc.metadata.clone().unwrap();
        assert_eq!(meta.total_records, 1);
        assert_eq!(meta.version, DOCUMENT_VERSION);
        assert_eq!(meta.last_updated, Some(now));

        doc.remove(1);
        doc.stamp(now);
        assert_eq!(doc.metadata.unwrap().total_records, 0);
    }

    #[test]
    fn test_document_without_metadata_or_songs() {
        let doc: SongDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.songs.is_empty());
        assert!(doc.metadata.is_none());
    }

    #[test]
    fn test_insert_fails_when_ids_run_out() {
        let mut doc: SongDocument = serde_json::from_value(serde_json::json!({
            "songs": [{"id": u64::MAX, "titulo": "Last", "artista": "B"}]
        }))
        .unwrap();
        assert_eq!(doc.next_id(), None);

        let err = doc.insert(fields("A", "B"), Utc::now()).unwrap_err();
        assert!(matches!(err, StoreError::IdsExhausted));
        assert!(!err.is_read());
        assert_eq!(doc.songs.len(), 1);
    }
}
