use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

use crate::document::SongDocument;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("song id space exhausted")]
    IdsExhausted,
}

impl StoreError {
    /// Whether the failure happened while loading (as opposed to saving).
    pub fn is_read(&self) -> bool {
        matches!(self, StoreError::Read { .. } | StoreError::Corrupt { .. })
    }
}

/// Whole-document persistence for the song collection.
///
/// Every request loads, mutates and saves independently. Nothing here
/// serializes concurrent writers: the last save wins.
#[async_trait]
pub trait SongStore: Send + Sync {
    /// Read the document. A missing file is an empty collection.
    async fn load(&self) -> Result<SongDocument, StoreError>;

    /// Overwrite the document, refreshing its metadata first.
    async fn save(&self, document: &mut SongDocument) -> Result<(), StoreError>;

    /// Size of the persisted document in bytes, `0` when absent.
    async fn document_size(&self) -> Result<u64, StoreError>;
}

// ─── JSON file backend ─────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    backup_path: Option<PathBuf>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup_path: None,
        }
    }

    /// Copy the previous document here before each save.
    pub fn with_backup(mut self, backup_path: impl Into<PathBuf>) -> Self {
        self.backup_path = Some(backup_path.into());
        self
    }

    pub fn from_config(config: &crate::StoreConfig) -> Self {
        let store = Self::new(&config.path);
        match &config.backup_path {
            Some(backup) => store.with_backup(backup),
            None => store,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write an empty document if none exists yet.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        if fs::try_exists(&self.path).await.unwrap_or(false) {
            tracing::info!(path = %self.path.display(), "using existing song document");
            return Ok(());
        }
        tracing::info!(path = %self.path.display(), "creating new song document");
        self.save(&mut SongDocument::default()).await
    }

    /// Fresh sibling path for one write. Each save gets its own, so
    /// concurrent saves never share a temp file.
    fn temp_path(target: &Path) -> PathBuf {
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "db.json".to_string());
        target.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4().simple()))
    }

    /// Write `bytes` beside `target` then rename over it, so readers see
    /// either the old or the new file and never a partial one.
    async fn replace_file(target: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let temp = Self::temp_path(target);
        let result = match fs::write(&temp, bytes).await {
            Ok(()) => fs::rename(&temp, target).await,
            Err(e) => Err(e),
        };
        if result.is_err() {
            let _ = fs::remove_file(&temp).await;
        }
        result
    }

    async fn ensure_parent(&self, path: &Path) -> Result<(), StoreError> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|source| StoreError::Write {
                        path: path.to_path_buf(),
                        source,
                    })
            }
            _ => Ok(()),
        }
    }

    /// Best effort: a failed backup never blocks the save.
    async fn backup(&self) {
        let Some(backup) = &self.backup_path else {
            return;
        };
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            return;
        }
        if let Err(e) = self.ensure_parent(backup).await {
            tracing::warn!("failed to prepare backup directory: {e}");
            return;
        }
        let result = match fs::read(&self.path).await {
            Ok(current) => Self::replace_file(backup, &current).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => tracing::debug!(backup = %backup.display(), "document backup created"),
            Err(e) => tracing::warn!(backup = %backup.display(), "failed to create backup: {e}"),
        }
    }
}

#[async_trait]
impl SongStore for JsonFileStore {
    async fn load(&self) -> Result<SongDocument, StoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(path = %self.path.display(), "song document not found, treating as empty");
                return Ok(SongDocument::default());
            }
            Err(source) => {
                tracing::error!(path = %self.path.display(), "failed to read song document: {source}");
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let corrupt = |source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        };

        // Parse to a value first: a struct would also accept a JSON array.
        let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(corrupt)?;
        if !value.is_object() {
            return Err(corrupt(serde::de::Error::custom(
                "document root must be an object",
            )));
        }
        let document: SongDocument = serde_json::from_value(value).map_err(corrupt)?;

        tracing::debug!(songs = document.songs.len(), "loaded song document");
        Ok(document)
    }

    async fn save(&self, document: &mut SongDocument) -> Result<(), StoreError> {
        self.ensure_parent(&self.path).await?;
        self.backup().await;

        document.stamp(Utc::now());

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        document.serialize(&mut serializer)?;
        buf.push(b'\n');

        Self::replace_file(&self.path, &buf)
            .await
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(songs = document.songs.len(), "saved song document");
        Ok(())
    }

    async fn document_size(&self) -> Result<u64, StoreError> {
        match fs::metadata(&self.path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(source) => Err(StoreError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
