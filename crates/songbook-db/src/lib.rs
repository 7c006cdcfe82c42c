use std::env;
use std::path::PathBuf;
use std::sync::Arc;

pub mod document;
pub mod entities;
pub mod pagination;
pub mod stats;
pub mod storage;

pub use document::{Metadata, SongDocument};
pub use pagination::Page;
pub use stats::{Stats, YearRange};
pub use storage::{JsonFileStore, SongStore, StoreError};

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
    /// `None` disables the pre-save backup copy.
    pub backup_path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        let path = env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/db.json".to_string());
        let backup_path = match env::var("DATABASE_BACKUP_PATH") {
            Ok(v) if v.trim().is_empty() => None,
            Ok(v) => Some(PathBuf::from(v)),
            Err(_) => Some(PathBuf::from("./data/db_backup.json")),
        };

        Self {
            path: PathBuf::from(path),
            backup_path,
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SongStore>,
    pub app_name: String,
    pub version: String,
}
