//! Document store for app entries
//!
//! The admin surface writes here; the loader may read from here instead of a
//! flat file. Records are keyed by the application-chosen `id`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::entry::{AppEntry, AppsDocument};

/// Store error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("app '{id}' already exists")]
    Duplicate { id: String },

    #[error("app '{id}' not found")]
    NotFound { id: String },

    #[error("store I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("store file {path:?} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A stored entry plus audit metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredApp {
    #[serde(flatten)]
    pub entry: AppEntry,
    /// Hand-written documents carry no audit fields; they read as epoch / ""
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

impl StoredApp {
    pub fn id(&self) -> &str {
        &self.entry.id
    }
}

/// CRUD over app records.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Whether the backend can currently serve requests
    async fn ready(&self) -> bool;

    async fn list(&self) -> Result<Vec<StoredApp>, StoreError>;

    async fn get(&self, id: &str) -> Result<StoredApp, StoreError>;

    /// Insert a new record; fails with `Duplicate` if the id is taken.
    async fn create(&self, entry: AppEntry, actor: &str) -> Result<StoredApp, StoreError>;

    /// Replace the fields of record `id`, keeping its creation metadata.
    ///
    /// The stored id never changes; `entry.id` is ignored.
    async fn update(&self, id: &str, entry: AppEntry, actor: &str)
        -> Result<StoredApp, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Project the store onto the public apps document.
    async fn document(&self) -> Result<AppsDocument, StoreError> {
        let apps = self.list().await?.into_iter().map(|s| s.entry).collect();
        Ok(AppsDocument::new(apps).normalized("store"))
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default)]
    apps: Vec<StoredApp>,
}

/// Store persisted as a single JSON file.
///
/// The file has the same `{ apps: [...] }` outer shape as the public document,
/// so it can be served directly as a local static source. Writes go to a
/// sibling temp file and are renamed into place.
pub struct JsonFileStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> Result<StoreFile, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(StoreFile::default()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreFile::default()),
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    async fn write_file(&self, file: &StoreFile) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        let bytes = serde_json::to_vec_pretty(file).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;

        debug!(path = %self.path.display(), apps = file.apps.len(), "store written");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn ready(&self) -> bool {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                tokio::fs::metadata(parent).await.is_ok_and(|m| m.is_dir())
            }
            _ => true,
        }
    }

    async fn list(&self) -> Result<Vec<StoredApp>, StoreError> {
        let _guard = self.lock.read().await;
        Ok(self.read_file().await?.apps)
    }

    async fn get(&self, id: &str) -> Result<StoredApp, StoreError> {
        let _guard = self.lock.read().await;
        self.read_file()
            .await?
            .apps
            .into_iter()
            .find(|app| app.id() == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_owned() })
    }

    async fn create(&self, entry: AppEntry, actor: &str) -> Result<StoredApp, StoreError> {
        let _guard = self.lock.write().await;
        let mut file = self.read_file().await?;

        if file.apps.iter().any(|app| app.id() == entry.id) {
            return Err(StoreError::Duplicate { id: entry.id });
        }

        let stored = StoredApp {
            entry,
            created_at: Utc::now(),
            created_by: actor.to_owned(),
            updated_at: None,
            updated_by: None,
        };
        file.apps.push(stored.clone());
        self.write_file(&file).await?;

        info!(id = %stored.id(), actor, "app created");
        Ok(stored)
    }

    async fn update(
        &self,
        id: &str,
        entry: AppEntry,
        actor: &str,
    ) -> Result<StoredApp, StoreError> {
        let _guard = self.lock.write().await;
        let mut file = self.read_file().await?;

        let existing = file
            .apps
            .iter_mut()
            .find(|app| app.id() == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_owned() })?;

        existing.entry = AppEntry {
            id: id.to_owned(),
            ..entry
        };
        existing.updated_at = Some(Utc::now());
        existing.updated_by = Some(actor.to_owned());
        let updated = existing.clone();

        self.write_file(&file).await?;

        info!(id, actor, "app updated");
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _guard = self.lock.write().await;
        let mut file = self.read_file().await?;

        let before = file.apps.len();
        file.apps.retain(|app| app.id() != id);
        if file.apps.len() == before {
            return Err(StoreError::NotFound { id: id.to_owned() });
        }

        self.write_file(&file).await?;

        info!(id, "app deleted");
        Ok(())
    }

    async fn document(&self) -> Result<AppsDocument, StoreError> {
        let _guard = self.lock.read().await;
        let file = self.read_file().await?;
        let doc = AppsDocument {
            apps: file.apps.into_iter().map(|s| s.entry).collect(),
            title: file.title,
        };
        Ok(doc.normalized(&self.path.display().to_string()))
    }
}
