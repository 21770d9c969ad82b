//! Durable JSON document holding the whole ledger.
//!
//! The [`JsonStore`] owns the document path. Every save rewrites the complete
//! dataset to a temporary sibling and renames it into place, so a crash
//! mid-write leaves the previous document intact.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use checkin_shared::constants::DATA_FILE_NAME;

use crate::error::{Result, StoreError};
use crate::migration;
use crate::models::Dataset;

#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    /// Open the document inside `data_dir`, migrating from `legacy_dir` when
    /// the primary document does not exist yet.
    ///
    /// Returns the store handle together with the loaded dataset.
    pub async fn open(data_dir: &Path, legacy_dir: Option<&Path>) -> Result<(Self, Dataset)> {
        let legacy = legacy_dir.map(|dir| dir.join(DATA_FILE_NAME));
        Self::open_at(data_dir.join(DATA_FILE_NAME), legacy.as_deref()).await
    }

    /// Open (or start) a document at an explicit path.
    pub async fn open_at(path: PathBuf, legacy: Option<&Path>) -> Result<(Self, Dataset)> {
        let store = Self { path };

        if let Some(legacy) = legacy {
            if let Some(data) = migration::migrate_legacy(&store, legacy).await? {
                return Ok((store, data));
            }
        }

        let data = store.load().await?;
        info!(
            path = %store.path.display(),
            contexts = data.len(),
            records = data.record_count(),
            "opened ledger document"
        );
        Ok((store, data))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Read the document. A missing file is an empty ledger.
    pub async fn load(&self) -> Result<Dataset> {
        read_document(&self.path).await.map(Option::unwrap_or_default)
    }

    /// Atomically replace the document with `data`.
    pub async fn save(&self, data: &Dataset) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &bytes).await?;
        fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), size = bytes.len(), "saved ledger document");
        Ok(())
    }
}

/// Parse the document at `path`, `None` if it does not exist.
pub(crate) async fn read_document(path: &Path) -> Result<Option<Dataset>> {
    let raw = match fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_slice(&raw)
        .map(Some)
        .map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkin_shared::ContextId;

    #[tokio::test]
    async fn test_missing_document_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let (store, data) = JsonStore::open(dir.path(), None).await.unwrap();
        assert!(data.is_empty());
        assert!(!store.exists().await);
    }

    #[tokio::test]
    async fn test_save_then_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let (store, mut data) = JsonStore::open(dir.path(), None).await.unwrap();
        let ctx = ContextId::from("qq:G:9");
        data.entry(&ctx, "1", "张三").points = 12;
        store.save(&data).await.unwrap();

        let (_, reopened) = JsonStore::open(dir.path(), None).await.unwrap();
        assert_eq!(reopened, data);
        assert_eq!(reopened.record(&ctx, "1").unwrap().display_name, "张三");
    }

    #[tokio::test]
    async fn test_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let (store, data) = JsonStore::open(&dir.path().join("nested"), None).await.unwrap();
        store.save(&data).await.unwrap();

        assert!(store.exists().await);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_document_keeps_non_ascii_text() {
        let dir = tempfile::tempdir().unwrap();
        let (store, mut data) = JsonStore::open(dir.path(), None).await.unwrap();
        data.entry(&ContextId::from("qq:G:9"), "1", "签到王");
        store.save(&data).await.unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("签到王"));
        assert!(text.contains("\"username\""));
    }

    #[tokio::test]
    async fn test_corrupt_document_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DATA_FILE_NAME), b"{ not json").unwrap();
        let err = JsonStore::open(dir.path(), None).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }
}
