//! Local filesystem storage implementation.
//!
//! Keeps both tables as pretty-printed JSON files under a root directory.
//! Used by the CLI and in tests; serverless deployments use `S3Storage`.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── config.toml     # Notifier configuration
//! ├── data.json       # Outage snapshot
//! └── chats.json      # Chat registry
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{ChatSubscription, OutageRecord};
use crate::storage::{CHATS_KEY, ChatRegistry, SNAPSHOT_KEY, SnapshotStore};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn write_json<T: Serialize + ?Sized + Sync>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read a JSON table; a missing file is an empty table.
    async fn read_table<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => {
                log::debug!("No {} found in {}", key, self.root_dir.display());
                Ok(Vec::new())
            }
        }
    }
}

#[async_trait]
impl SnapshotStore for LocalStorage {
    async fn load_snapshot(&self) -> Result<Vec<OutageRecord>> {
        self.read_table(SNAPSHOT_KEY).await
    }

    async fn replace_snapshot(&self, records: &[OutageRecord]) -> Result<()> {
        self.write_json(SNAPSHOT_KEY, records).await?;
        log::info!("Snapshot replaced with {} records", records.len());
        Ok(())
    }
}

#[async_trait]
impl ChatRegistry for LocalStorage {
    async fn list_chats(&self) -> Result<Vec<ChatSubscription>> {
        self.read_table(CHATS_KEY).await
    }

    async fn save_chats(&self, chats: &[ChatSubscription]) -> Result<()> {
        self.write_json(CHATS_KEY, chats).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(address: &str) -> OutageRecord {
        OutageRecord::new(address, "01.01.2024", "10:00", "01.01.2024", "12:00", "")
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage.write_bytes("test.txt", b"hello").await.unwrap();
        let data = storage.read_bytes("test.txt").await.unwrap();
        assert_eq!(data, Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn test_missing_tables_are_empty() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        assert!(storage.load_snapshot().await.unwrap().is_empty());
        assert!(storage.list_chats().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replace_snapshot_overwrites() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage
            .replace_snapshot(&[record("Ленина 5"), record("Пушкина 3")])
            .await
            .unwrap();
        storage.replace_snapshot(&[record("Мира 1")]).await.unwrap();

        let loaded = storage.load_snapshot().await.unwrap();
        assert_eq!(loaded, vec![record("Мира 1")]);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage
            .write_bytes(SNAPSHOT_KEY, br#"[{"row_id": "x"}]"#)
            .await
            .unwrap();
        assert!(matches!(
            storage.load_snapshot().await,
            Err(AppError::Json(_))
        ));
    }

    #[tokio::test]
    async fn test_chat_lifecycle() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let chat = ChatSubscription::registered("-1001", "Соседи", "42", "owner");

        storage.upsert_chat(&chat).await.unwrap();
        assert!(storage.enable_chat("-1001", "ленина", "77").await.unwrap());

        let enabled = storage.find_chat("-1001").await.unwrap().unwrap();
        assert!(enabled.enabled);
        assert_eq!(enabled.filter, "ленина");
        assert_eq!(enabled.message_thread_id, "77");

        assert!(storage.disable_chat("-1001").await.unwrap());
        let disabled = storage.find_chat("-1001").await.unwrap().unwrap();
        assert!(!disabled.enabled);
        assert_eq!(disabled.filter, "ленина");
        assert_eq!(storage.list_chats().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_updates_on_missing_chat_are_noops() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        assert!(!storage.disable_chat("404").await.unwrap());
        assert!(!storage.enable_chat("404", "x", "").await.unwrap());
        assert!(storage.list_chats().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_overwrites_existing_row() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage
            .upsert_chat(&ChatSubscription::registered("-1001", "Old", "1", "a"))
            .await
            .unwrap();
        storage.enable_chat("-1001", "ленина", "").await.unwrap();
        storage
            .upsert_chat(&ChatSubscription::registered("-1001", "New", "2", "b"))
            .await
            .unwrap();

        let chats = storage.list_chats().await.unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].name, "New");
        assert_eq!(chats[0].from_id, "2");
        assert!(!chats[0].enabled);
        assert!(chats[0].filter.is_empty());
    }
}
