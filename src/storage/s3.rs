//! AWS S3 storage implementation.
//!
//! Stores the snapshot and the chat registry as JSON objects:
//! - `{bucket}/{prefix}/data.json`
//! - `{bucket}/{prefix}/chats.json`

use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{AppError, Result};
use crate::models::{ChatSubscription, OutageRecord};
use crate::storage::{CHATS_KEY, ChatRegistry, SNAPSHOT_KEY, SnapshotStore};

/// S3-backed storage for both tables.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3Storage {
    /// Create a new S3 storage instance.
    pub fn new(client: Client, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    /// Create S3 storage from environment configuration.
    ///
    /// - `S3_BUCKET`: bucket name (default: `outage-notifier`)
    /// - `S3_PREFIX`: key prefix (default: `outages`)
    pub async fn from_env() -> Result<Self> {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&config);

        let bucket = std::env::var("S3_BUCKET").unwrap_or_else(|_| "outage-notifier".to_string());
        let prefix = std::env::var("S3_PREFIX").unwrap_or_else(|_| "outages".to_string());

        Ok(Self::new(client, bucket, prefix))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Full object key for a key relative to the prefix.
    fn key(&self, name: &str) -> String {
        let prefix = self.prefix.trim_matches('/');
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", prefix, name)
        }
    }

    /// Read an object, returning `None` when it does not exist.
    pub async fn read_bytes_optional(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let bytes = output.body.collect().await.map_err(AppError::storage)?;
                Ok(Some(bytes.into_bytes().to_vec()))
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    Ok(None)
                } else {
                    Err(AppError::storage(service_err))
                }
            }
        }
    }

    async fn read_table<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let key = self.key(name);
        match self.read_bytes_optional(&key).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => {
                log::info!("No existing data at s3://{}/{}", self.bucket, key);
                Ok(Vec::new())
            }
        }
    }

    async fn write_table<T: Serialize + Sync>(&self, name: &str, rows: &[T]) -> Result<()> {
        let key = self.key(name);
        let json = serde_json::to_vec_pretty(rows)?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(json))
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| AppError::storage(e.into_service_error()))?;

        log::info!("Wrote {} rows to s3://{}/{}", rows.len(), self.bucket, key);
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for S3Storage {
    async fn load_snapshot(&self) -> Result<Vec<OutageRecord>> {
        self.read_table(SNAPSHOT_KEY).await
    }

    async fn replace_snapshot(&self, records: &[OutageRecord]) -> Result<()> {
        self.write_table(SNAPSHOT_KEY, records).await
    }
}

#[async_trait]
impl ChatRegistry for S3Storage {
    async fn list_chats(&self) -> Result<Vec<ChatSubscription>> {
        self.read_table(CHATS_KEY).await
    }

    async fn save_chats(&self, chats: &[ChatSubscription]) -> Result<()> {
        self.write_table(CHATS_KEY, chats).await
    }
}
