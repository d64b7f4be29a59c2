//! Storage abstractions for outage snapshots and chat subscriptions.
//!
//! Two tables are kept, each stored as one JSON document:
//!
//! ```text
//! storage/
//! ├── data.json     # Snapshot: outage records of the last run
//! └── chats.json    # Registry: chats the bot was added to
//! ```
//!
//! The snapshot is replaced wholesale on every scheduled run. Chat rows are
//! never deleted; removal only clears `enabled`.

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ChatSubscription, OutageRecord};

// Re-export for convenience
pub use local::LocalStorage;

/// Object key of the outage snapshot.
pub const SNAPSHOT_KEY: &str = "data.json";
/// Object key of the chat registry.
pub const CHATS_KEY: &str = "chats.json";

/// Last known state of the outage listing.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// All records of the previous run. Empty when nothing was stored yet.
    async fn load_snapshot(&self) -> Result<Vec<OutageRecord>>;

    /// Replace the stored snapshot with `records`.
    async fn replace_snapshot(&self, records: &[OutageRecord]) -> Result<()>;
}

/// Durable table of chat subscriptions keyed by `chat_id`.
#[async_trait]
pub trait ChatRegistry: Send + Sync {
    /// All registered chats.
    async fn list_chats(&self) -> Result<Vec<ChatSubscription>>;

    /// Replace the whole table.
    async fn save_chats(&self, chats: &[ChatSubscription]) -> Result<()>;

    /// Look up a chat by id.
    async fn find_chat(&self, chat_id: &str) -> Result<Option<ChatSubscription>> {
        Ok(self
            .list_chats()
            .await?
            .into_iter()
            .find(|c| c.chat_id == chat_id))
    }

    /// Insert or fully overwrite the row for `chat.chat_id`.
    async fn upsert_chat(&self, chat: &ChatSubscription) -> Result<()> {
        let mut chats = self.list_chats().await?;
        match chats.iter_mut().find(|c| c.chat_id == chat.chat_id) {
            Some(existing) => *existing = chat.clone(),
            None => chats.push(chat.clone()),
        }
        self.save_chats(&chats).await
    }

    /// Clear `enabled` on an existing row. Missing rows are left alone.
    async fn disable_chat(&self, chat_id: &str) -> Result<bool> {
        let mut chats = self.list_chats().await?;
        if !update_row(&mut chats, chat_id, |chat| chat.enabled = false) {
            return Ok(false);
        }
        self.save_chats(&chats).await?;
        Ok(true)
    }

    /// Enable a chat with a filter and reply thread. Missing rows are left alone.
    async fn enable_chat(
        &self,
        chat_id: &str,
        filter: &str,
        message_thread_id: &str,
    ) -> Result<bool> {
        let mut chats = self.list_chats().await?;
        let found = update_row(&mut chats, chat_id, |chat| {
            chat.enabled = true;
            chat.filter = filter.to_string();
            chat.message_thread_id = message_thread_id.to_string();
        });
        if !found {
            return Ok(false);
        }
        self.save_chats(&chats).await?;
        Ok(true)
    }
}

/// Apply `change` to the row of `chat_id`, returning whether it existed.
fn update_row(
    chats: &mut [ChatSubscription],
    chat_id: &str,
    change: impl FnOnce(&mut ChatSubscription),
) -> bool {
    match chats.iter_mut().find(|c| c.chat_id == chat_id) {
        Some(chat) => {
            change(chat);
            true
        }
        None => false,
    }
}

/// A backend holding both tables.
pub trait Storage: SnapshotStore + ChatRegistry {}

impl<T: SnapshotStore + ChatRegistry> Storage for T {}
