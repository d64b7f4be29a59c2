//! Chat subscription data structure.

use serde::{Deserialize, Serialize};

/// A chat the bot was added to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatSubscription {
    /// Telegram chat id
    pub chat_id: String,

    /// Whether notifications are delivered (stored as `0`/`1`)
    #[serde(with = "int_flag")]
    pub enabled: bool,

    /// Comma-separated address substrings, empty matches everything
    #[serde(default)]
    pub filter: String,

    /// Id of the user who added the bot
    #[serde(default)]
    pub from_id: String,

    /// Username of the user who added the bot
    #[serde(default)]
    pub from_name: String,

    /// Forum topic to post into, empty for the main stream
    #[serde(default)]
    pub message_thread_id: String,

    /// Chat title, for reference only
    #[serde(default)]
    pub name: String,
}

/// Registration state of a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Unregistered,
    Disabled,
    Enabled,
}

impl ChatState {
    /// Derive the state from an optional registry row.
    pub fn of(chat: Option<&ChatSubscription>) -> Self {
        match chat {
            None => Self::Unregistered,
            Some(c) if c.enabled => Self::Enabled,
            Some(_) => Self::Disabled,
        }
    }
}

impl ChatSubscription {
    /// A freshly registered, not yet configured chat.
    pub fn registered(
        chat_id: impl Into<String>,
        name: impl Into<String>,
        from_id: impl Into<String>,
        from_name: impl Into<String>,
    ) -> Self {
        Self {
            chat_id: chat_id.into(),
            enabled: false,
            filter: String::new(),
            from_id: from_id.into(),
            from_name: from_name.into(),
            message_thread_id: String::new(),
            name: name.into(),
        }
    }

    pub fn state(&self) -> ChatState {
        ChatState::of(Some(self))
    }

    /// Whether `user_id` is the user who added the bot.
    pub fn is_owner(&self, user_id: &str) -> bool {
        !self.from_id.is_empty() && self.from_id == user_id
    }

    /// Thread to address, if any.
    pub fn thread_id(&self) -> Option<&str> {
        Some(self.message_thread_id.as_str()).filter(|t| !t.is_empty())
    }
}

mod int_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(i32::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(i32::deserialize(deserializer)? != 0)
    }
}
