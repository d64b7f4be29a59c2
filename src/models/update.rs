//! Inbound Telegram webhook payloads.
//!
//! Only the fields the command handling reads are modelled; everything else
//! in the update is ignored during deserialization.

use serde::Deserialize;

/// A single webhook update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub my_chat_member: Option<ChatMemberUpdated>,

    #[serde(default)]
    pub message: Option<Message>,
}

/// The bot's own membership in a chat changed.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMemberUpdated {
    pub chat: Chat,
    pub from: User,
    pub new_chat_member: ChatMember,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMember {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,

    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,

    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,

    #[serde(default)]
    pub from: Option<User>,

    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub message_thread_id: Option<i64>,

    #[serde(default)]
    pub is_topic_message: Option<bool>,

    #[serde(default)]
    pub reply_to_message: Option<Box<Message>>,
}

impl Update {
    /// Parse an update from a raw JSON body.
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }
}

impl Message {
    /// Forum topic the message was posted in.
    ///
    /// Only a reply to a topic message carries the topic's thread id.
    pub fn topic_thread_id(&self) -> Option<String> {
        let reply = self.reply_to_message.as_ref()?;
        if reply.is_topic_message.unwrap_or(false) {
            reply.message_thread_id.map(|id| id.to_string())
        } else {
            None
        }
    }
}
