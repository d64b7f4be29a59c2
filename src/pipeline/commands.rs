// src/pipeline/commands.rs

//! Chat registration and `/settings` command handling.
//!
//! | Event                      | Effect                                         |
//! |----------------------------|------------------------------------------------|
//! | bot became `member`        | register chat, disabled, empty filter          |
//! | bot `left`                 | disable chat, row kept                         |
//! | `/settings <filter>` owner | enable chat with filter and reply thread       |
//! | `/settings` owner          | reply asking for a filter                      |
//! | `/settings ...` non-owner  | reply that only the owner may configure        |
//! | anything else              | ignored                                        |

use crate::error::Result;
use crate::models::{ChatMemberUpdated, ChatSubscription, Message, MessagesConfig, Update};
use crate::services::Notifier;
use crate::storage::{ChatRegistry, Storage};

/// Command prefix for configuring a chat.
pub const SETTINGS_COMMAND: &str = "/settings";

const STATUS_MEMBER: &str = "member";
const STATUS_LEFT: &str = "left";

/// What an inbound update did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Chat registered (or re-registered) in disabled state
    Registered { chat_id: String },
    /// Chat disabled after the bot was removed
    Disabled { chat_id: String },
    /// Owner set a filter and enabled the chat
    FilterSet { chat_id: String, filter: String },
    /// Owner sent `/settings` without a filter
    FilterMissing { chat_id: String },
    /// Someone other than the owner sent `/settings`
    NotOwner { chat_id: String },
    /// Nothing to do
    Ignored,
}

/// Apply a webhook update to the chat registry, replying where needed.
pub async fn handle_update(
    update: &Update,
    storage: &dyn Storage,
    notifier: &dyn Notifier,
    messages: &MessagesConfig,
) -> Result<CommandOutcome> {
    if let Some(member) = &update.my_chat_member {
        return handle_membership(member, storage).await;
    }

    match &update.message {
        Some(message) if is_settings_command(message) => {
            handle_settings(message, storage, notifier, messages).await
        }
        _ => Ok(CommandOutcome::Ignored),
    }
}

async fn handle_membership(
    member: &ChatMemberUpdated,
    storage: &dyn Storage,
) -> Result<CommandOutcome> {
    let chat_id = member.chat.id.to_string();

    match member.new_chat_member.status.as_str() {
        STATUS_MEMBER => {
            let chat = ChatSubscription::registered(
                chat_id.clone(),
                member.chat.title.clone().unwrap_or_default(),
                member.from.id.to_string(),
                member.from.username.clone().unwrap_or_default(),
            );
            storage.upsert_chat(&chat).await?;
            log::info!("Registered chat {} added by {}", chat_id, chat.from_id);
            Ok(CommandOutcome::Registered { chat_id })
        }
        STATUS_LEFT => {
            if storage.disable_chat(&chat_id).await? {
                log::info!("Disabled chat {}", chat_id);
                Ok(CommandOutcome::Disabled { chat_id })
            } else {
                log::debug!("Bot left unknown chat {}", chat_id);
                Ok(CommandOutcome::Ignored)
            }
        }
        status => {
            log::debug!("Ignoring membership status {} in chat {}", status, chat_id);
            Ok(CommandOutcome::Ignored)
        }
    }
}

async fn handle_settings(
    message: &Message,
    storage: &dyn Storage,
    notifier: &dyn Notifier,
    messages: &MessagesConfig,
) -> Result<CommandOutcome> {
    let chat_id = message.chat.id.to_string();
    let Some(chat) = storage.find_chat(&chat_id).await? else {
        log::debug!("Ignoring {} from unregistered chat {}", SETTINGS_COMMAND, chat_id);
        return Ok(CommandOutcome::Ignored);
    };

    let thread_id = message.topic_thread_id().unwrap_or_default();
    let sender = message
        .from
        .as_ref()
        .map(|user| user.id.to_string())
        .unwrap_or_default();

    let (reply, outcome) = if !chat.is_owner(&sender) {
        log::info!("Rejected {} from {} in chat {}", SETTINGS_COMMAND, sender, chat_id);
        (
            messages.owner_only.clone(),
            CommandOutcome::NotOwner {
                chat_id: chat_id.clone(),
            },
        )
    } else {
        let filter = settings_argument(message.text.as_deref().unwrap_or_default());
        if filter.is_empty() {
            (
                messages.filter_missing.clone(),
                CommandOutcome::FilterMissing {
                    chat_id: chat_id.clone(),
                },
            )
        } else {
            storage.enable_chat(&chat_id, &filter, &thread_id).await?;
            log::info!("Chat {} enabled with filter '{}'", chat_id, filter);
            (
                messages.filter_set.replace("{filter}", &filter),
                CommandOutcome::FilterSet {
                    chat_id: chat_id.clone(),
                    filter,
                },
            )
        }
    };

    let thread = Some(thread_id.as_str()).filter(|t| !t.is_empty());
    notifier.send(&chat_id, thread, &reply).await?;
    Ok(outcome)
}

fn is_settings_command(message: &Message) -> bool {
    message
        .text
        .as_deref()
        .is_some_and(|text| text.starts_with(SETTINGS_COMMAND))
}

/// Text after the first space of a command, trimmed.
pub fn settings_argument(text: &str) -> String {
    match text.find(' ') {
        Some(space) if space > 0 => text[space + 1..].trim().to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::services::MemoryNotifier;
    use crate::storage::{ChatRegistry, LocalStorage};

    const CHAT: i64 = -1001;
    const OWNER: i64 = 42;

    fn membership(status: &str) -> Update {
        serde_json::from_value(json!({
            "my_chat_member": {
                "chat": {"id": CHAT, "title": "Соседи"},
                "from": {"id": OWNER, "username": "owner"},
                "new_chat_member": {"status": status}
            }
        }))
        .unwrap()
    }

    fn command(from: i64, text: &str) -> Update {
        serde_json::from_value(json!({
            "message": {
                "chat": {"id": CHAT},
                "from": {"id": from},
                "text": text
            }
        }))
        .unwrap()
    }

    fn command_in_topic(from: i64, text: &str, thread: i64) -> Update {
        serde_json::from_value(json!({
            "message": {
                "chat": {"id": CHAT},
                "from": {"id": from},
                "text": text,
                "reply_to_message": {
                    "chat": {"id": CHAT},
                    "is_topic_message": true,
                    "message_thread_id": thread
                }
            }
        }))
        .unwrap()
    }

    async fn apply(
        storage: &LocalStorage,
        notifier: &MemoryNotifier,
        update: Update,
    ) -> CommandOutcome {
        handle_update(&update, storage, notifier, &MessagesConfig::default())
            .await
            .unwrap()
    }

    #[test]
    fn test_settings_argument() {
        assert_eq!(settings_argument("/settings  Ленина, Мира "), "Ленина, Мира");
        assert_eq!(settings_argument("/settings@outage_bot Ленина"), "Ленина");
        assert_eq!(settings_argument("/settings"), "");
        assert_eq!(settings_argument("/settings   "), "");
    }

    #[tokio::test]
    async fn test_member_registers_disabled_chat() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let notifier = MemoryNotifier::new();

        let outcome = apply(&storage, &notifier, membership("member")).await;
        assert_eq!(outcome, CommandOutcome::Registered { chat_id: "-1001".into() });

        let chat = storage.find_chat("-1001").await.unwrap().unwrap();
        assert!(!chat.enabled);
        assert_eq!(chat.from_id, "42");
        assert_eq!(chat.from_name, "owner");
        assert_eq!(chat.name, "Соседи");
        assert!(notifier.messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_owner_sets_filter() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let notifier = MemoryNotifier::new();
        apply(&storage, &notifier, membership("member")).await;

        let outcome = apply(&storage, &notifier, command(OWNER, "/settings рабочая")).await;
        assert_eq!(
            outcome,
            CommandOutcome::FilterSet {
                chat_id: "-1001".into(),
                filter: "рабочая".into()
            }
        );

        let chat = storage.find_chat("-1001").await.unwrap().unwrap();
        assert!(chat.enabled);
        assert_eq!(chat.filter, "рабочая");
        assert_eq!(chat.message_thread_id, "");

        let replies = notifier.messages().await;
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].text, "Установлен фильтр: рабочая");
        assert!(replies[0].thread_id.is_none());
    }

    #[tokio::test]
    async fn test_non_owner_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let notifier = MemoryNotifier::new();
        apply(&storage, &notifier, membership("member")).await;

        let outcome = apply(&storage, &notifier, command(7, "/settings рабочая")).await;
        assert_eq!(outcome, CommandOutcome::NotOwner { chat_id: "-1001".into() });

        let chat = storage.find_chat("-1001").await.unwrap().unwrap();
        assert!(!chat.enabled);
        assert!(chat.filter.is_empty());
        assert_eq!(
            notifier.messages().await[0].text,
            "Только тот кто добавил бота может управлять им"
        );
    }

    #[tokio::test]
    async fn test_empty_filter_prompts() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let notifier = MemoryNotifier::new();
        apply(&storage, &notifier, membership("member")).await;

        let outcome = apply(&storage, &notifier, command(OWNER, "/settings")).await;
        assert_eq!(outcome, CommandOutcome::FilterMissing { chat_id: "-1001".into() });
        assert!(!storage.find_chat("-1001").await.unwrap().unwrap().enabled);
        assert!(notifier.messages().await[0].text.starts_with("Укажите фильтр"));
    }

    #[tokio::test]
    async fn test_unregistered_chat_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let notifier = MemoryNotifier::new();

        let outcome = apply(&storage, &notifier, command(OWNER, "/settings рабочая")).await;
        assert_eq!(outcome, CommandOutcome::Ignored);
        assert!(notifier.messages().await.is_empty());
        assert!(storage.list_chats().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_topic_reply_captures_thread() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let notifier = MemoryNotifier::new();
        apply(&storage, &notifier, membership("member")).await;

        apply(&storage, &notifier, command_in_topic(OWNER, "/settings Мира", 77)).await;

        let chat = storage.find_chat("-1001").await.unwrap().unwrap();
        assert_eq!(chat.message_thread_id, "77");
        assert_eq!(notifier.messages().await[0].thread_id.as_deref(), Some("77"));
    }

    #[tokio::test]
    async fn test_left_then_reenabled_without_registration() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let notifier = MemoryNotifier::new();
        apply(&storage, &notifier, membership("member")).await;
        apply(&storage, &notifier, command(OWNER, "/settings Ленина")).await;

        let outcome = apply(&storage, &notifier, membership("left")).await;
        assert_eq!(outcome, CommandOutcome::Disabled { chat_id: "-1001".into() });
        let chat = storage.find_chat("-1001").await.unwrap().unwrap();
        assert!(!chat.enabled);

        apply(&storage, &notifier, command(OWNER, "/settings Пушкина")).await;
        let chat = storage.find_chat("-1001").await.unwrap().unwrap();
        assert!(chat.enabled);
        assert_eq!(chat.filter, "Пушкина");
        assert_eq!(storage.list_chats().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_other_messages_are_ignored() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let notifier = MemoryNotifier::new();
        apply(&storage, &notifier, membership("member")).await;

        assert_eq!(
            apply(&storage, &notifier, command(OWNER, "привет")).await,
            CommandOutcome::Ignored
        );
        assert_eq!(
            apply(&storage, &notifier, membership("administrator")).await,
            CommandOutcome::Ignored
        );
        assert_eq!(apply(&storage, &notifier, Update::default()).await, CommandOutcome::Ignored);
    }
}
