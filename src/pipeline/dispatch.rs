// src/pipeline/dispatch.rs

//! Notification composition and dispatch.

use unicode_segmentation::UnicodeSegmentation;

use crate::error::Result;
use crate::models::{ChatSubscription, MessagesConfig, OutageRecord};
use crate::pipeline::filter::matches;
use crate::services::Notifier;

/// Compose the notification text for an outage, truncated to the configured length.
pub fn compose_message(record: &OutageRecord, messages: &MessagesConfig) -> String {
    let mut text = record.format(&messages.notification);
    if !record.comment.is_empty() {
        text.push_str(&record.format(&messages.comment_suffix));
    }
    truncate(&text, messages.max_length, &messages.ellipsis)
}

/// Cut `text` to `max_chars` visible characters, appending `ellipsis` when cut.
pub fn truncate(text: &str, max_chars: usize, ellipsis: &str) -> String {
    match text.grapheme_indices(true).nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ellipsis),
        None => text.to_string(),
    }
}

/// Send every new record to every enabled chat whose filter matches it.
///
/// Sends are sequential and attempted once. Returns the number of messages sent.
pub async fn dispatch(
    records: &[OutageRecord],
    chats: &[ChatSubscription],
    messages: &MessagesConfig,
    notifier: &dyn Notifier,
) -> Result<usize> {
    let mut sent = 0;

    for record in records {
        let mut text: Option<String> = None;
        for chat in chats.iter().filter(|c| c.enabled) {
            if !matches(&record.address, &chat.filter) {
                continue;
            }
            let message = text
                .get_or_insert_with(|| compose_message(record, messages))
                .as_str();
            notifier.send(&chat.chat_id, chat.thread_id(), message).await?;
            log::info!("Notified chat {} about {}", chat.chat_id, record.row_id);
            sent += 1;
        }
    }

    Ok(sent)
}
