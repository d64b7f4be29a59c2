// src/models/mod.rs

//! Domain models for the notifier.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod chat;
mod config;
mod outage;
mod update;

// Re-export all public types
pub use chat::{ChatState, ChatSubscription};
pub use config::{Config, HttpConfig, ListingConfig, MessagesConfig, TelegramConfig};
pub use outage::{OutageRecord, columns};
pub use update::{Chat, ChatMember, ChatMemberUpdated, Message, Update, User};
