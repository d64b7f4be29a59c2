// src/lib.rs

//! Outage Notifier Library
//!
//! Watches a utility's planned-outage listing and tells subscribed Telegram
//! chats about entries they have not seen yet.

#[cfg(feature = "s3")]
pub mod config;
pub mod context;
pub mod error;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
