// src/context.rs

//! Per-invocation resources.
//!
//! An [`AppContext`] is built at the start of every CLI command or serverless
//! event and dropped when it finishes. Nothing is kept in global state.

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{Config, Update};
use crate::pipeline::{self, CommandOutcome, RunSummary, SnapshotMode};
use crate::services::{HttpListingSource, Notifier, TelegramNotifier};
use crate::storage::Storage;
use crate::utils::http::create_async_client;

/// Configuration, storage backend and HTTP client of one invocation.
pub struct AppContext<S> {
    config: Config,
    storage: S,
    client: reqwest::Client,
}

impl<S: Storage> AppContext<S> {
    /// Validate the configuration and set up the HTTP client.
    pub fn new(config: Config, storage: S) -> Result<Self> {
        config.validate()?;
        let client = create_async_client(&config.http)?;
        Ok(Self {
            config,
            storage,
            client,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn listing_source(&self) -> Result<HttpListingSource> {
        HttpListingSource::new(self.client.clone(), self.config.listing.clone())
    }

    pub fn notifier(&self) -> TelegramNotifier {
        TelegramNotifier::new(self.client.clone(), &self.config.telegram)
    }

    /// Scheduled check delivering through Telegram.
    pub async fn run_scheduled(&self, today: NaiveDate) -> Result<RunSummary> {
        self.config.validate_for_delivery()?;
        let source = self.listing_source()?;
        let notifier = self.notifier();
        pipeline::run_scheduled(&self.config, &source, &self.storage, &notifier, today).await
    }

    /// Check with a caller-provided notifier, optionally keeping the snapshot.
    pub async fn run_with(
        &self,
        notifier: &dyn Notifier,
        today: NaiveDate,
        mode: SnapshotMode,
    ) -> Result<RunSummary> {
        let source = self.listing_source()?;
        pipeline::run_with_mode(&self.config, &source, &self.storage, notifier, today, mode).await
    }

    /// Apply a webhook update, replying through Telegram.
    pub async fn handle_update(&self, update: &Update) -> Result<CommandOutcome> {
        self.config.validate_for_delivery()?;
        let notifier = self.notifier();
        pipeline::handle_update(update, &self.storage, &notifier, &self.config.messages).await
    }
}
