// src/pipeline/run.rs

//! Scheduled listing check.

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{Config, OutageRecord};
use crate::pipeline::diff::calculate_diff;
use crate::pipeline::dispatch::dispatch;
use crate::pipeline::normalize::normalize_rows;
use crate::services::{ListingSource, Notifier, OutageScraper};
use crate::storage::{ChatRegistry, SnapshotStore, Storage};
use crate::utils::listing_start_date;

/// Counters of a scheduled run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pages: u32,
    pub rows: usize,
    pub records: usize,
    pub new_records: usize,
    pub changed_records: usize,
    pub removed_records: usize,
    pub messages_sent: usize,
}

/// Whether a run persists the fresh snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotMode {
    Replace,
    Keep,
}

/// Normalized listing of the current run.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub records: Vec<OutageRecord>,
    pub pages: u32,
    pub rows: usize,
}

/// Scrape the listing and return the normalized records without touching storage.
pub async fn scrape_listing(
    config: &Config,
    source: &dyn ListingSource,
    today: NaiveDate,
) -> Result<Listing> {
    let start_date = listing_start_date(today, config.listing.start_offset_days);
    log::info!("Checking outage listing from {}", start_date);

    let scraped = OutageScraper::new(source, config)
        .collect(&start_date)
        .await?;
    let records = normalize_rows(&scraped.rows);
    Ok(Listing {
        records,
        pages: scraped.pages,
        rows: scraped.rows.len(),
    })
}

/// Run one scheduled check.
///
/// The listing is scraped in full before any storage is touched, so a
/// format change aborts the run with the snapshot intact. The snapshot is
/// replaced before dispatch; a failed send therefore is not retried by the
/// next run.
pub async fn run_scheduled(
    config: &Config,
    source: &dyn ListingSource,
    storage: &dyn Storage,
    notifier: &dyn Notifier,
    today: NaiveDate,
) -> Result<RunSummary> {
    run_with_mode(config, source, storage, notifier, today, SnapshotMode::Replace).await
}

/// Run one check, optionally leaving the stored snapshot untouched.
pub async fn run_with_mode(
    config: &Config,
    source: &dyn ListingSource,
    storage: &dyn Storage,
    notifier: &dyn Notifier,
    today: NaiveDate,
    mode: SnapshotMode,
) -> Result<RunSummary> {
    let Listing {
        records,
        pages,
        rows,
    } = scrape_listing(config, source, today).await?;

    let previous = storage.load_snapshot().await?;
    let chats: Vec<_> = storage
        .list_chats()
        .await?
        .into_iter()
        .filter(|c| c.enabled)
        .collect();

    let diff = calculate_diff(&previous, &records);
    if diff.has_changes() {
        log::info!(
            "Listing has {} records, {} change(s): {} new, {} changed, {} removed",
            records.len(),
            diff.change_count(),
            diff.added.len(),
            diff.changed.len(),
            diff.removed.len()
        );
    } else {
        log::info!("Listing unchanged ({} records)", records.len());
    }

    match mode {
        SnapshotMode::Replace => storage.replace_snapshot(&records).await?,
        SnapshotMode::Keep => log::info!("Keeping stored snapshot unchanged"),
    }

    let messages_sent = dispatch(&diff.added, &chats, &config.messages, notifier).await?;
    log::info!(
        "Sent {} notification(s) to {} enabled chat(s)",
        messages_sent,
        chats.len()
    );

    Ok(RunSummary {
        pages,
        rows,
        records: records.len(),
        new_records: diff.added.len(),
        changed_records: diff.changed.len(),
        removed_records: diff.removed.len(),
        messages_sent,
    })
}
