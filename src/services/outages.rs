// src/services/outages.rs

//! Paginated outage listing scraper.
//!
//! Walks the listing page by page for a start date, strictly sequentially,
//! and guards against upstream markup changes before anything is persisted.

use std::time::Duration;

use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Config, ListingConfig};
use crate::services::listing::ListingSource;

/// Raw rows collected from all listing pages.
#[derive(Debug, Default)]
pub struct ScrapeOutcome {
    /// Cell texts per source row, in source order
    pub rows: Vec<Vec<String>>,
    /// Number of pages fetched
    pub pages: u32,
}

/// Service collecting every row of the outage listing.
pub struct OutageScraper<'a> {
    source: &'a dyn ListingSource,
    listing: &'a ListingConfig,
    delay: Duration,
}

impl<'a> OutageScraper<'a> {
    pub fn new(source: &'a dyn ListingSource, config: &'a Config) -> Self {
        Self {
            source,
            listing: &config.listing,
            delay: Duration::from_millis(config.http.request_delay_ms),
        }
    }

    /// URL of a listing page. Page 1 carries no page parameter.
    pub fn page_url(&self, start_date: &str, page: u32) -> Result<String> {
        let mut url = Url::parse(&self.listing.url)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("reg", "")
                .append_pair("city", "")
                .append_pair("date_start", start_date)
                .append_pair("date_finish", "")
                .append_pair("res", "")
                .append_pair("street", &self.listing.street);
            if page > 1 {
                query.append_pair(&self.listing.page_param, &page.to_string());
            }
        }
        Ok(url.into())
    }

    /// Fetch all pages starting at `start_date`.
    ///
    /// Fails with [`AppError::FormatChanged`] when nothing was collected or the
    /// first row does not have the expected number of cells.
    pub async fn collect(&self, start_date: &str) -> Result<ScrapeOutcome> {
        let mut outcome = ScrapeOutcome::default();
        let mut page = 1;

        loop {
            let url = self.page_url(start_date, page)?;
            log::debug!("Fetching listing page {}: {}", page, url);

            let listing = self.source.fetch_page(&url).await?;
            log::debug!(
                "Page {} has {} rows, last page {}",
                page,
                listing.rows.len(),
                listing.last_page
            );
            outcome.rows.extend(listing.rows);
            outcome.pages += 1;

            page += 1;
            if page > listing.last_page {
                break;
            }

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        check_format(&outcome.rows, self.listing.expected_columns)?;
        log::info!(
            "Collected {} listing rows from {} page(s)",
            outcome.rows.len(),
            outcome.pages
        );
        Ok(outcome)
    }
}

/// Verify the collected rows still look like the outage table.
pub fn check_format(rows: &[Vec<String>], expected_columns: usize) -> Result<()> {
    match rows.first() {
        None => Err(AppError::format_changed("no rows collected")),
        Some(first) if first.len() != expected_columns => Err(AppError::format_changed(format!(
            "first row has {} cells, expected {}",
            first.len(),
            expected_columns
        ))),
        Some(_) => Ok(()),
    }
}
