// src/services/listing.rs

//! Outage listing page source.
//!
//! Fetches one page of the listing and turns its result table into rows of
//! trimmed cell texts, together with the last page number advertised by the
//! page navigation.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::ListingConfig;
use crate::utils::http::fetch_text;

/// One parsed page of the listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Table rows, each a list of trimmed cell texts. Rows without cells are dropped.
    pub rows: Vec<Vec<String>>,
    /// Last page number from the navigation, `1` when there is none.
    pub last_page: u32,
}

/// Capability to fetch and parse a listing page by URL.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<ListingPage>;
}

/// Listing source backed by HTTP and CSS selectors.
pub struct HttpListingSource {
    client: Client,
    layout: ListingConfig,
}

impl HttpListingSource {
    /// Create a source, rejecting invalid selectors up front.
    pub fn new(client: Client, layout: ListingConfig) -> Result<Self> {
        parse_selector(&layout.row_selector)?;
        parse_selector(&layout.cell_selector)?;
        parse_selector(&layout.last_page_selector)?;
        Ok(Self { client, layout })
    }
}

#[async_trait]
impl ListingSource for HttpListingSource {
    async fn fetch_page(&self, url: &str) -> Result<ListingPage> {
        let html = fetch_text(&self.client, url).await?;
        parse_listing(&html, &self.layout)
    }
}

/// Parse a listing page.
pub fn parse_listing(html: &str, layout: &ListingConfig) -> Result<ListingPage> {
    let document = Html::parse_document(html);
    let row_sel = parse_selector(&layout.row_selector)?;
    let cell_sel = parse_selector(&layout.cell_selector)?;
    let last_page_sel = parse_selector(&layout.last_page_selector)?;

    let rows = document
        .select(&row_sel)
        .map(|row| {
            row.select(&cell_sel)
                .map(|cell| cell.text().collect::<String>().trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect();

    let last_page = document
        .select(&last_page_sel)
        .next()
        .and_then(|link| link.value().attr("href"))
        .and_then(|href| page_number(href, &layout.page_param))
        .unwrap_or(1);

    Ok(ListingPage { rows, last_page })
}

/// Extract the page number carried by `param` in a navigation link.
pub fn page_number(href: &str, param: &str) -> Option<u32> {
    let pattern = Regex::new(&format!(r"{}=(\d+)", regex::escape(param))).ok()?;
    pattern
        .captures(href)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
