//! Service layer for the notifier.
//!
//! This module contains the collaborators the pipeline talks to:
//! - Listing page fetching and parsing (`HttpListingSource`)
//! - Paginated listing collection (`OutageScraper`)
//! - Chat notification delivery (`TelegramNotifier`)

pub mod listing;
mod outages;
mod telegram;

pub use listing::{HttpListingSource, ListingPage, ListingSource};
pub use outages::{OutageScraper, ScrapeOutcome, check_format};
pub use telegram::{MemoryNotifier, Notifier, SentMessage, TelegramNotifier};
