//! Pipeline entry points and stages.
//!
//! - `run_scheduled`: scrape the listing, diff it against the stored
//!   snapshot and notify matching chats
//! - `handle_update`: apply a webhook update to the chat registry

pub mod commands;
pub mod diff;
pub mod dispatch;
pub mod filter;
pub mod normalize;
pub mod run;

pub use commands::{CommandOutcome, handle_update};
pub use diff::{DiffResult, calculate_diff};
pub use dispatch::{compose_message, dispatch};
pub use filter::matches;
pub use normalize::normalize_rows;
pub use run::{Listing, RunSummary, SnapshotMode, run_scheduled, run_with_mode, scrape_listing};
