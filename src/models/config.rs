//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::outage::columns;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Source listing location and table layout
    #[serde(default)]
    pub listing: ListingConfig,

    /// HTTP client behavior
    #[serde(default)]
    pub http: HttpConfig,

    /// Telegram Bot API settings
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Outgoing message texts
    #[serde(default)]
    pub messages: MessagesConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Override selected values from the process environment.
    ///
    /// - `BOT_KEY`: Telegram bot token
    /// - `TELEGRAM_API_URL`: Bot API base URL
    /// - `LISTING_URL`: outage listing page
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var("BOT_KEY") {
            self.telegram.token = token;
        }
        if let Ok(api_url) = std::env::var("TELEGRAM_API_URL") {
            self.telegram.api_url = api_url;
        }
        if let Ok(url) = std::env::var("LISTING_URL") {
            self.listing.url = url;
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.listing.url.trim().is_empty() {
            return Err(AppError::validation("listing.url is empty"));
        }
        url::Url::parse(&self.listing.url)?;
        for (name, value) in [
            ("listing.row_selector", &self.listing.row_selector),
            ("listing.cell_selector", &self.listing.cell_selector),
            ("listing.last_page_selector", &self.listing.last_page_selector),
            ("listing.page_param", &self.listing.page_param),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!("{name} is empty")));
            }
        }
        if self.listing.expected_columns <= columns::COMMENT {
            return Err(AppError::validation(format!(
                "listing.expected_columns must be > {}",
                columns::COMMENT
            )));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.messages.max_length == 0 {
            return Err(AppError::validation("messages.max_length must be > 0"));
        }
        url::Url::parse(&self.telegram.api_url)?;
        Ok(())
    }

    /// Validation for runs that actually deliver messages.
    pub fn validate_for_delivery(&self) -> Result<()> {
        self.validate()?;
        if self.telegram.token.trim().is_empty() {
            return Err(AppError::validation(
                "telegram.token is empty (set BOT_KEY)",
            ));
        }
        Ok(())
    }
}

/// Outage listing location and table layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Listing page URL without query parameters
    #[serde(default = "defaults::listing_url")]
    pub url: String,

    /// Street filter sent to the listing search
    #[serde(default)]
    pub street: String,

    /// Query parameter carrying the page number
    #[serde(default = "defaults::page_param")]
    pub page_param: String,

    /// CSS selector for table rows
    #[serde(default = "defaults::row_selector")]
    pub row_selector: String,

    /// CSS selector for cells within a row
    #[serde(default = "defaults::cell_selector")]
    pub cell_selector: String,

    /// CSS selector for the "last page" navigation link
    #[serde(default = "defaults::last_page_selector")]
    pub last_page_selector: String,

    /// Number of cells a listing row must have
    #[serde(default = "defaults::expected_columns")]
    pub expected_columns: usize,

    /// How many days before today the listing window starts
    #[serde(default = "defaults::start_offset_days")]
    pub start_offset_days: u64,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            url: defaults::listing_url(),
            street: String::new(),
            page_param: defaults::page_param(),
            row_selector: defaults::row_selector(),
            cell_selector: defaults::cell_selector(),
            last_page_selector: defaults::last_page_selector(),
            expected_columns: defaults::expected_columns(),
            start_offset_days: defaults::start_offset_days(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between listing page requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
        }
    }
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API base URL
    #[serde(default = "defaults::telegram_api_url")]
    pub api_url: String,

    /// Bot token, usually provided through `BOT_KEY`
    #[serde(default)]
    pub token: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: defaults::telegram_api_url(),
            token: String::new(),
        }
    }
}

/// Outgoing message texts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesConfig {
    /// Notification text, see [`OutageRecord::format`](crate::models::OutageRecord::format)
    #[serde(default = "defaults::notification")]
    pub notification: String,

    /// Appended when the outage has a comment
    #[serde(default = "defaults::comment_suffix")]
    pub comment_suffix: String,

    /// Maximum notification length in characters before truncation
    #[serde(default = "defaults::max_length")]
    pub max_length: usize,

    /// Marker appended to truncated notifications
    #[serde(default = "defaults::ellipsis")]
    pub ellipsis: String,

    /// Reply after a filter was set; `{filter}` is replaced
    #[serde(default = "defaults::filter_set")]
    pub filter_set: String,

    /// Reply when `/settings` came without a filter
    #[serde(default = "defaults::filter_missing")]
    pub filter_missing: String,

    /// Reply when someone other than the owner sent `/settings`
    #[serde(default = "defaults::owner_only")]
    pub owner_only: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            notification: defaults::notification(),
            comment_suffix: defaults::comment_suffix(),
            max_length: defaults::max_length(),
            ellipsis: defaults::ellipsis(),
            filter_set: defaults::filter_set(),
            filter_missing: defaults::filter_missing(),
            owner_only: defaults::owner_only(),
        }
    }
}

mod defaults {
    pub fn listing_url() -> String {
        "https://rosseti-lenenergo.ru/planned_work/".into()
    }
    pub fn page_param() -> String {
        "PAGEN_1".into()
    }
    pub fn row_selector() -> String {
        ".planedwork table tr".into()
    }
    pub fn cell_selector() -> String {
        "td".into()
    }
    pub fn last_page_selector() -> String {
        ".page-nav-i > a:last-child".into()
    }
    pub fn expected_columns() -> usize {
        11
    }
    pub fn start_offset_days() -> u64 {
        1
    }

    pub fn user_agent() -> String {
        concat!("outage-notifier/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        200
    }

    pub fn telegram_api_url() -> String {
        "https://api.telegram.org".into()
    }

    pub fn notification() -> String {
        "Планируемое отключение: {address} с {day_start} {time_start} по {day_end} {time_end}"
            .into()
    }
    pub fn comment_suffix() -> String {
        " ({comment})".into()
    }
    pub fn max_length() -> usize {
        350
    }
    pub fn ellipsis() -> String {
        "...".into()
    }
    pub fn filter_set() -> String {
        "Установлен фильтр: {filter}".into()
    }
    pub fn filter_missing() -> String {
        "Укажите фильтр, например: /settings Заречное, Заозерное, Боровое".into()
    }
    pub fn owner_only() -> String {
        "Только тот кто добавил бота может управлять им".into()
    }
}
