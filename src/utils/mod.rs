//! Utility functions and helpers.

pub mod http;

use chrono::{Days, NaiveDate};

/// Format a date the way the outage listing expects it (`DD.MM.YYYY`).
pub fn listing_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// First day of the listing window: `offset_days` before `today`.
pub fn listing_start_date(today: NaiveDate, offset_days: u64) -> String {
    let start = today.checked_sub_days(Days::new(offset_days)).unwrap_or(today);
    listing_date(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_date_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(listing_date(date), "05.03.2024");
    }

    #[test]
    fn test_listing_start_date_crosses_year() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(listing_start_date(today, 1), "31.12.2023");
    }
}
