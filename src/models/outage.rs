//! Outage record data structure.

use serde::{Deserialize, Serialize};

/// Cell positions of the outage listing table.
pub mod columns {
    pub const ADDRESS: usize = 2;
    pub const DAY_START: usize = 3;
    pub const TIME_START: usize = 4;
    pub const DAY_END: usize = 5;
    pub const TIME_END: usize = 6;
    pub const COMMENT: usize = 9;
}

/// A planned outage published on the listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutageRecord {
    /// Composite key: `address|day_start|time_start`
    pub row_id: String,

    /// Affected address
    pub address: String,

    /// Outage start day (`DD.MM.YYYY`)
    pub day_start: String,

    /// Outage start time
    pub time_start: String,

    /// Outage end day
    pub day_end: String,

    /// Outage end time
    pub time_end: String,

    /// Free-form remark, often empty
    pub comment: String,
}

impl OutageRecord {
    /// Build a record, deriving `row_id` from the key fields.
    pub fn new(
        address: impl Into<String>,
        day_start: impl Into<String>,
        time_start: impl Into<String>,
        day_end: impl Into<String>,
        time_end: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        let address = address.into();
        let day_start = day_start.into();
        let time_start = time_start.into();
        Self {
            row_id: Self::make_row_id(&address, &day_start, &time_start),
            address,
            day_start,
            time_start,
            day_end: day_end.into(),
            time_end: time_end.into(),
            comment: comment.into(),
        }
    }

    /// Decode a raw listing row by fixed cell positions.
    ///
    /// Returns `None` when the row is too short to hold every column we read.
    pub fn from_cells(cells: &[String]) -> Option<Self> {
        let cell = |idx: usize| cells.get(idx).map(String::as_str);
        Some(Self::new(
            cell(columns::ADDRESS)?,
            cell(columns::DAY_START)?,
            cell(columns::TIME_START)?,
            cell(columns::DAY_END)?,
            cell(columns::TIME_END)?,
            cell(columns::COMMENT)?,
        ))
    }

    /// Compose the natural key of an outage event.
    pub fn make_row_id(address: &str, day_start: &str, time_start: &str) -> String {
        format!("{address}|{day_start}|{time_start}")
    }

    /// Format the record using a template.
    ///
    /// Supported placeholders:
    /// - `{address}`, `{day_start}`, `{time_start}`, `{day_end}`, `{time_end}`, `{comment}`
    ///
    /// Values are inserted in one pass, so braces inside scraped text are
    /// kept verbatim. Unknown placeholders are left as they are.
    pub fn format(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len() + 64);
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let tail = &rest[open..];
            let value = tail
                .find('}')
                .and_then(|close| Some((self.placeholder(&tail[1..close])?, close)));
            match value {
                Some((value, close)) => {
                    out.push_str(value);
                    rest = &tail[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = &tail[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }

    fn placeholder(&self, name: &str) -> Option<&str> {
        Some(match name {
            "address" => self.address.as_str(),
            "day_start" => self.day_start.as_str(),
            "time_start" => self.time_start.as_str(),
            "day_end" => self.day_end.as_str(),
            "time_end" => self.time_end.as_str(),
            "comment" => self.comment.as_str(),
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_row_id_ignores_non_key_fields() {
        let a = OutageRecord::new("Ленина 5", "01.01.2024", "10:00", "01.01.2024", "12:00", "");
        let b = OutageRecord::new("Ленина 5", "01.01.2024", "10:00", "02.01.2024", "18:00", "ремонт");
        assert_eq!(a.row_id, b.row_id);
        assert_eq!(a.row_id, "Ленина 5|01.01.2024|10:00");
    }

    #[test]
    fn test_from_cells() {
        let row = cells(&[
            "1", "Район", "Ленина 5", "01.01.2024", "10:00", "01.01.2024", "17:00", "x", "y",
            "замена опор", "z",
        ]);
        let record = OutageRecord::from_cells(&row).unwrap();
        assert_eq!(record.address, "Ленина 5");
        assert_eq!(record.day_end, "01.01.2024");
        assert_eq!(record.time_end, "17:00");
        assert_eq!(record.comment, "замена опор");
    }

    #[test]
    fn test_from_cells_too_short() {
        let row = cells(&["1", "Район", "Ленина 5"]);
        assert!(OutageRecord::from_cells(&row).is_none());
    }

    #[test]
    fn test_format() {
        let record = OutageRecord::new("Ленина 5", "01.01.2024", "10:00", "01.01.2024", "12:00", "");
        assert_eq!(
            record.format("{address} {day_start} {time_start}"),
            "Ленина 5 01.01.2024 10:00"
        );
    }

    #[test]
    fn test_format_keeps_braces_in_values() {
        let record = OutageRecord::new(
            "Ленина {time_end}",
            "01.01.2024",
            "10:00",
            "01.01.2024",
            "12:00",
            "{address}",
        );
        assert_eq!(
            record.format("{address} до {time_end} ({comment}) {other}"),
            "Ленина {time_end} до 12:00 ({address}) {other}"
        );
    }
}
