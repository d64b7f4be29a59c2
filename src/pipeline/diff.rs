//! Diff calculation between outage snapshots.
//!
//! Only additions drive notifications. Changed and removed records are
//! reported for logging; an outage whose end time or comment changed keeps
//! its `row_id` and is not announced again.

use std::collections::{HashMap, HashSet};

use crate::models::OutageRecord;

/// Result of comparing the previous snapshot with the current listing.
#[derive(Debug, Clone, Default)]
pub struct DiffResult {
    /// Records absent from the previous snapshot, in listing order
    pub added: Vec<OutageRecord>,
    /// Row ids present in both snapshots with different non-key fields
    pub changed: Vec<String>,
    /// Row ids no longer listed
    pub removed: Vec<String>,
}

impl DiffResult {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.changed.is_empty() || !self.removed.is_empty()
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.added.len() + self.changed.len() + self.removed.len()
    }
}

/// Calculate the diff between previous and current snapshots.
pub fn calculate_diff(previous: &[OutageRecord], current: &[OutageRecord]) -> DiffResult {
    let prev_map: HashMap<&str, &OutageRecord> =
        previous.iter().map(|r| (r.row_id.as_str(), r)).collect();
    let curr_ids: HashSet<&str> = current.iter().map(|r| r.row_id.as_str()).collect();

    let mut result = DiffResult::default();
    for record in current {
        match prev_map.get(record.row_id.as_str()) {
            None => result.added.push(record.clone()),
            Some(prev) if *prev != record => result.changed.push(record.row_id.clone()),
            Some(_) => {}
        }
    }

    result.removed = previous
        .iter()
        .filter(|r| !curr_ids.contains(r.row_id.as_str()))
        .map(|r| r.row_id.clone())
        .collect();

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(address: &str, time_start: &str, comment: &str) -> OutageRecord {
        OutageRecord::new(address, "01.01.2024", time_start, "01.01.2024", "18:00", comment)
    }

    #[test]
    fn test_no_changes() {
        let prev = vec![make_record("Ленина 5", "10:00", ""), make_record("Мира 1", "09:00", "")];
        let curr = prev.clone();

        let result = calculate_diff(&prev, &curr);
        assert!(!result.has_changes());
        assert_eq!(result.change_count(), 0);
    }

    #[test]
    fn test_additions_keep_listing_order() {
        let prev = vec![make_record("Ленина 5", "10:00", "")];
        let curr = vec![
            make_record("Пушкина 3", "11:00", ""),
            make_record("Ленина 5", "10:00", ""),
            make_record("Мира 1", "09:00", ""),
        ];

        let result = calculate_diff(&prev, &curr);
        let added: Vec<_> = result.added.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(added, vec!["Пушкина 3", "Мира 1"]);
    }

    #[test]
    fn test_changed_fields_are_not_added() {
        let prev = vec![make_record("Ленина 5", "10:00", "")];
        let curr = vec![make_record("Ленина 5", "10:00", "перенос")];

        let result = calculate_diff(&prev, &curr);
        assert!(result.added.is_empty());
        assert_eq!(result.changed, vec!["Ленина 5|01.01.2024|10:00"]);
    }

    #[test]
    fn test_new_start_time_is_new_outage() {
        let prev = vec![make_record("Ленина 5", "10:00", "")];
        let curr = vec![make_record("Ленина 5", "12:00", "")];

        let result = calculate_diff(&prev, &curr);
        assert_eq!(result.added.len(), 1);
        assert_eq!(result.removed, vec!["Ленина 5|01.01.2024|10:00"]);
    }

    #[test]
    fn test_empty_to_full() {
        let curr = vec![make_record("Ленина 5", "10:00", "")];

        let result = calculate_diff(&[], &curr);
        assert_eq!(result.added.len(), 1);
        assert!(result.removed.is_empty());
    }

    #[test]
    fn test_full_to_empty() {
        let prev = vec![make_record("Ленина 5", "10:00", "")];

        let result = calculate_diff(&prev, &[]);
        assert!(result.added.is_empty());
        assert_eq!(result.removed.len(), 1);
    }
}
