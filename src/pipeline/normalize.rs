// src/pipeline/normalize.rs

//! Raw listing rows to typed outage records.

use std::collections::HashSet;

use crate::models::OutageRecord;

/// Normalize raw rows into outage records.
///
/// Rows too short to hold every read column or with an empty address are
/// skipped. A `row_id` seen twice keeps its first occurrence.
pub fn normalize_rows(rows: &[Vec<String>]) -> Vec<OutageRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(rows.len());

    for (idx, cells) in rows.iter().enumerate() {
        let Some(record) = OutageRecord::from_cells(cells) else {
            log::warn!("Skipping listing row {}: only {} cells", idx, cells.len());
            continue;
        };
        if record.address.is_empty() {
            continue;
        }
        if seen.insert(record.row_id.clone()) {
            records.push(record);
        } else {
            log::debug!("Duplicate listing row {}", record.row_id);
        }
    }

    records
}
