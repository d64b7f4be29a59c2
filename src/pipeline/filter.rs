//! Address filter matching.

/// Whether `address` passes a chat's `filter`.
///
/// The filter is a comma-separated list of substrings compared
/// case-insensitively; any hit is a match. An empty filter matches every
/// address, and so does a blank term (e.g. from a trailing comma).
pub fn matches(address: &str, filter: &str) -> bool {
    if filter.is_empty() {
        return true;
    }

    let address = address.to_lowercase();
    filter
        .split(',')
        .any(|term| address.contains(&term.trim().to_lowercase()))
}
