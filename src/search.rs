//! Species name search
//!
//! Case-insensitive substring match over english names only. Results keep
//! catalog order; there is no scoring.

use crate::species::SpeciesRecord;

/// All records whose english name contains `query`
///
/// An empty (or all-whitespace) query matches the whole catalog.
pub fn search<'a>(records: &'a [SpeciesRecord], query: &str) -> Vec<&'a SpeciesRecord> {
    search_limited(records, query, usize::MAX)
}

/// Same as [`search`], stopping after `limit` matches (typeahead lists)
pub fn search_limited<'a>(
    records: &'a [SpeciesRecord],
    query: &str,
    limit: usize,
) -> Vec<&'a SpeciesRecord> {
    if query.trim().is_empty() {
        return records.iter().take(limit).collect();
    }

    // Matched as typed; only the emptiness test trims
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|r| r.english_name.to_lowercase().contains(&needle))
        .take(limit)
        .collect()
}
