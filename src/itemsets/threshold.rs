use crate::types::SupportTable;

/// Lowest support that still makes an itemset frequent.
pub const MIN_THRESHOLD: u32 = 1;

/// Walks the threshold down from `start` one step at a time and returns the
/// first value at which at least `percentage`% of the itemsets in `table`
/// have a count at or above it.
///
/// The search never goes below [`MIN_THRESHOLD`]; reaching it ends the search
/// whether or not the ratio holds. An empty table leaves `start` untouched.
pub fn select_threshold(table: &SupportTable, percentage: u32, start: u32) -> u32 {
    if table.is_empty() {
        return start;
    }

    let population = table.len() as u64;
    let wanted = population * u64::from(percentage);

    let mut threshold = start;
    loop {
        if threshold <= MIN_THRESHOLD {
            ftlog::debug!(
                "Threshold floor reached for {}% of {} itemsets",
                percentage,
                population
            );
            return MIN_THRESHOLD;
        }

        let retained = table.values().filter(|&&count| count >= threshold).count() as u64;
        if retained * 100 >= wanted {
            return threshold;
        }
        threshold -= 1;
    }
}

/// Itemsets of `table` whose count is at least `threshold`, with their counts.
pub fn filter_frequent(table: &SupportTable, threshold: u32) -> SupportTable {
    table
        .iter()
        .filter(|(_, &count)| count >= threshold)
        .map(|(itemset, &count)| (itemset.clone(), count))
        .collect()
}
