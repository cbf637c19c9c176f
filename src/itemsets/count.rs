use crate::types::{Basket, FrequentSet, ItemsetLength, SupportTable};
use itertools::Itertools;
use rayon::prelude::*;

const APPROX_NUM_UNIQUE_ITEMS: usize = 1024; // arbitrary

/// Support of every single author, keyed by 1-itemsets.
///
/// A basket adds at most 1 to any author, however noisy its members are.
pub fn count_authors(baskets: &[Basket]) -> SupportTable {
    let mut item_counts = SupportTable::with_capacity(APPROX_NUM_UNIQUE_ITEMS);

    for basket in baskets {
        for &item in basket.iter().unique() {
            let count = item_counts.entry(vec![item]).or_insert(0);
            *count += 1;
        }
    }

    item_counts
}

/// Support of each candidate of length `size`.
///
/// Every size-`size` subset of every basket is looked up in `candidates`;
/// subsets that are not candidates are ignored. Baskets are counted in
/// parallel and the partial tables merged by key.
pub fn count_candidates(
    baskets: &[Basket],
    candidates: &FrequentSet,
    size: ItemsetLength,
) -> SupportTable {
    if candidates.is_empty() || size == 0 {
        return SupportTable::new();
    }

    baskets
        .par_iter()
        .filter(|basket| basket.len() >= size)
        .fold(SupportTable::new, |mut counts, basket| {
            for mut itemset in basket.iter().copied().unique().combinations(size) {
                itemset.sort_unstable();
                if candidates.contains(&itemset) {
                    *counts.entry(itemset).or_insert(0) += 1;
                }
            }
            counts
        })
        .reduce(SupportTable::new, merge_counts)
}

fn merge_counts(mut left: SupportTable, right: SupportTable) -> SupportTable {
    if left.len() < right.len() {
        return merge_counts(right, left);
    }
    for (itemset, count) in right {
        *left.entry(itemset).or_insert(0) += count;
    }
    left
}
