use std::collections::HashSet;

use itertools::Itertools;

use crate::types::{Basket, FrequentSet, ItemId, Itemset, ItemsetLength};

/// True when every subset of `candidate` one member shorter is in `frequent`.
///
/// `candidate` must be sorted; combinations of a sorted slice come out sorted,
/// so they can be looked up directly.
pub fn is_valid_candidate(candidate: &[ItemId], frequent: &FrequentSet) -> bool {
    if candidate.is_empty() {
        return false;
    }
    let subset_len = candidate.len() - 1;
    if subset_len == 0 {
        return true;
    }

    candidate
        .iter()
        .copied()
        .combinations(subset_len)
        .all(|subset| frequent.contains(&subset))
}

/// Candidates of length `size` that co-occur in at least one basket and whose
/// every (`size` - 1)-subset is frequent.
///
/// Returned in first-seen order, each candidate once.
pub fn generate_candidates(
    baskets: &[Basket],
    frequent: &FrequentSet,
    size: ItemsetLength,
) -> Vec<Itemset> {
    if frequent.is_empty() || size < 2 {
        return vec![];
    }

    let mut seen: HashSet<Itemset> = HashSet::new();
    let mut rejected: HashSet<Itemset> = HashSet::new();
    let mut candidates: Vec<Itemset> = Vec::new();

    for basket in baskets.iter().filter(|basket| basket.len() >= size) {
        for mut combi in basket.iter().copied().unique().combinations(size) {
            combi.sort_unstable();
            if seen.contains(&combi) || rejected.contains(&combi) {
                continue;
            }
            if is_valid_candidate(&combi, frequent) {
                seen.insert(combi.clone());
                candidates.push(combi);
            } else {
                rejected.insert(combi);
            }
        }
    }

    candidates
}
