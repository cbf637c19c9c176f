pub mod candidates;
pub mod count;
pub mod threshold;

use crate::{
    baskets::BasketStore,
    error::Error,
    itemsets::{
        candidates::generate_candidates,
        count::{count_authors, count_candidates},
        threshold::{filter_frequent, select_threshold},
    },
    types::{FrequentItemsets, FrequentSet, ItemsetLength, SupportTable},
};

pub const DEFAULT_FIRST_LEVEL_PERCENTAGE: u32 = 20;
pub const DEFAULT_LEVEL_PERCENTAGE: u32 = 5;
pub const DEFAULT_STATIC_THRESHOLD: u32 = 10;

/// How the support threshold of each level is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdPolicy {
    /// Adaptive threshold. Level 1 searches down from its highest count and
    /// keeps `first_level_percentage`% of the authors; later levels search
    /// down from the previous threshold and keep `level_percentage`%.
    Dynamic {
        first_level_percentage: u32,
        level_percentage: u32,
    },
    /// The same threshold at every level.
    Static(u32),
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        ThresholdPolicy::Dynamic {
            first_level_percentage: DEFAULT_FIRST_LEVEL_PERCENTAGE,
            level_percentage: DEFAULT_LEVEL_PERCENTAGE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MinerConfig {
    pub policy: ThresholdPolicy,
    /// Stop after groups of this size.
    pub max_size: Option<ItemsetLength>,
}

impl MinerConfig {
    pub fn validate(&self) -> Result<(), Error> {
        match self.policy {
            ThresholdPolicy::Dynamic {
                first_level_percentage,
                level_percentage,
            } => {
                if first_level_percentage > 100 || level_percentage > 100 {
                    return Err(Error::invalid_config(format!(
                        "percentages must be within 0..=100, got {first_level_percentage} and {level_percentage}"
                    )));
                }
            }
            ThresholdPolicy::Static(0) => {
                return Err(Error::invalid_config("static threshold must be at least 1"));
            }
            ThresholdPolicy::Static(_) => {}
        }
        if self.max_size == Some(0) {
            return Err(Error::invalid_config("max size must be at least 1"));
        }
        Ok(())
    }
}

/// What one level of mining looked like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelReport {
    pub size: ItemsetLength,
    pub threshold: u32,
    pub max_count: u32,
    /// Author groups reaching `max_count`, names sorted within and across groups.
    pub top_groups: Vec<Vec<String>>,
    pub candidates: usize,
    pub frequent: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Mining {
    pub levels: Vec<LevelReport>,
    /// Frequent itemsets with their support, for each size that had any.
    pub frequent: FrequentItemsets,
    /// Largest size with a non-empty frequent set, 0 if there was none.
    pub last_size: ItemsetLength,
}

/// Mines frequent author groups level by level until a level has no
/// frequent itemset left.
///
/// `on_level` sees every level whose support table is not empty, in order.
pub fn mine<F>(
    store: &BasketStore,
    config: &MinerConfig,
    mut on_level: F,
) -> Result<Mining, Error>
where
    F: FnMut(&LevelReport),
{
    config.validate()?;

    let baskets = store.baskets();
    let mut mining = Mining::default();

    ftlog::info!("Counting authors over {} baskets.", baskets.len());
    let mut size: ItemsetLength = 1;
    let mut table = count_authors(baskets);
    let mut threshold = match config.policy {
        ThresholdPolicy::Dynamic {
            first_level_percentage,
            ..
        } => {
            let start = table.values().copied().max().unwrap_or(1);
            select_threshold(&table, first_level_percentage, start)
        }
        ThresholdPolicy::Static(threshold) => threshold,
    };

    loop {
        let frequent = filter_frequent(&table, threshold);
        ftlog::info!(
            "Size {}: {} candidates, threshold {}, {} frequent.",
            size,
            table.len(),
            threshold,
            frequent.len()
        );
        ftlog::debug!("Size {} candidates: {:?}", size, named_counts(store, &table));
        ftlog::debug!("Size {} frequent: {:?}", size, named_counts(store, &frequent));

        if let Some(report) = level_report(store, &table, size, threshold, frequent.len()) {
            on_level(&report);
            mining.levels.push(report);
        }

        if frequent.is_empty() {
            break;
        }
        mining.last_size = size;
        let frequent_set: FrequentSet = frequent.keys().cloned().collect();
        mining.frequent.insert(size, frequent);

        if config.max_size.map_or(false, |max_size| size >= max_size) {
            ftlog::info!("Reached the maximum group size {}.", size);
            break;
        }

        size += 1;
        let candidates: FrequentSet = generate_candidates(baskets, &frequent_set, size)
            .into_iter()
            .collect();
        table = count_candidates(baskets, &candidates, size);

        if let ThresholdPolicy::Dynamic {
            level_percentage, ..
        } = config.policy
        {
            threshold = select_threshold(&table, level_percentage, threshold);
        }
    }

    Ok(mining)
}

/// Table entries with members resolved to names, highest count first.
fn named_counts(store: &BasketStore, table: &SupportTable) -> Vec<(Vec<String>, u32)> {
    let mut named: Vec<(Vec<String>, u32)> = table
        .iter()
        .map(|(itemset, &count)| (store.names(itemset), count))
        .collect();
    named.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    named
}

fn level_report(
    store: &BasketStore,
    table: &SupportTable,
    size: ItemsetLength,
    threshold: u32,
    frequent: usize,
) -> Option<LevelReport> {
    let max_count = table.values().copied().max()?;
    let mut top_groups: Vec<Vec<String>> = table
        .iter()
        .filter(|(_, &count)| count == max_count)
        .map(|(itemset, _)| store.names(itemset))
        .collect();
    top_groups.sort_unstable();

    Some(LevelReport {
        size,
        threshold,
        max_count,
        top_groups,
        candidates: table.len(),
        frequent,
    })
}
