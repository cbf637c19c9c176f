use std::collections::{HashMap, HashSet};

pub type ItemId = usize;
pub type AuthorName = String;

/// Sorted, de-duplicated member ids.
pub type Itemset = Vec<ItemId>;
pub type Basket = Vec<ItemId>;

pub type ReverseLookup = HashMap<AuthorName, ItemId>;
pub type Inventory = Vec<AuthorName>;

pub type SupportTable = HashMap<Itemset, u32>;
pub type FrequentSet = HashSet<Itemset>;

pub type ItemsetLength = usize;
pub type FrequentItemsets = HashMap<ItemsetLength, SupportTable>;
