//! Frequent co-author groups from bibliographic data.
//!
//! Each publication becomes a basket of its authors. Groups of size 1, 2, 3,
//! ... are mined level by level, Apriori style: candidates of size k+1 are
//! only kept when all of their size-k subsets were frequent, and the support
//! threshold of each level can adapt so that a target share of the candidates
//! survives.

pub mod baskets;
pub mod dblp;
pub mod error;
pub mod itemsets;
pub mod report;
pub mod types;

pub use baskets::BasketStore;
pub use error::{Error, ErrorKind};
pub use itemsets::{mine, LevelReport, MinerConfig, Mining, ThresholdPolicy};
pub use report::TableReport;
