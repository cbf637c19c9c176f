//! CLI for mining frequent co-author groups.

use std::{io, path::PathBuf, time::Instant};

use clap::Parser;
use ftlog::{LevelFilter, LoggerGuard};

use coauthor_apriori::{
    itemsets::{
        DEFAULT_FIRST_LEVEL_PERCENTAGE, DEFAULT_LEVEL_PERCENTAGE, DEFAULT_STATIC_THRESHOLD,
    },
    mine, BasketStore, MinerConfig, TableReport, ThresholdPolicy,
};

/// Small dataset mined when no path is given.
const EXAMPLE_BASKETS: &str = include_str!("../data/example.txt");

/// Finds groups of authors that frequently publish together.
///
/// With `<XML> <TXT>` the bibliography is converted to a basket file and
/// nothing is mined. With `<TXT>` the basket file is mined. Without paths the
/// bundled example is mined.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Input bibliography and output basket file, or a basket file to mine.
    #[arg(num_args = 0..=2)]
    paths: Vec<PathBuf>,

    /// Percentage of single authors that should make it to groups of two.
    #[arg(long, default_value_t = DEFAULT_FIRST_LEVEL_PERCENTAGE)]
    first_percentage: u32,

    /// Percentage of groups of size k that should make it to size k+1.
    #[arg(long, default_value_t = DEFAULT_LEVEL_PERCENTAGE)]
    level_percentage: u32,

    /// Use the same support threshold at every level instead of adapting it
    /// (10 when given without a value).
    #[arg(long, num_args = 0..=1)]
    static_threshold: Option<Option<u32>>,

    /// Largest group size to mine.
    #[arg(long)]
    max_size: Option<usize>,

    /// Log debug messages.
    #[arg(short('v'), long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> MinerConfig {
        let policy = match self.static_threshold {
            Some(threshold) => {
                ThresholdPolicy::Static(threshold.unwrap_or(DEFAULT_STATIC_THRESHOLD))
            }
            None => ThresholdPolicy::Dynamic {
                first_level_percentage: self.first_percentage,
                level_percentage: self.level_percentage,
            },
        };
        MinerConfig {
            policy,
            max_size: self.max_size,
        }
    }
}

fn configure_logger(verbose: bool) -> Result<LoggerGuard, String> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    ftlog::Builder::new()
        .max_log_level(level)
        .root(io::stderr())
        .try_init()
        .map_err(|e| e.to_string())
}

fn main() -> Result<(), String> {
    let args = Args::parse();
    let _guard = configure_logger(args.verbose)?;
    ftlog::debug!("{args:?}");

    let store = match args.paths.as_slice() {
        [xml_path, txt_path] => {
            let store = BasketStore::read_dblp(xml_path).map_err(|e| e.to_string())?;
            store.write_flat(txt_path).map_err(|e| e.to_string())?;
            println!("Wrote {} baskets to {}", store.len(), txt_path.display());
            return Ok(());
        }
        [txt_path] => BasketStore::read_flat(txt_path),
        _ => BasketStore::from_reader(EXAMPLE_BASKETS.as_bytes()),
    }
    .map_err(|e| e.to_string())?;

    let config = args.config();
    config.validate().map_err(|e| e.to_string())?;

    let start = Instant::now();

    println!();
    match config.policy {
        ThresholdPolicy::Dynamic {
            first_level_percentage,
            level_percentage,
        } => {
            println!("Dynamic Threshold enabled:");
            println!("{first_level_percentage}% of singles will go to L2.");
            println!("{level_percentage}% of k size itemsets will go to L(k+1).");
        }
        ThresholdPolicy::Static(threshold) => println!("Static Threshold enabled: {threshold}"),
    }

    let mut report = TableReport::new(io::stdout().lock());
    report.header().map_err(|e| e.to_string())?;

    let mut write_error: Option<io::Error> = None;
    let mining = mine(&store, &config, |level| {
        if write_error.is_none() {
            write_error = report.row(level).err();
        }
    })
    .map_err(|e| e.to_string())?;
    drop(report);
    if let Some(err) = write_error {
        return Err(err.to_string());
    }

    ftlog::info!("Largest frequent group size: {}", mining.last_size);

    println!();
    println!("This took: {} seconds.", start.elapsed().as_secs_f64());

    Ok(())
}
