use crate::config::EngineConfig;
use crate::core::CacheConfig;
use crate::strategy::BatchConfig;
use crate::types::OrderId;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Import a legacy order export and query the result
#[derive(Parser, Debug)]
#[command(name = "legacy-orders")]
#[command(about = "Import a fixed-width legacy order export and query it", long_about = None)]
pub struct CliArgs {
    /// Input file path containing fixed-width legacy records
    #[arg(value_name = "INPUT", help = "Path to the legacy export file")]
    pub input_file: PathBuf,

    /// Import strategy to use
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Import strategy: 'sync' for synchronous or 'async' for batched asynchronous"
    )]
    pub strategy: StrategyType,

    /// Skip the first line of the input
    #[arg(long = "has-header", help = "Treat the first line as a header and skip it")]
    pub has_header: bool,

    /// Look up a single order
    #[arg(
        long = "order-id",
        value_name = "ID",
        conflicts_with_all = ["from", "to"],
        help = "Print the details of one order"
    )]
    pub order_id: Option<OrderId>,

    /// Range start
    #[arg(long = "from", value_name = "DATE", help = "Range start, YYYY-MM-DD (inclusive)")]
    pub from: Option<String>,

    /// Range end
    #[arg(long = "to", value_name = "DATE", help = "Range end, YYYY-MM-DD (inclusive)")]
    pub to: Option<String>,

    /// Output format of query results
    #[arg(
        long = "format",
        value_name = "FORMAT",
        default_value = "json",
        help = "Output format: 'json' or 'csv'"
    )]
    pub format: OutputFormat,

    /// Number of lines per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of lines per batch (default: 1000, max: 100000)"
    )]
    pub batch_size: Option<usize>,

    /// Number of worker threads (async mode only)
    #[arg(
        long = "workers",
        value_name = "COUNT",
        help = "Number of worker threads (default: CPU cores)"
    )]
    pub workers: Option<usize>,

    /// Cache entry lifetime in seconds
    #[arg(
        long = "cache-ttl",
        value_name = "SECS",
        env = "CACHE_EXPIRATION",
        default_value_t = 60,
        help = "Lifetime of cached order details in seconds, 0 for no expiry"
    )]
    pub cache_ttl: u64,

    /// Whether to cache order lookups
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        env = "CACHE_ENABLED",
        default_value_t = true,
        action = clap::ArgAction::Set,
        help = "Cache point lookups of order details"
    )]
    pub cache_enabled: bool,

    /// Disable the cache regardless of `--cache-enabled`
    #[arg(long = "no-cache", help = "Disable the details cache")]
    pub no_cache: bool,

    /// Default log filter when RUST_LOG is not set
    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        default_value = "info",
        help = "Log level: error, warn, info, debug or trace"
    )]
    pub log_level: String,
}

/// Available import strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

/// Available output formats
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

/// Query to run once the import succeeded
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Query {
    /// Details of a single order
    Order(OrderId),
    /// Full list, or a range when either bound is given
    List {
        from: Option<String>,
        to: Option<String>,
    },
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values use the defaults; invalid ones are corrected by
    /// [`BatchConfig::new`].
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.workers.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.workers.unwrap_or(default.worker_threads),
            )
        } else {
            BatchConfig::default()
        }
    }

    /// Create a CacheConfig from CLI arguments and environment fallbacks
    pub fn to_cache_config(&self) -> CacheConfig {
        CacheConfig {
            enabled: self.cache_enabled && !self.no_cache,
            ttl: Duration::from_secs(self.cache_ttl),
        }
    }

    /// Gather the complete engine configuration
    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig {
            has_header: self.has_header,
            cache: self.to_cache_config(),
            batch: self.to_batch_config(),
        }
    }

    /// The query requested on the command line
    pub fn query(&self) -> Query {
        match self.order_id {
            Some(order_id) => Query::Order(order_id),
            None => Query::List {
                from: self.from.clone(),
                to: self.to.clone(),
            },
        }
    }
}
