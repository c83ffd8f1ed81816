//! Engine configuration
//!
//! Everything a run needs besides the input path and the query, gathered from
//! CLI flags and environment fallbacks by [`CliArgs::to_engine_config`].
//!
//! [`CliArgs::to_engine_config`]: crate::cli::CliArgs::to_engine_config

use crate::core::CacheConfig;
use crate::strategy::BatchConfig;

/// Configuration of one engine run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Whether the input's first line is a header to skip
    pub has_header: bool,
    /// Details cache settings
    pub cache: CacheConfig,
    /// Batch settings of the async strategy
    pub batch: BatchConfig,
}
