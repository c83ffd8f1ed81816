//! Import strategy module
//!
//! This module defines the Strategy pattern for the import pipeline: reading a
//! legacy file, decoding its lines, and committing the result through an
//! [`OrderService`]. Implementations (synchronous, asynchronous batch) are
//! selected at runtime and must produce identical results, including the
//! line-numbered error payload of a rejected file.

use crate::cli::StrategyType;
use crate::core::OrderService;
use crate::types::{ImportResult, OrderError};
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncImportStrategy, BatchConfig, DEFAULT_BATCH_SIZE, MAX_BATCH_SIZE};
pub use sync::SyncImportStrategy;

/// Import strategy trait for complete import pipelines
pub trait ImportStrategy: Send + Sync {
    /// Import the legacy file at `input_path` into `service`
    ///
    /// # Arguments
    ///
    /// * `service` - Service whose store receives the new dataset
    /// * `input_path` - Path to the fixed-width legacy file
    /// * `has_header` - Whether the first line is a header to skip
    ///
    /// # Returns
    ///
    /// The import counts on success.
    ///
    /// # Errors
    ///
    /// * `OrderError::FileNotFound` / `OrderError::IoError` for unreadable input
    /// * `OrderError::BatchValidation` if any line was rejected
    /// * `OrderError::InvariantViolation` for an order split across users
    ///
    /// The service's active dataset is unchanged on every error.
    fn import(
        &self,
        service: &OrderService,
        input_path: &Path,
        has_header: bool,
    ) -> Result<ImportResult, OrderError>;
}

/// Create an import strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of import strategy to create (Sync or Async)
/// * `config` - Optional batch configuration (ignored for sync)
///
/// # Returns
///
/// A boxed trait object implementing the ImportStrategy trait
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ImportStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncImportStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncImportStrategy::new(config))
        }
    }
}
