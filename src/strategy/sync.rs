//! Synchronous import strategy
//!
//! Single-threaded pipeline: [`SyncLineReader`] streams numbered lines from
//! the file and [`OrderService::legacy_import_lines`] decodes and folds them
//! one at a time. Memory usage is proportional to the normalized dataset, not
//! to the file.

use crate::core::OrderService;
use crate::io::sync_reader::SyncLineReader;
use crate::strategy::ImportStrategy;
use crate::types::{ImportResult, OrderError};
use std::path::Path;

/// Synchronous import strategy
///
/// # Examples
///
/// ```no_run
/// use legacy_order_engine::core::{CacheConfig, OrderService};
/// use legacy_order_engine::strategy::{ImportStrategy, SyncImportStrategy};
/// use std::path::Path;
///
/// let service = OrderService::in_memory(&CacheConfig::default());
/// let result = SyncImportStrategy
///     .import(&service, Path::new("orders.txt"), false)
///     .expect("Import failed");
/// println!("{} orders", result.orders);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncImportStrategy;

impl ImportStrategy for SyncImportStrategy {
    fn import(
        &self,
        service: &OrderService,
        input_path: &Path,
        has_header: bool,
    ) -> Result<ImportResult, OrderError> {
        tracing::info!(path = %input_path.display(), strategy = "sync", "import started");
        let reader = SyncLineReader::open(input_path, has_header)?;
        service.legacy_import_lines(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CacheConfig;
    use crate::io::fixed_width::fixed_line;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary legacy file for testing
    fn create_temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn service() -> OrderService {
        OrderService::in_memory(&CacheConfig::default())
    }

    #[test]
    fn test_sync_strategy_imports_file() {
        let content = [
            fixed_line("70", "Palmer Prosacco", "753", "3", "1836.74", "20210308"),
            fixed_line("70", "Palmer Prosacco", "753", "3", "1009.54", "20210308"),
            fixed_line("75", "Bobbie Batz", "798", "2", "1578.57", "20211116"),
        ]
        .join("\n");
        let file = create_temp_file(&content);

        let service = service();
        let result = SyncImportStrategy
            .import(&service, file.path(), false)
            .unwrap();

        assert_eq!(result.users, 2);
        assert_eq!(result.orders, 2);
        assert_eq!(result.products, 3);
        assert_eq!(service.list_details().unwrap().len(), 2);
    }

    #[test]
    fn test_sync_strategy_skips_header() {
        let content = format!(
            "header line\n{}\n",
            fixed_line("70", "Palmer Prosacco", "753", "3", "1836.74", "20210308")
        );
        let file = create_temp_file(&content);

        let result = SyncImportStrategy
            .import(&service(), file.path(), true)
            .unwrap();
        assert_eq!(result.products, 1);
    }

    #[test]
    fn test_sync_strategy_handles_missing_file() {
        let result = SyncImportStrategy.import(&service(), Path::new("nonexistent.txt"), false);
        assert!(matches!(result, Err(OrderError::FileNotFound { .. })));
    }

    #[test]
    fn test_sync_strategy_reports_rejected_lines() {
        let content = [
            fixed_line("70", "Palmer Prosacco", "753", "3", "1836.74", "20210308"),
            fixed_line("70", "Palmer Prosacco", "753", "3", "abc", "20210308"),
        ]
        .join("\n");
        let file = create_temp_file(&content);

        let error = SyncImportStrategy
            .import(&service(), file.path(), false)
            .unwrap_err();
        let errors = error.record_errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 2);
        assert_eq!(errors[0].message, "ProductValue invalid");
    }

    #[test]
    fn test_sync_strategy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncImportStrategy>();
    }
}
