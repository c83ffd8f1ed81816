//! Order service
//!
//! This module provides the `OrderService`, which runs the import and query
//! flows on top of an [`OrderRepository`] and a [`DetailsCache`].
//!
//! # Import Flow
//!
//! ```text
//! numbered lines ──► RecordParser ──► Normalizer ──┐
//!                        │                         │
//!                        └─► LegacyRecordError list│
//!                                                  ▼
//!                  any errors? ── yes ──► BatchValidation (store untouched)
//!                        │
//!                        no ──► begin_replace ──► bulk_replace ──► end_replace ──► ImportResult
//! ```
//!
//! Every line is decoded even after a failure so the caller gets the complete
//! list of rejected lines. A normalization invariant violation stops the
//! import immediately.
//!
//! # Concurrency
//!
//! Queries only take the store's read path. Imports are serialized by a
//! commit lock so two concurrent imports cannot interleave their cache clear
//! and store replace. The cache gateway is told when a replace starts and
//! ends, so a lookup racing an import never caches the replaced dataset.

use crate::core::cache::{CacheConfig, CacheGateway};
use crate::core::normalizer::Normalizer;
use crate::core::range::RangeValidator;
use crate::core::store::InMemoryStore;
use crate::core::traits::{DetailsCache, OrderRepository};
use crate::io::fixed_width::RecordParser;
use crate::io::sync_reader::SyncLineReader;
use crate::types::{
    ImportResult, Legacy, LegacyRecordError, NormalizedBatch, OrderDetails, OrderError, OrderId,
    OrdersDetails, RecordError,
};
use parking_lot::Mutex;
use std::io::BufRead;
use std::sync::Arc;

/// State of one import in progress
///
/// Lines may be decoded anywhere (the async strategy decodes them on worker
/// tasks) but must be fed back here in line order.
#[derive(Debug)]
pub struct ImportSession {
    parser: RecordParser,
    normalizer: Normalizer,
    errors: Vec<LegacyRecordError>,
}

impl ImportSession {
    /// Start an import whose purchase-date window ends today
    pub fn new() -> Self {
        Self::with_parser(RecordParser::for_today())
    }

    /// Start an import decoding lines with `parser`
    pub fn with_parser(parser: RecordParser) -> Self {
        Self {
            parser,
            normalizer: Normalizer::new(),
            errors: Vec::new(),
        }
    }

    /// The parser this session decodes lines with
    pub fn parser(&self) -> &RecordParser {
        &self.parser
    }

    /// Decode and fold one numbered line
    ///
    /// # Errors
    ///
    /// Only normalization failures are returned. Decoding failures are
    /// recorded and reported by [`ImportSession::finish`].
    pub fn feed(&mut self, line: u64, text: &str) -> Result<(), OrderError> {
        let decoded = self.parser.parse(text);
        self.feed_decoded(line, decoded)
    }

    /// Fold a line that was already decoded
    pub fn feed_decoded(
        &mut self,
        line: u64,
        decoded: Result<Legacy, RecordError>,
    ) -> Result<(), OrderError> {
        match decoded {
            Ok(legacy) => {
                // Once a line failed the batch is rejected anyway
                if self.errors.is_empty() {
                    self.normalizer.push(line, &legacy)?;
                }
                Ok(())
            }
            Err(e) => {
                self.errors.push(LegacyRecordError {
                    line,
                    message: e.to_string(),
                });
                Ok(())
            }
        }
    }

    /// Number of rejected lines so far
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Close the session
    ///
    /// # Errors
    ///
    /// `OrderError::BatchValidation` carrying every rejected line, in line
    /// order, if any line failed to decode.
    pub fn finish(self) -> Result<NormalizedBatch, OrderError> {
        if self.errors.is_empty() {
            Ok(self.normalizer.finish())
        } else {
            Err(OrderError::BatchValidation {
                errors: self.errors,
            })
        }
    }
}

impl Default for ImportSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Import and query service for legacy orders
pub struct OrderService {
    store: Arc<dyn OrderRepository>,
    gateway: CacheGateway,
    commit_lock: Mutex<()>,
}

impl OrderService {
    /// Create a service over an existing store and cache
    pub fn new(store: Arc<dyn OrderRepository>, cache: Arc<dyn DetailsCache>) -> Self {
        Self {
            gateway: CacheGateway::new(cache, Arc::clone(&store)),
            store,
            commit_lock: Mutex::new(()),
        }
    }

    /// Create a service over a fresh [`InMemoryStore`]
    pub fn in_memory(cache: &CacheConfig) -> Self {
        Self::new(Arc::new(InMemoryStore::new()), cache.build())
    }

    /// Import a legacy file from a buffered reader
    ///
    /// # Arguments
    ///
    /// * `reader` - Source of the legacy lines
    /// * `has_header` - Whether the first line is a header to skip
    ///
    /// # Returns
    ///
    /// Counts of distinct users, distinct orders, and product lines imported.
    ///
    /// # Errors
    ///
    /// * `OrderError::BatchValidation` if any line failed to decode
    /// * `OrderError::InvariantViolation` if an order id appears under two users
    /// * `OrderError::IoError` if reading fails
    /// * `OrderError::Persist` if the store rejects the batch
    ///
    /// The active dataset is unchanged on every error.
    pub fn legacy_import<R: BufRead>(
        &self,
        reader: R,
        has_header: bool,
    ) -> Result<ImportResult, OrderError> {
        self.legacy_import_lines(SyncLineReader::new(reader, has_header))
    }

    /// Import already-numbered lines
    ///
    /// Line numbers are reported back verbatim in validation errors.
    pub fn legacy_import_lines<I>(&self, lines: I) -> Result<ImportResult, OrderError>
    where
        I: IntoIterator<Item = Result<(u64, String), OrderError>>,
    {
        let mut session = ImportSession::new();
        for line in lines {
            let (line_num, text) = line?;
            session.feed(line_num, &text).inspect_err(|e| {
                tracing::warn!(error = %e, "import aborted");
            })?;
        }
        self.commit(session)
    }

    /// Validate a finished session and make its batch the active dataset
    pub fn commit(&self, session: ImportSession) -> Result<ImportResult, OrderError> {
        let batch = session.finish().inspect_err(|e| {
            if let OrderError::BatchValidation { errors } = e {
                tracing::warn!(rejected_lines = errors.len(), "import rejected");
            }
        })?;

        let result = ImportResult {
            users: batch.users.len(),
            orders: batch.orders.len(),
            products: batch.order_products.len(),
        };

        let _guard = self.commit_lock.lock();
        self.gateway.begin_replace();
        let replaced = self.store.bulk_replace(batch);
        self.gateway.end_replace();
        replaced?;

        tracing::info!(
            users = result.users,
            orders = result.orders,
            products = result.products,
            "import committed"
        );
        Ok(result)
    }

    /// Details of one order, served from the cache when possible
    pub fn get_details_by_order_id(&self, order_id: OrderId) -> Result<OrderDetails, OrderError> {
        self.gateway.get_details_by_order_id(order_id)
    }

    /// Every order, grouped by user
    ///
    /// # Errors
    ///
    /// `OrderError::NotFound` when the store is empty.
    pub fn list_details(&self) -> Result<OrdersDetails, OrderError> {
        self.store.list_details()
    }

    /// Orders bought between two raw `YYYY-MM-DD` dates, both inclusive
    ///
    /// # Errors
    ///
    /// * `OrderError::RangeParam` if the parameters fail validation
    /// * `OrderError::NotFound` if no order falls in the range
    pub fn list_details_by_range_buy_date(
        &self,
        from: &str,
        to: &str,
    ) -> Result<OrdersDetails, OrderError> {
        let range = RangeValidator::for_today().validate(from, to)?;
        self.store.list_details_by_range_buy_date(&range)
    }

    /// Full list when neither bound is given, validated range otherwise
    ///
    /// A single missing bound is a validation error, not a full list.
    pub fn list_details_filtered(
        &self,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<OrdersDetails, OrderError> {
        let from = from.unwrap_or_default();
        let to = to.unwrap_or_default();
        if from.is_empty() && to.is_empty() {
            self.list_details()
        } else {
            self.list_details_by_range_buy_date(from, to)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::MemoryCache;
    use crate::io::fixed_width::fixed_line;
    use crate::types::{RangeParam, RangeParamError};
    use rust_decimal::Decimal;
    use std::io::Cursor;
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::thread;

    /// Store that can hold one point lookup after it read its snapshot
    #[derive(Default)]
    struct PausingStore {
        inner: InMemoryStore,
        pause: Mutex<Option<(Sender<()>, Receiver<()>)>>,
    }

    impl OrderRepository for PausingStore {
        fn bulk_replace(&self, batch: NormalizedBatch) -> Result<(), OrderError> {
            self.inner.bulk_replace(batch)
        }

        fn get_details_by_order_id(&self, order_id: OrderId) -> Result<OrderDetails, OrderError> {
            let details = self.inner.get_details_by_order_id(order_id);
            let pause = self.pause.lock().take();
            if let Some((reached, release)) = pause {
                reached.send(()).unwrap();
                release.recv().unwrap();
            }
            details
        }

        fn list_details(&self) -> Result<OrdersDetails, OrderError> {
            self.inner.list_details()
        }

        fn list_details_by_range_buy_date(
            &self,
            range: &crate::types::BuyDateRange,
        ) -> Result<OrdersDetails, OrderError> {
            self.inner.list_details_by_range_buy_date(range)
        }
    }

    fn single_line(name: &str) -> String {
        fixed_line("70", name, "753", "3", "1836.74", "20210308")
    }

    fn palmer_file() -> String {
        [
            fixed_line("70", "Palmer Prosacco", "753", "3", "1836.74", "20210308"),
            fixed_line("70", "Palmer Prosacco", "753", "3", "1009.54", "20210308"),
        ]
        .join("\n")
    }

    fn service() -> OrderService {
        OrderService::in_memory(&CacheConfig::default())
    }

    #[test]
    fn test_import_palmer_file() {
        let service = service();
        let result = service
            .legacy_import(Cursor::new(palmer_file()), false)
            .unwrap();

        assert_eq!(
            result,
            ImportResult {
                users: 1,
                orders: 1,
                products: 2
            }
        );

        let details = service.get_details_by_order_id(753).unwrap();
        assert_eq!(details.user_id, 70);
        assert_eq!(details.name, "Palmer Prosacco");
        assert_eq!(details.orders[0].total, Decimal::new(284628, 2));
        assert_eq!(details.orders[0].products.len(), 2);
    }

    #[test]
    fn test_header_is_skipped() {
        let service = service();
        let input = format!("HEADER\n{}", palmer_file());
        let result = service.legacy_import(Cursor::new(input), true).unwrap();
        assert_eq!(result.products, 2);
    }

    #[test]
    fn test_invalid_lines_reject_whole_batch() {
        let service = service();
        service
            .legacy_import(Cursor::new(palmer_file()), false)
            .unwrap();

        let input = [
            fixed_line("1", "Sammie Baumbach", "7", "2", "10.00", "20210308"),
            "too short".to_string(),
            fixed_line("2", "X", "8", "2", "10.00", "20210308"),
        ]
        .join("\n");

        let error = service.legacy_import(Cursor::new(input), false).unwrap_err();
        assert_eq!(
            error.record_errors(),
            Some(
                &[
                    LegacyRecordError {
                        line: 2,
                        message: "Record size not equal 95".to_string()
                    },
                    LegacyRecordError {
                        line: 3,
                        message: "UserName invalid".to_string()
                    },
                ][..]
            )
        );

        // Previous dataset still active
        assert!(service.get_details_by_order_id(753).is_ok());
        assert!(service.get_details_by_order_id(7).unwrap_err().is_not_found());
    }

    #[test]
    fn test_invariant_violation_keeps_previous_dataset() {
        let service = service();
        service
            .legacy_import(Cursor::new(palmer_file()), false)
            .unwrap();

        let input = [
            fixed_line("1", "Sammie Baumbach", "7", "2", "10.00", "20210308"),
            fixed_line("2", "Other Person", "7", "2", "10.00", "20210308"),
        ]
        .join("\n");

        let error = service.legacy_import(Cursor::new(input), false).unwrap_err();
        assert!(matches!(
            error,
            OrderError::InvariantViolation {
                line: 2,
                order_id: 7,
                expected_user: 1,
                actual_user: 2
            }
        ));
        assert_eq!(service.list_details().unwrap().len(), 1);
    }

    #[test]
    fn test_reimport_replaces_dataset_and_cache() {
        let service = service();
        service
            .legacy_import(Cursor::new(palmer_file()), false)
            .unwrap();
        assert_eq!(
            service.get_details_by_order_id(753).unwrap().name,
            "Palmer Prosacco"
        );

        let input = fixed_line("70", "Palmer P", "753", "3", "1.00", "20210308");
        service.legacy_import(Cursor::new(input), false).unwrap();

        let details = service.get_details_by_order_id(753).unwrap();
        assert_eq!(details.name, "Palmer P");
        assert_eq!(details.orders[0].total, Decimal::new(100, 2));
    }

    #[test]
    fn test_empty_import_clears_dataset() {
        let service = service();
        service
            .legacy_import(Cursor::new(palmer_file()), false)
            .unwrap();

        let result = service.legacy_import(Cursor::new(""), false).unwrap();
        assert_eq!(result, ImportResult::default());
        assert!(service.list_details().unwrap_err().is_not_found());
    }

    #[test]
    fn test_range_query_goes_through_validation() {
        let service = service();
        service
            .legacy_import(Cursor::new(palmer_file()), false)
            .unwrap();

        let found = service
            .list_details_by_range_buy_date("2021-03-01", "2021-03-08")
            .unwrap();
        assert_eq!(found.len(), 1);

        let error = service
            .list_details_by_range_buy_date("2021-03-08", "2021-03-01")
            .unwrap_err();
        assert_eq!(
            error,
            OrderError::RangeParam {
                errors: vec![RangeParamError::ToBeforeFrom]
            }
        );

        let error = service
            .list_details_by_range_buy_date("2021-03-09", "2021-03-10")
            .unwrap_err();
        assert!(error.is_not_found());
    }

    #[test]
    fn test_filtered_listing() {
        let service = service();
        service
            .legacy_import(Cursor::new(palmer_file()), false)
            .unwrap();

        assert_eq!(service.list_details_filtered(None, None).unwrap().len(), 1);
        assert_eq!(
            service
                .list_details_filtered(Some(""), Some(""))
                .unwrap()
                .len(),
            1
        );

        let error = service
            .list_details_filtered(Some("2021-03-01"), None)
            .unwrap_err();
        assert_eq!(
            error,
            OrderError::RangeParam {
                errors: vec![RangeParamError::Empty {
                    param: RangeParam::To
                }]
            }
        );
    }

    #[test]
    fn test_read_error_aborts_import() {
        let service = service();
        let lines = vec![
            Ok((
                1,
                fixed_line("1", "Sammie Baumbach", "7", "2", "10.00", "20210308"),
            )),
            Err(OrderError::IoError {
                message: "stream closed".to_string(),
            }),
        ];

        let error = service.legacy_import_lines(lines).unwrap_err();
        assert!(matches!(error, OrderError::IoError { .. }));
        assert!(service.list_details().unwrap_err().is_not_found());
    }

    #[test]
    fn test_session_collects_errors_past_first_failure() {
        let mut session = ImportSession::new();
        session.feed(1, "bad").unwrap();
        session
            .feed(2, &fixed_line("1", "Sammie Baumbach", "7", "2", "10.00", "20210308"))
            .unwrap();
        session.feed(3, "bad").unwrap();
        assert_eq!(session.error_count(), 2);
        assert!(session.finish().is_err());
    }

    #[test]
    fn test_lookup_racing_import_does_not_cache_old_dataset() {
        let store = Arc::new(PausingStore::default());
        let service = Arc::new(OrderService::new(
            store.clone(),
            Arc::new(MemoryCache::unbounded()),
        ));
        service
            .legacy_import(Cursor::new(single_line("Old Name")), false)
            .unwrap();

        let (reached_tx, reached_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        *store.pause.lock() = Some((reached_tx, release_rx));

        let reader = {
            let service = Arc::clone(&service);
            thread::spawn(move || service.get_details_by_order_id(753).unwrap())
        };

        // The lookup has read the old dataset and is held before caching it
        reached_rx.recv().unwrap();
        service
            .legacy_import(Cursor::new(single_line("New Name")), false)
            .unwrap();
        release_tx.send(()).unwrap();

        assert_eq!(reader.join().unwrap().name, "Old Name");
        assert_eq!(
            service.get_details_by_order_id(753).unwrap().name,
            "New Name"
        );
    }

    #[test]
    fn test_concurrent_imports_and_reads() {
        let service = Arc::new(service());
        service
            .legacy_import(Cursor::new(palmer_file()), false)
            .unwrap();

        let writers: Vec<_> = (0..4)
            .map(|i| {
                let service = Arc::clone(&service);
                thread::spawn(move || {
                    let name = if i % 2 == 0 { "Palmer Prosacco" } else { "Palmer P" };
                    let input = [
                        fixed_line("70", name, "753", "3", "1836.74", "20210308"),
                        fixed_line("70", name, "753", "3", "1009.54", "20210308"),
                    ]
                    .join("\n");
                    service.legacy_import(Cursor::new(input), false).unwrap();
                })
            })
            .collect();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let service = Arc::clone(&service);
                thread::spawn(move || {
                    for _ in 0..50 {
                        let details = service.get_details_by_order_id(753).unwrap();
                        assert_eq!(details.orders[0].total, Decimal::new(284628, 2));
                    }
                })
            })
            .collect();

        for handle in writers.into_iter().chain(readers) {
            handle.join().unwrap();
        }
    }
}
