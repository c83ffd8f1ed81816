//! Core traits for the backing store and the details cache
//!
//! These are the seams where backends plug in. The in-memory store and both
//! cache implementations live in this crate; a relational store only has to
//! honor the same contract (atomic replace, inclusive date ranges,
//! first-encountered grouping).

use crate::types::{
    BuyDateRange, NormalizedBatch, OrderDetails, OrderError, OrderId, OrdersDetails,
};

/// Trait for the authoritative order store
///
/// Implementations must be safe to share between threads. Readers may run
/// concurrently with each other and with `bulk_replace`, and must always see
/// either the complete previous dataset or the complete new one.
pub trait OrderRepository: Send + Sync {
    /// Replace the whole dataset with `batch`
    ///
    /// On error the previous dataset stays active and unchanged.
    fn bulk_replace(&self, batch: NormalizedBatch) -> Result<(), OrderError>;

    /// Details of a single order, nested under its user
    fn get_details_by_order_id(&self, order_id: OrderId) -> Result<OrderDetails, OrderError>;

    /// Every order grouped by user, in storage order
    fn list_details(&self) -> Result<OrdersDetails, OrderError>;

    /// Orders whose purchase date lies in `range` (both ends inclusive)
    fn list_details_by_range_buy_date(
        &self,
        range: &BuyDateRange,
    ) -> Result<OrdersDetails, OrderError>;
}

/// Trait for a key/value cache of order details
///
/// Keys are produced by [`details_key`]. A miss is `Ok(None)`; `Err` means
/// the backend itself failed.
pub trait DetailsCache: Send + Sync {
    /// Look up a cached entry
    fn get(&self, key: &str) -> Result<Option<OrderDetails>, OrderError>;

    /// Store an entry, replacing any previous value
    fn set(&self, key: &str, value: OrderDetails) -> Result<(), OrderError>;

    /// Remove one entry. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), OrderError>;

    /// Remove every entry
    fn clear(&self) -> Result<(), OrderError>;
}

/// Cache key of an order's details, `order:id:<id>`
pub fn details_key(order_id: OrderId) -> String {
    format!("order:id:{}", order_id)
}
