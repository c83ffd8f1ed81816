//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `legacy`: Raw and validated flat-file records, import payloads
//! - `order`: Normalized entities and read projections
//! - `error`: Error types for the order engine

pub mod error;
pub mod legacy;
pub mod order;

pub use error::{FieldError, OrderError, RangeParam, RangeParamError, RecordError};
pub use legacy::{
    ImportResult, Legacy, LegacyRecord, LegacyRecordError, OrderId, ProductId, UserId,
};
pub use order::{
    BuyDateRange, NormalizedBatch, Order, OrderDetails, OrderDetailsOrder, OrderDetailsProduct,
    OrderProduct, OrdersDetails, User,
};
