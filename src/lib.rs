//! Legacy Order Engine Library
//! # Overview
//!
//! This library imports fixed-width legacy order exports into a normalized,
//! queryable store, with both a sync and an async import strategy.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (records, entities, projections, errors)
//! - [`cli`] - CLI arguments parsing
//! - [`config`] - Engine configuration
//! - [`core`] - Business logic components:
//!   - [`core::normalizer`] - Folding lines into users, orders and products
//!   - [`core::store`] - In-memory store with atomic dataset replacement
//!   - [`core::cache`] - Cache-aside lookups of order details
//!   - [`core::range`] - Purchase-date range validation
//!   - [`core::service`] - Import and query orchestration
//! - [`io`] - Line readers, the fixed-width decoder, and result output
//! - [`strategy`] - Sync and async import pipelines
//!
//! # Record Layout
//!
//! Every line is exactly 95 characters:
//!
//! | Field        | Width | Content                                   |
//! |--------------|-------|-------------------------------------------|
//! | UserID       | 10    | zero-padded integer                       |
//! | UserName     | 45    | left-padded text, at least 2 characters   |
//! | OrderID      | 10    | zero-padded integer                       |
//! | ProductID    | 10    | zero-padded integer                       |
//! | ProductValue | 12    | left-padded decimal                       |
//! | BuyDate      | 8     | `YYYYMMDD`, between 1900-01-01 and today  |
//!
//! # Import Semantics
//!
//! An import is all-or-nothing: if any line is rejected, the error lists every
//! rejected line and the previous dataset stays active. A successful import
//! replaces the whole dataset and clears the details cache.

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use config::EngineConfig;
pub use core::{InMemoryStore, OrderService};
pub use io::{write_details_csv, write_json};
pub use types::{
    ImportResult, Legacy, LegacyRecordError, OrderDetails, OrderError, OrderId, OrdersDetails,
    UserId,
};
