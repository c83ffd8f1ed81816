//! Legacy flat-file record types
//!
//! This module defines the raw and validated forms of one fixed-width line
//! from the legacy order export, plus the payloads reported back to the
//! caller of an import.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// User identifier
pub type UserId = i64;

/// Order identifier
pub type OrderId = i64;

/// Product identifier
pub type ProductId = i64;

/// Raw sub-fields sliced from one fixed-width line
///
/// No trimming or type coercion has happened yet; every field is exactly the
/// bytes found at its column offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyRecord<'a> {
    pub user_id: &'a str,
    pub user_name: &'a str,
    pub order_id: &'a str,
    pub product_id: &'a str,
    pub product_value: &'a str,
    pub buy_date: &'a str,
}

/// A fully validated legacy line
#[derive(Debug, Clone, PartialEq)]
pub struct Legacy {
    /// Non-negative user identifier
    pub user_id: UserId,

    /// Title-cased name with internal whitespace collapsed (at least 2 chars)
    pub user_name: String,

    pub order_id: OrderId,

    pub product_id: ProductId,

    /// Product value as written in the file
    pub product_value: Decimal,

    /// Purchase date, within [1900-01-01, today]
    pub buy_date: NaiveDate,

    /// Moment the line was decoded. Informational only.
    pub imported_at: DateTime<Utc>,
}

/// One rejected line in a failed import
///
/// `line` is 1-based and counts data lines (a skipped header is not counted).
/// `message` joins every field failure of the line with `;`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyRecordError {
    pub line: u64,
    pub message: String,
}

/// Counts reported by a successful import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    /// Distinct users persisted
    pub users: usize,
    /// Distinct orders persisted
    pub orders: usize,
    /// Order lines persisted (one per input line)
    pub products: usize,
}
