//! Error types for the legacy order engine
//!
//! This module defines every error that can occur while importing or querying
//! orders. Messages are the human-readable texts surfaced to callers, so
//! their wording is part of the contract.
//!
//! # Error Categories
//!
//! - **Record Errors** ([`RecordError`]): one line is the wrong size or has
//!   invalid fields. These are collected, never fail-fast.
//! - **Batch Errors**: every rejected line of an import, reported together.
//!   Nothing is persisted when this happens.
//! - **Invariant / Persist Errors**: abort the import in progress and leave
//!   the previous data untouched.
//! - **Query Errors**: missing data and invalid date-range parameters.
//! - **Cache Errors**: produced by cache backends and absorbed by the gateway.

use super::legacy::{LegacyRecordError, OrderId, UserId};
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

/// A single field failure on a correctly sized line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("UserID invalid")]
    UserId,

    #[error("UserName invalid")]
    UserName,

    #[error("OrderID invalid")]
    OrderId,

    #[error("ProductID invalid")]
    ProductId,

    #[error("ProductValue invalid")]
    ProductValue,

    /// Not a `YYYYMMDD` calendar date
    #[error("BuyDate invalid")]
    BuyDate,

    /// A real date outside the accepted window
    #[error("BuyDate value is not between {min} and {max}")]
    BuyDateBetween { min: NaiveDate, max: NaiveDate },
}

/// Why a single fixed-width line was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Line length differs from the record width. No field is checked.
    #[error("Record size not equal {expected}")]
    MalformedLine { expected: usize, actual: usize },

    /// One or more fields failed, in column order
    #[error("{}", join_messages(.0))]
    FieldValidation(Vec<FieldError>),
}

/// Which side of a date range a parameter error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeParam {
    From,
    To,
}

impl fmt::Display for RangeParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeParam::From => f.write_str("from"),
            RangeParam::To => f.write_str("to"),
        }
    }
}

/// A violated date-range rule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeParamError {
    #[error("The param {param} is empty")]
    Empty { param: RangeParam },

    #[error("The param {param} is invalid")]
    Invalid { param: RangeParam },

    #[error("The param {param} value is not between {min} and {max}")]
    Between {
        param: RangeParam,
        min: NaiveDate,
        max: NaiveDate,
    },

    #[error("The param to is smaller the param from")]
    ToBeforeFrom,

    #[error("the range is greater than {max_days} days")]
    TooWide { max_days: i64 },
}

/// Main error type for the order engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Input file does not exist
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// I/O error while reading the input
    #[error("I/O error: {message}")]
    IoError { message: String },

    /// At least one line of an import was rejected
    ///
    /// Raised only after the whole input was scanned. Nothing was persisted.
    #[error("Record validation failed on {} line(s)", errors.len())]
    BatchValidation { errors: Vec<LegacyRecordError> },

    /// Two lines of the same order carry different users
    #[error("Order {order_id} belongs to user {expected_user} but line {line} has user {actual_user}")]
    InvariantViolation {
        line: u64,
        order_id: OrderId,
        expected_user: UserId,
        actual_user: UserId,
    },

    /// Accumulating an order total would overflow
    #[error("Arithmetic overflow in total for order {order_id}")]
    ArithmeticOverflow { order_id: OrderId },

    /// Point lookup miss, or empty result for a list query
    #[error("{entity} not found")]
    NotFound { entity: String },

    /// Invalid date-range parameters, every violated rule listed
    #[error("{}", join_messages(errors))]
    RangeParam { errors: Vec<RangeParamError> },

    /// The backing store refused the new generation
    ///
    /// The previous generation stays active.
    #[error("Persist error: {message}")]
    Persist { message: String },

    /// Cache backend failure. Never surfaced by read paths.
    #[error("Cache error: {message}")]
    Cache { message: String },
}

/// Join error messages with `;`, the separator used for every aggregated message
pub fn join_messages<E: fmt::Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

impl From<std::io::Error> for OrderError {
    fn from(error: std::io::Error) -> Self {
        OrderError::IoError {
            message: error.to_string(),
        }
    }
}

impl OrderError {
    /// Create a NotFound error for a single order
    pub fn order_not_found(order_id: OrderId) -> Self {
        OrderError::NotFound {
            entity: format!("Order {}", order_id),
        }
    }

    /// Create a NotFound error for an empty list query
    pub fn orders_not_found() -> Self {
        OrderError::NotFound {
            entity: "Orders".to_string(),
        }
    }

    /// Create a Persist error
    pub fn persist(message: impl Into<String>) -> Self {
        OrderError::Persist {
            message: message.into(),
        }
    }

    /// Create a Cache error
    pub fn cache(message: impl Into<String>) -> Self {
        OrderError::Cache {
            message: message.into(),
        }
    }

    /// Create an InvariantViolation error
    pub fn invariant_violation(
        line: u64,
        order_id: OrderId,
        expected_user: UserId,
        actual_user: UserId,
    ) -> Self {
        OrderError::InvariantViolation {
            line,
            order_id,
            expected_user,
            actual_user,
        }
    }

    /// Rejected lines of a failed import, if this is a batch validation error
    pub fn record_errors(&self) -> Option<&[LegacyRecordError]> {
        match self {
            OrderError::BatchValidation { errors } => Some(errors),
            _ => None,
        }
    }

    /// Whether this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, OrderError::NotFound { .. })
    }
}
