//! Normalized order entities and their read projections
//!
//! `User`, `Order` and `OrderProduct` are what an import persists.
//! `OrderDetails` is the nested view handed back to readers: one user, the
//! user's orders, and each order's product lines.

use super::legacy::{OrderId, ProductId, UserId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A customer, deduplicated by id (first name seen wins)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

/// An order, deduplicated by id
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub buy_date: NaiveDate,

    /// Running sum of the order's product values, rounded to 2 places after
    /// every addition
    pub total: Decimal,
}

/// One product line of an order. Never deduplicated.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderProduct {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_value: Decimal,
}

/// The three collections produced by normalizing an import
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    pub users: Vec<User>,
    pub orders: Vec<Order>,
    pub order_products: Vec<OrderProduct>,
}

/// Inclusive purchase-date window for range queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuyDateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl BuyDateRange {
    /// Whether `date` lies within `[from, to]`
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }
}

/// A product line inside an order projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetailsProduct {
    pub product_id: ProductId,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
}

/// An order inside a user projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetailsOrder {
    pub order_id: OrderId,
    /// Purchase date, serialized as `YYYY-MM-DD`
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub products: Vec<OrderDetailsProduct>,
}

/// One user with the orders selected by a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub user_id: UserId,
    pub name: String,
    pub orders: Vec<OrderDetailsOrder>,
}

/// Users in first-encountered order
pub type OrdersDetails = Vec<OrderDetails>;
