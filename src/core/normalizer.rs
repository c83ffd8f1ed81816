//! Normalization of validated legacy lines
//!
//! This module provides the `Normalizer`, which folds a stream of [`Legacy`]
//! records into the three collections persisted by an import:
//!
//! - **Users**: first occurrence of a user id registers it; later names are ignored
//! - **Orders**: first occurrence registers it; later lines add to its total,
//!   rounding to 2 places after every addition
//! - **Order products**: one entry per line, never deduplicated
//!
//! Entities live in append-only vectors with a key → position map beside
//! them, so the output keeps first-encountered order. The maps are only used
//! while accumulating; the store builds its own indexes.

use crate::io::fixed_width::round_money;
use crate::types::{
    Legacy, NormalizedBatch, Order, OrderError, OrderId, OrderProduct, User, UserId,
};
use std::collections::HashMap;

/// Accumulates validated lines into a [`NormalizedBatch`]
#[derive(Debug, Default)]
pub struct Normalizer {
    batch: NormalizedBatch,
    user_positions: HashMap<UserId, usize>,
    order_positions: HashMap<OrderId, usize>,
}

impl Normalizer {
    /// Create an empty normalizer
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one validated line into the batch
    ///
    /// `line` is only used for error reporting.
    ///
    /// # Errors
    ///
    /// * `OrderError::InvariantViolation` if the order was already seen with a
    ///   different user. The batch is left unchanged.
    /// * `OrderError::ArithmeticOverflow` if the order total would overflow
    pub fn push(&mut self, line: u64, legacy: &Legacy) -> Result<(), OrderError> {
        // Validate the order first so a rejected line leaves no trace
        self.accumulate_order(line, legacy)?;

        if !self.user_positions.contains_key(&legacy.user_id) {
            self.user_positions
                .insert(legacy.user_id, self.batch.users.len());
            self.batch.users.push(User {
                id: legacy.user_id,
                name: legacy.user_name.clone(),
            });
        }

        self.batch.order_products.push(OrderProduct {
            order_id: legacy.order_id,
            product_id: legacy.product_id,
            product_value: legacy.product_value,
        });

        Ok(())
    }

    fn accumulate_order(&mut self, line: u64, legacy: &Legacy) -> Result<(), OrderError> {
        let Some(&position) = self.order_positions.get(&legacy.order_id) else {
            self.order_positions
                .insert(legacy.order_id, self.batch.orders.len());
            self.batch.orders.push(Order {
                id: legacy.order_id,
                user_id: legacy.user_id,
                buy_date: legacy.buy_date,
                total: legacy.product_value,
            });
            return Ok(());
        };

        let order = &mut self.batch.orders[position];
        if order.user_id != legacy.user_id {
            return Err(OrderError::invariant_violation(
                line,
                order.id,
                order.user_id,
                legacy.user_id,
            ));
        }

        let total = order
            .total
            .checked_add(legacy.product_value)
            .ok_or(OrderError::ArithmeticOverflow { order_id: order.id })?;
        order.total = round_money(total);

        Ok(())
    }

    /// Number of lines folded so far
    pub fn product_count(&self) -> usize {
        self.batch.order_products.len()
    }

    /// Finish accumulation and hand over the collections
    pub fn finish(self) -> NormalizedBatch {
        self.batch
    }
}
